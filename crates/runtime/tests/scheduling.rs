use std::sync::Arc;
use std::time::Duration;

use stacking_core::{
    EntityId, EntityKind, Location, MemoryWorld, StackEnv, StackingConfig, StackingEngine,
    WorldId, WorldOracle,
};
use stacking_runtime::{HostCapabilities, LaneKind, RuntimeError, StackingRuntime, TickScheduler};

fn at(x: f64) -> Location {
    Location::at(WorldId::OVERWORLD, x, 64.0, 0.0)
}

fn engine(config: StackingConfig) -> (Arc<MemoryWorld>, Arc<StackingEngine>) {
    let world = Arc::new(MemoryWorld::new());
    let engine = Arc::new(StackingEngine::new(config, StackEnv::from_host(world.clone())));
    (world, engine)
}

fn populated() -> (Arc<MemoryWorld>, Arc<StackingEngine>, EntityId, EntityId) {
    let (world, engine) = engine(StackingConfig::default());
    world.add_observer(at(0.0));
    let a = world.add_mob(EntityKind::Zombie, at(0.0));
    let b = world.add_mob(EntityKind::Zombie, at(3.0));
    engine.set_stack_size(a, 3);
    (world, engine, a, b)
}

#[tokio::test(start_paused = true)]
async fn sweep_runs_after_check_period() {
    let (world, engine, a, b) = populated();
    let runtime = StackingRuntime::builder()
        .engine(engine.clone())
        .build()
        .await
        .expect("runtime should start");
    assert_eq!(
        runtime.activities(),
        &["indicator-tracking", "stacking-sweep"]
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(world.is_valid(b), "sweep must wait for its period");

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert!(!world.is_valid(b));
    assert_eq!(engine.get_stack_size(a), 4);

    runtime.shutdown().await.expect("clean shutdown");
}

#[tokio::test(start_paused = true)]
async fn tracking_follows_moving_owner() {
    let (world, engine, a, _b) = populated();
    let runtime = StackingRuntime::builder()
        .engine(engine.clone())
        .build()
        .await
        .unwrap();

    world.move_entity(a, at(10.0));
    tokio::time::sleep(Duration::from_millis(200)).await;

    let marker = engine.indicators().indicator_for(a).unwrap();
    assert_eq!(world.entity(marker).unwrap().location.position.x, 10.0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn regionized_host_gets_one_lane_per_region() {
    let (world, engine, a, b) = populated();
    let runtime = StackingRuntime::builder()
        .engine(engine.clone())
        .capabilities(HostCapabilities::regionized(4))
        .build()
        .await
        .unwrap();

    let lanes = runtime.scheduler().lanes();
    assert_eq!(lanes.len(), 5);
    assert_eq!(lanes[0], LaneKind::Global);

    world.move_entity(a, at(1000.0));
    tokio::time::sleep(Duration::from_millis(200)).await;
    let marker = engine.indicators().indicator_for(a).unwrap();
    assert_eq!(world.entity(marker).unwrap().location.position.x, 1000.0);

    world.move_entity(a, at(1.0));
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert!(!world.is_valid(b));

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn sweep_period_is_independent_of_tick_length() {
    let (world, engine, _a, b) = populated();
    let runtime = StackingRuntime::builder()
        .engine(engine)
        .tick_duration(Duration::from_millis(10))
        .build()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(world.is_valid(b));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!world.is_valid(b));

    runtime.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn zero_tick_is_raised_to_minimum_for_lanes_and_periods() {
    let (world, engine, _a, b) = populated();
    let runtime = StackingRuntime::builder()
        .engine(engine)
        .tick_duration(Duration::ZERO)
        .build()
        .await
        .unwrap();
    assert_eq!(runtime.scheduler().tick_duration(), Duration::from_millis(1));

    tokio::time::sleep(Duration::from_millis(2900)).await;
    assert!(world.is_valid(b));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!world.is_valid(b));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn disabled_engine_registers_nothing() {
    let (_world, engine) = engine(StackingConfig {
        enabled: false,
        ..StackingConfig::default()
    });
    let runtime = StackingRuntime::builder().engine(engine).build().await.unwrap();

    assert!(runtime.activities().is_empty());
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn builder_rejects_missing_engine_and_empty_region_set() {
    let result = StackingRuntime::builder().build().await;
    assert!(matches!(result, Err(RuntimeError::MissingEngine)));

    let (_world, engine) = engine(StackingConfig::default());
    let result = StackingRuntime::builder()
        .engine(engine)
        .capabilities(HostCapabilities::regionized(0))
        .build()
        .await;
    assert!(matches!(result, Err(RuntimeError::NoRegions)));
}
