//! Stacking simulation binary.
//!
//! Populates an in-memory world, starts the stacking runtime on it, and keeps
//! spawning, killing and moving creatures for a while.
//!
//! # Examples
//!
//! ```bash
//! # Four region lanes, a custom config, 30 seconds
//! SIM_REGIONS=4 STACKING_CONFIG=stacking.toml SIM_SECONDS=30 cargo run -p stacking-client
//! ```

use std::time::Duration;

use anyhow::Result;
use stacking_client::{SimConfig, Simulation, logging};
use stacking_runtime::StackingRuntime;

/// Interval between two simulation steps.
const STEP: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    let _log_guard = logging::setup_logging(&config.session_id)?;

    let stacking = config.load_stacking_config()?;
    tracing::info!(
        entities = config.entities,
        observers = config.observers,
        seconds = config.seconds,
        regions = config.regions,
        seed = config.seed,
        "Starting stacking simulation"
    );

    let mut sim = Simulation::new(stacking, config.seed);
    sim.add_observers(config.observers);
    for _ in 0..config.entities {
        sim.spawn_random();
    }
    tracing::info!(
        living = sim.living().len(),
        units = sim.total_units(),
        "Initial population placed"
    );

    let runtime = StackingRuntime::builder()
        .engine(sim.engine().clone())
        .capabilities(config.capabilities())
        .build()
        .await?;

    let deadline = tokio::time::Instant::now() + Duration::from_secs(config.seconds);
    let mut interval = tokio::time::interval(STEP);
    while tokio::time::Instant::now() < deadline {
        interval.tick().await;
        sim.step();
    }

    runtime.shutdown().await?;

    let report = sim.report();
    tracing::info!(
        spawned = report.spawned,
        merged_on_spawn = report.merged_on_spawn,
        kills = report.kills,
        decrements = report.decrements,
        replacements = report.replacements,
        living = sim.living().len(),
        units = sim.total_units(),
        indicators = sim.engine().indicators().tracked_count(),
        "Simulation finished"
    );
    Ok(())
}
