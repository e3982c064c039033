//! Random spawn/kill driver over the in-memory host.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use stacking_core::{
    DeathOutcome, EntityId, EntityKind, Location, MemoryWorld, SpawnOutcome, StackEnv,
    StackingConfig, StackingEngine, WorldId, WorldOracle,
};
use tracing::debug;

/// Kinds the driver spawns. Cows are never stackable and act as noise.
pub const SPAWN_KINDS: &[EntityKind] = &[
    EntityKind::Zombie,
    EntityKind::Skeleton,
    EntityKind::Spider,
    EntityKind::Creeper,
    EntityKind::Husk,
    EntityKind::Cow,
];

/// Half side of the square around an observer where creatures appear.
const SPAWN_SPREAD: f64 = 60.0;
/// Distance between two neighboring observers.
const OBSERVER_SPACING: f64 = 400.0;
const LEVELLED_CHANCE: f64 = 0.3;
const MAX_LEVEL: i32 = 20;
const WANDER_STEP: f64 = 1.5;

/// Counters accumulated over a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimReport {
    pub spawned: u64,
    pub merged_on_spawn: u64,
    pub kills: u64,
    pub decrements: u64,
    pub replacements: u64,
}

pub struct Simulation {
    world: Arc<MemoryWorld>,
    engine: Arc<StackingEngine>,
    rng: StdRng,
    observers: Vec<Location>,
    report: SimReport,
}

impl Simulation {
    pub fn new(config: StackingConfig, seed: u64) -> Self {
        let world = Arc::new(MemoryWorld::new());
        let engine = Arc::new(StackingEngine::new(config, StackEnv::from_host(world.clone())));
        Self {
            world,
            engine,
            rng: StdRng::seed_from_u64(seed),
            observers: Vec::new(),
            report: SimReport::default(),
        }
    }

    pub fn world(&self) -> &Arc<MemoryWorld> {
        &self.world
    }

    pub fn engine(&self) -> &Arc<StackingEngine> {
        &self.engine
    }

    pub fn report(&self) -> SimReport {
        self.report
    }

    /// Places `count` observers along the x axis of the overworld.
    pub fn add_observers(&mut self, count: usize) {
        for i in 0..count {
            let location = Location::at(WorldId::OVERWORLD, i as f64 * OBSERVER_SPACING, 64.0, 0.0);
            self.world.add_observer(location);
            self.observers.push(location);
        }
    }

    /// Spawns one random creature near a random observer and offers it to the
    /// engine.
    pub fn spawn_random(&mut self) -> SpawnOutcome {
        let anchor = self
            .observers
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Location::at(WorldId::OVERWORLD, 0.0, 64.0, 0.0));
        let location = Location::at(
            anchor.world,
            anchor.position.x + self.rng.gen_range(-SPAWN_SPREAD..=SPAWN_SPREAD),
            anchor.position.y,
            anchor.position.z + self.rng.gen_range(-SPAWN_SPREAD..=SPAWN_SPREAD),
        );
        let kind = SPAWN_KINDS
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(EntityKind::Zombie);

        let id = if self.rng.gen_bool(LEVELLED_CHANCE) {
            let level = self.rng.gen_range(1..=MAX_LEVEL);
            self.world.add_levelled_mob(kind, location, level)
        } else {
            self.world.add_mob(kind, location)
        };
        self.report.spawned += 1;

        let outcome = self.engine.try_stack_on_spawn(id);
        if matches!(outcome, SpawnOutcome::Merged { .. }) {
            self.report.merged_on_spawn += 1;
        }
        outcome
    }

    /// Kills one random creature, following the host death protocol.
    pub fn kill_random(&mut self) -> Option<DeathOutcome> {
        let living = self.living();
        let id = *living.choose(&mut self.rng)?;

        let outcome = self.engine.handle_stack_death(id);
        if !outcome.cancel_removal {
            self.world.kill(id);
            WorldOracle::remove(self.world.as_ref(), id);
        }
        self.engine.remove_stack_display_on_death(id);

        self.report.kills += 1;
        if outcome.cancel_removal {
            self.report.decrements += 1;
        }
        if outcome.replacement.is_some() {
            self.report.replacements += 1;
        }
        debug!(entity = %id, ?outcome, "simulated kill");
        Some(outcome)
    }

    /// Nudges every living creature a little, so indicators have to follow.
    pub fn wander(&mut self) {
        for id in self.living() {
            let Some(location) = self.world.location(id) else {
                continue;
            };
            let moved = Location::at(
                location.world,
                location.position.x + self.rng.gen_range(-WANDER_STEP..=WANDER_STEP),
                location.position.y,
                location.position.z + self.rng.gen_range(-WANDER_STEP..=WANDER_STEP),
            );
            self.world.move_entity(id, moved);
        }
    }

    /// One simulation step: a few spawns, one kill, some movement.
    pub fn step(&mut self) {
        for _ in 0..3 {
            self.spawn_random();
        }
        self.kill_random();
        self.wander();
    }

    /// Living creatures of every simulated kind.
    pub fn living(&self) -> Vec<EntityId> {
        let mut living: Vec<EntityId> = SPAWN_KINDS
            .iter()
            .flat_map(|&kind| self.world.living(kind))
            .collect();
        living.sort_unstable();
        living
    }

    /// Units represented by all living creatures.
    pub fn total_units(&self) -> i64 {
        self.living()
            .into_iter()
            .map(|id| i64::from(self.engine.get_stack_size(id)))
            .sum()
    }
}
