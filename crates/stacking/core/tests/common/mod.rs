#![allow(dead_code)]

use std::sync::Arc;

use stacking_core::{
    EntityId, EntityKind, Location, MemoryWorld, StackEnv, StackingConfig, StackingEngine, WorldId,
};

pub struct Harness {
    pub world: Arc<MemoryWorld>,
    pub engine: StackingEngine,
}

impl Harness {
    pub fn new(config: StackingConfig) -> Self {
        let world = Arc::new(MemoryWorld::new());
        let engine = StackingEngine::new(config, StackEnv::from_host(world.clone()));
        Self { world, engine }
    }

    /// Adds a zombie at `x` and gives it `count` units.
    pub fn zombie(&self, x: f64, count: i32) -> EntityId {
        let id = self.world.add_mob(EntityKind::Zombie, at(x));
        if count > 1 {
            self.engine.set_stack_size(id, count);
        }
        id
    }

    pub fn indicator_text(&self, owner: EntityId) -> Option<String> {
        let marker = self.engine.indicators().indicator_for(owner)?;
        self.world.marker_text(marker)
    }
}

pub fn at(x: f64) -> Location {
    Location::at(WorldId::OVERWORLD, x, 64.0, 0.0)
}

/// Config with observers not required, so tests need no player setup.
pub fn unobserved() -> StackingConfig {
    StackingConfig {
        require_player_nearby: false,
        ..StackingConfig::default()
    }
}
