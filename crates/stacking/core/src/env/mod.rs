//! Traits describing the host the engine runs inside.
//!
//! Oracles expose the world simulation, the persistent attribute container,
//! and the leveling subsystem. The [`StackEnv`] aggregate bundles them so the
//! engine can reach everything it needs without hard coupling to a concrete
//! host.
mod attributes;
mod error;
mod level;
pub mod memory;
mod world;

use std::sync::Arc;

pub use attributes::{AttributeOracle, STACK_SIZE_KEY};
pub use error::{ErrorSeverity, OracleError};
pub use level::{LevelGuard, LevelOracle};
pub use memory::MemoryWorld;
pub use world::WorldOracle;

/// Aggregates the oracles required by the stacking engine.
#[derive(Clone)]
pub struct StackEnv {
    pub world: Arc<dyn WorldOracle>,
    pub attributes: Arc<dyn AttributeOracle>,
    pub levels: Arc<dyn LevelOracle>,
}

impl StackEnv {
    pub fn new(
        world: Arc<dyn WorldOracle>,
        attributes: Arc<dyn AttributeOracle>,
        levels: Arc<dyn LevelOracle>,
    ) -> Self {
        Self {
            world,
            attributes,
            levels,
        }
    }

    /// Uses one object for every oracle, as the in-memory host does.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: WorldOracle + AttributeOracle + LevelOracle + 'static,
    {
        Self {
            world: host.clone(),
            attributes: host.clone(),
            levels: host,
        }
    }
}

impl std::fmt::Debug for StackEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackEnv").finish_non_exhaustive()
    }
}
