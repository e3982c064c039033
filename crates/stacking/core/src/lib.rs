//! Mob stacking engine.
//!
//! `stacking-core` collapses groups of compatible, nearby creatures into one
//! representative carrying an integer count, keeps a floating count indicator
//! above it, and splits the stack back apart one unit per kill. The host world,
//! its persistent attributes and the leveling subsystem are reached through
//! the oracle traits in [`env`]; all stacking decisions flow through
//! [`engine::StackingEngine`].
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod env;
pub mod indicator;
pub mod predicate;
pub mod state;
pub mod store;

pub use config::StackingConfig;
pub use eligibility::EligibleKinds;
pub use engine::{DeathOutcome, SpawnOutcome, StackingEngine, SweepReport};
pub use env::{
    AttributeOracle, ErrorSeverity, LevelGuard, LevelOracle, MemoryWorld, OracleError, StackEnv,
    WorldOracle, STACK_SIZE_KEY,
};
pub use indicator::{IndicatorSync, TrackReport, format_stack_display};
pub use predicate::StackPredicate;
pub use state::{EntityId, EntityKind, Location, Observer, Position, RegionId, WorldId};
pub use store::{StackStore, StackTxn};
