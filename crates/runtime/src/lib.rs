//! Scheduling runtime for the stacking engine.
//!
//! This crate drives [`stacking_core::StackingEngine`] from tick lanes backed
//! by tokio tasks. Hosts embed [`StackingRuntime`] to get per-tick indicator
//! tracking and the periodic sweep registered on the right lanes.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`scheduler`] defines the scheduling capability and its two backends
//! - [`activities`] holds the periodic work registered on the lanes
//! - [`api`] exposes the error types downstream clients interact with
//! - `workers` keeps the lane tasks internal to the crate
pub mod activities;
pub mod api;
pub mod runtime;
pub mod scheduler;

mod workers;

pub use activities::{Cadence, StackingActivity, SweepActivity, TrackingActivity};
pub use api::{Result, RuntimeError};
pub use runtime::{RuntimeConfig, StackingRuntime, StackingRuntimeBuilder};
pub use scheduler::{
    Affinity, GlobalScheduler, HostCapabilities, LaneKind, RegionGrid, RegionScheduler,
    Registration, SchedulerConfig, TickContext, TickLane, TickScheduler, TickTask,
    select_scheduler,
};
