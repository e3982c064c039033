//! Stacking simulation client.
//!
//! Composition root for the `stacking-sim` binary:
//! - [`config`] reads the simulation parameters from the environment,
//! - [`logging`] installs the session log,
//! - [`sim`] drives random spawns and kills against an in-memory world while
//!   the runtime lanes run the periodic stacking activities.

pub mod config;
pub mod logging;
pub mod sim;

pub use config::SimConfig;
pub use sim::{SimReport, Simulation};
