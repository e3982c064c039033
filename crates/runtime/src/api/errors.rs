//! Error types surfaced by the runtime API.
//!
//! Wraps failures from lane coordination and runtime assembly so clients can
//! bubble them up with consistent context.
use thiserror::Error;

use stacking_core::RegionId;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("lane worker command channel closed")]
    CommandChannelClosed,

    #[error("lane worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a stacking engine before building")]
    MissingEngine,

    #[error("regionized host reported no regions")]
    NoRegions,

    #[error("region {0} has no lane")]
    UnknownRegion(RegionId),
}
