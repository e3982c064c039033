//! Oracle access errors.
//!
//! Host operations can fail for reasons outside the engine's control. None of
//! them are allowed to abort a tick: callers degrade to a no-op and log.

use crate::state::{EntityId, EntityKind, Location};

/// How a failed host operation should be treated by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// World state moved on underneath us; abort silently.
    Transient,
    /// Work was lost but the engine stays consistent; log a warning.
    Degraded,
    /// The host cannot do this at all; treat as "not eligible".
    Unsupported,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "transient",
            Self::Degraded => "degraded",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Errors reported by host oracles.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum OracleError {
    /// The host refused to spawn an entity.
    #[error("spawning {kind} at {location} was rejected: {reason}")]
    SpawnRejected {
        kind: EntityKind,
        location: Location,
        reason: String,
    },

    /// The running host does not know this entity kind.
    #[error("entity kind {0} is not supported by this host")]
    UnsupportedKind(EntityKind),

    /// The entity vanished before the operation could run.
    #[error("entity {0} not found")]
    EntityNotFound(EntityId),

    /// The leveling subsystem refused to apply a level.
    #[error("applying level {level} to {entity} was rejected: {reason}")]
    LevelRejected {
        entity: EntityId,
        level: i32,
        reason: String,
    },
}

impl OracleError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            OracleError::EntityNotFound(_) => ErrorSeverity::Transient,
            OracleError::SpawnRejected { .. } | OracleError::LevelRejected { .. } => {
                ErrorSeverity::Degraded
            }
            OracleError::UnsupportedKind(_) => ErrorSeverity::Unsupported,
        }
    }
}
