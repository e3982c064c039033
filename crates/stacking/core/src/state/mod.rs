//! Identifiers and plain value types shared by the engine and its oracles.
mod common;
mod kind;

pub use common::{EntityId, Location, Observer, Position, RegionId, WorldId};
pub use kind::EntityKind;
