//! Persistent per-entity attribute container exposed by the host.

use crate::state::EntityId;

/// Key under which the stack count is persisted.
pub const STACK_SIZE_KEY: &str = "stacking:stack_size";

/// Integer attributes persisted alongside an entity.
///
/// Implementations only need to be internally consistent per call; the
/// engine serializes read-modify-write sequences itself.
pub trait AttributeOracle: Send + Sync {
    fn get_int(&self, id: EntityId, key: &str) -> Option<i32>;

    fn set_int(&self, id: EntityId, key: &str, value: i32);

    fn remove(&self, id: EntityId, key: &str);
}
