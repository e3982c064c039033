//! Leveling subsystem oracle and scoped access guard.

use super::OracleError;
use crate::state::EntityId;

/// The external leveling subsystem.
///
/// Level queries may need a host-side handle (a wrapper object, a cache
/// pin). `acquire`/`release` bracket every query; use [`LevelGuard`] instead
/// of calling them directly so the release can't be skipped.
pub trait LevelOracle: Send + Sync {
    fn is_levelled(&self, id: EntityId) -> bool;

    fn level(&self, id: EntityId) -> Option<i32>;

    /// Applies `level` cosmetically to a freshly spawned entity. No loot or
    /// stat side effects, nothing persisted beyond the level itself.
    fn apply_level(&self, id: EntityId, level: i32) -> Result<(), OracleError>;

    fn acquire(&self, _id: EntityId) {}

    fn release(&self, _id: EntityId) {}
}

/// Scoped handle over one entity's level state.
///
/// The handle is acquired on construction and released on drop, so every
/// exit path of the calling scope releases it.
pub struct LevelGuard<'a> {
    oracle: &'a dyn LevelOracle,
    id: EntityId,
}

impl<'a> LevelGuard<'a> {
    pub fn acquire(oracle: &'a dyn LevelOracle, id: EntityId) -> Self {
        oracle.acquire(id);
        Self { oracle, id }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn is_levelled(&self) -> bool {
        self.oracle.is_levelled(self.id)
    }

    /// Level of a levelled entity, `None` otherwise.
    pub fn level(&self) -> Option<i32> {
        if self.is_levelled() {
            self.oracle.level(self.id)
        } else {
            None
        }
    }

    pub fn apply_level(&self, level: i32) -> Result<(), OracleError> {
        self.oracle.apply_level(self.id, level)
    }
}

impl Drop for LevelGuard<'_> {
    fn drop(&mut self) {
        self.oracle.release(self.id);
    }
}
