//! World oracle: the host's entity simulation as seen by the engine.

use super::OracleError;
use crate::state::{EntityId, EntityKind, Location, Observer};

/// Access to the host world.
///
/// Every accessor tolerates ids that no longer exist: lookups return `None`
/// or `false`, and `remove` on a missing entity is a no-op. The engine relies
/// on this to treat world-state races as silent aborts.
pub trait WorldOracle: Send + Sync {
    /// Entity kinds the running host version can spawn.
    fn supported_kinds(&self) -> Vec<EntityKind>;

    fn kind(&self, id: EntityId) -> Option<EntityKind>;

    fn location(&self, id: EntityId) -> Option<Location>;

    /// Height of the entity's bounding box.
    fn height(&self, id: EntityId) -> Option<f64>;

    /// False once the entity has been removed or unloaded.
    fn is_valid(&self, id: EntityId) -> bool;

    fn is_dead(&self, id: EntityId) -> bool;

    /// Entities inside the axis-aligned cube of `half_extent` centered on
    /// `center`, including markers.
    fn nearby_entities(&self, center: &Location, half_extent: f64) -> Vec<EntityId>;

    /// Spawns a fresh creature of `kind`.
    fn spawn(&self, kind: EntityKind, location: &Location) -> Result<EntityId, OracleError>;

    /// Removes an entity from the world.
    fn remove(&self, id: EntityId);

    /// Spawns a non-physical, non-collidable, invulnerable marker that shows
    /// `text` and never picks anything up.
    fn spawn_marker(&self, location: &Location, text: &str) -> Result<EntityId, OracleError>;

    fn set_marker_text(&self, marker: EntityId, text: &str);

    fn teleport(&self, id: EntityId, location: &Location);

    /// Every connected observer, including offline or dead ones.
    fn observers(&self) -> Vec<Observer>;

    /// True if the entity can still take part in stacking.
    fn is_alive(&self, id: EntityId) -> bool {
        self.is_valid(id) && !self.is_dead(id)
    }
}
