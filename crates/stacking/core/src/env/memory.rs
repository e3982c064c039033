//! In-memory host for tests and local simulation runs.
//!
//! [`MemoryWorld`] implements every oracle over a single lock-protected map
//! and counts the calls that matter for cost assertions (spatial queries,
//! outstanding level handles).

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strum::IntoEnumIterator;

use super::{AttributeOracle, LevelOracle, OracleError, WorldOracle};
use crate::state::{EntityId, EntityKind, Location, Observer};

/// One entity tracked by the in-memory host.
#[derive(Clone, Debug, PartialEq)]
pub struct MemoryEntity {
    pub kind: EntityKind,
    pub location: Location,
    pub height: f64,
    pub dead: bool,
    /// Display text, only set on markers.
    pub text: Option<String>,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_id: u32,
    entities: BTreeMap<EntityId, MemoryEntity>,
    observers: Vec<Observer>,
    attributes: HashMap<(EntityId, String), i32>,
    levels: HashMap<EntityId, i32>,
    supported: Vec<EntityKind>,
    spawn_failure: Option<String>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    fn insert(&mut self, kind: EntityKind, location: Location, text: Option<String>) -> EntityId {
        let id = self.allocate_id();
        let height = if kind.is_living() {
            MemoryWorld::DEFAULT_HEIGHT
        } else {
            MemoryWorld::MARKER_HEIGHT
        };
        self.entities.insert(
            id,
            MemoryEntity {
                kind,
                location,
                height,
                dead: false,
                text,
            },
        );
        id
    }
}

/// In-memory implementation of [`WorldOracle`], [`AttributeOracle`] and
/// [`LevelOracle`].
#[derive(Debug)]
pub struct MemoryWorld {
    state: RwLock<MemoryState>,
    spatial_queries: AtomicUsize,
    open_level_handles: AtomicI64,
}

impl MemoryWorld {
    pub const DEFAULT_HEIGHT: f64 = 1.95;
    pub const MARKER_HEIGHT: f64 = 0.5;

    /// Creates an empty world whose host supports every known kind.
    pub fn new() -> Self {
        Self::with_supported_kinds(EntityKind::iter().collect())
    }

    /// Creates an empty world that only supports `supported`, as an older
    /// host version would.
    pub fn with_supported_kinds(supported: Vec<EntityKind>) -> Self {
        Self {
            state: RwLock::new(MemoryState {
                supported,
                ..MemoryState::default()
            }),
            spatial_queries: AtomicUsize::new(0),
            open_level_handles: AtomicI64::new(0),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, MemoryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, MemoryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ===== scenario setup =====

    /// Places an unlevelled creature without going through spawn checks.
    pub fn add_mob(&self, kind: EntityKind, location: Location) -> EntityId {
        self.write().insert(kind, location, None)
    }

    pub fn add_levelled_mob(&self, kind: EntityKind, location: Location, level: i32) -> EntityId {
        let mut state = self.write();
        let id = state.insert(kind, location, None);
        state.levels.insert(id, level);
        id
    }

    pub fn add_observer(&self, location: Location) -> EntityId {
        let mut state = self.write();
        let id = state.allocate_id();
        state.observers.push(Observer::new(id, location));
        id
    }

    pub fn set_observer_online(&self, id: EntityId, online: bool) {
        if let Some(observer) = self.write().observers.iter_mut().find(|o| o.id == id) {
            observer.online = online;
        }
    }

    pub fn move_observer(&self, id: EntityId, location: Location) {
        if let Some(observer) = self.write().observers.iter_mut().find(|o| o.id == id) {
            observer.location = location;
        }
    }

    /// Marks an entity dead while keeping it valid, as a host does during
    /// death processing.
    pub fn kill(&self, id: EntityId) {
        if let Some(entity) = self.write().entities.get_mut(&id) {
            entity.dead = true;
        }
    }

    pub fn move_entity(&self, id: EntityId, location: Location) {
        if let Some(entity) = self.write().entities.get_mut(&id) {
            entity.location = location;
        }
    }

    pub fn set_level(&self, id: EntityId, level: Option<i32>) {
        let mut state = self.write();
        match level {
            Some(level) => state.levels.insert(id, level),
            None => state.levels.remove(&id),
        };
    }

    /// Makes every following spawn fail with `reason`, or restores spawning.
    pub fn fail_spawns(&self, reason: Option<&str>) {
        self.write().spawn_failure = reason.map(str::to_owned);
    }

    // ===== inspection =====

    pub fn entity(&self, id: EntityId) -> Option<MemoryEntity> {
        self.read().entities.get(&id).cloned()
    }

    pub fn marker_text(&self, id: EntityId) -> Option<String> {
        self.read().entities.get(&id).and_then(|e| e.text.clone())
    }

    /// Ids of every marker currently in the world.
    pub fn markers(&self) -> Vec<EntityId> {
        self.read()
            .entities
            .iter()
            .filter(|(_, e)| !e.kind.is_living())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Ids of living, non-dead creatures of `kind`.
    pub fn living(&self, kind: EntityKind) -> Vec<EntityId> {
        self.read()
            .entities
            .iter()
            .filter(|(_, e)| e.kind == kind && !e.dead)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn spatial_queries(&self) -> usize {
        self.spatial_queries.load(Ordering::Relaxed)
    }

    /// Level handles acquired but not yet released.
    pub fn open_level_handles(&self) -> i64 {
        self.open_level_handles.load(Ordering::SeqCst)
    }
}

impl Default for MemoryWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldOracle for MemoryWorld {
    fn supported_kinds(&self) -> Vec<EntityKind> {
        self.read().supported.clone()
    }

    fn kind(&self, id: EntityId) -> Option<EntityKind> {
        self.read().entities.get(&id).map(|e| e.kind)
    }

    fn location(&self, id: EntityId) -> Option<Location> {
        self.read().entities.get(&id).map(|e| e.location)
    }

    fn height(&self, id: EntityId) -> Option<f64> {
        self.read().entities.get(&id).map(|e| e.height)
    }

    fn is_valid(&self, id: EntityId) -> bool {
        self.read().entities.contains_key(&id)
    }

    fn is_dead(&self, id: EntityId) -> bool {
        self.read().entities.get(&id).is_none_or(|e| e.dead)
    }

    fn nearby_entities(&self, center: &Location, half_extent: f64) -> Vec<EntityId> {
        self.spatial_queries.fetch_add(1, Ordering::Relaxed);
        self.read()
            .entities
            .iter()
            .filter(|(_, e)| {
                e.location.world == center.world
                    && center.position.within_cube(&e.location.position, half_extent)
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn spawn(&self, kind: EntityKind, location: &Location) -> Result<EntityId, OracleError> {
        let mut state = self.write();
        if let Some(reason) = state.spawn_failure.clone() {
            return Err(OracleError::SpawnRejected {
                kind,
                location: *location,
                reason,
            });
        }
        if !state.supported.contains(&kind) {
            return Err(OracleError::UnsupportedKind(kind));
        }
        Ok(state.insert(kind, *location, None))
    }

    fn remove(&self, id: EntityId) {
        let mut state = self.write();
        if state.entities.remove(&id).is_some() {
            state.attributes.retain(|(owner, _), _| *owner != id);
            state.levels.remove(&id);
        }
    }

    fn spawn_marker(&self, location: &Location, text: &str) -> Result<EntityId, OracleError> {
        let mut state = self.write();
        if let Some(reason) = state.spawn_failure.clone() {
            return Err(OracleError::SpawnRejected {
                kind: EntityKind::DisplayMarker,
                location: *location,
                reason,
            });
        }
        Ok(state.insert(EntityKind::DisplayMarker, *location, Some(text.to_owned())))
    }

    fn set_marker_text(&self, marker: EntityId, text: &str) {
        if let Some(entity) = self.write().entities.get_mut(&marker) {
            entity.text = Some(text.to_owned());
        }
    }

    fn teleport(&self, id: EntityId, location: &Location) {
        self.move_entity(id, *location);
    }

    fn observers(&self) -> Vec<Observer> {
        self.read().observers.clone()
    }
}

impl AttributeOracle for MemoryWorld {
    fn get_int(&self, id: EntityId, key: &str) -> Option<i32> {
        self.read().attributes.get(&(id, key.to_owned())).copied()
    }

    fn set_int(&self, id: EntityId, key: &str, value: i32) {
        let mut state = self.write();
        // Attributes live on the entity; a removed entity has nowhere to keep them.
        if state.entities.contains_key(&id) {
            state.attributes.insert((id, key.to_owned()), value);
        }
    }

    fn remove(&self, id: EntityId, key: &str) {
        self.write().attributes.remove(&(id, key.to_owned()));
    }
}

impl LevelOracle for MemoryWorld {
    fn is_levelled(&self, id: EntityId) -> bool {
        self.read().levels.contains_key(&id)
    }

    fn level(&self, id: EntityId) -> Option<i32> {
        self.read().levels.get(&id).copied()
    }

    fn apply_level(&self, id: EntityId, level: i32) -> Result<(), OracleError> {
        let mut state = self.write();
        if !state.entities.contains_key(&id) {
            return Err(OracleError::EntityNotFound(id));
        }
        state.levels.insert(id, level);
        Ok(())
    }

    fn acquire(&self, _id: EntityId) {
        self.open_level_handles.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self, _id: EntityId) {
        self.open_level_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WorldId;

    #[test]
    fn removal_drops_attributes_and_levels() {
        let world = MemoryWorld::new();
        let id = world.add_levelled_mob(
            EntityKind::Zombie,
            Location::at(WorldId::OVERWORLD, 0.0, 64.0, 0.0),
            7,
        );
        world.set_int(id, "k", 3);
        WorldOracle::remove(&world, id);

        assert!(!world.is_valid(id));
        assert!(world.is_dead(id));
        assert_eq!(world.get_int(id, "k"), None);
        assert!(!world.is_levelled(id));

        // Writing to a removed entity is dropped.
        world.set_int(id, "k", 3);
        assert_eq!(world.get_int(id, "k"), None);
    }

    #[test]
    fn spawn_respects_capability_table_and_failures() {
        let world = MemoryWorld::with_supported_kinds(vec![EntityKind::Zombie]);
        let here = Location::at(WorldId::OVERWORLD, 0.0, 0.0, 0.0);

        assert!(world.spawn(EntityKind::Zombie, &here).is_ok());
        assert_eq!(
            world.spawn(EntityKind::Breeze, &here),
            Err(OracleError::UnsupportedKind(EntityKind::Breeze))
        );

        world.fail_spawns(Some("chunk unloaded"));
        let err = world.spawn(EntityKind::Zombie, &here).unwrap_err();
        assert!(matches!(err, OracleError::SpawnRejected { .. }));
    }

    #[test]
    fn nearby_query_is_cubic_and_per_world() {
        let world = MemoryWorld::new();
        let center = Location::at(WorldId(0), 0.0, 0.0, 0.0);
        let inside = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 4.0, 4.0, 4.0));
        let _outside = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 6.0, 0.0, 0.0));
        let _elsewhere = world.add_mob(EntityKind::Zombie, Location::at(WorldId(1), 0.0, 0.0, 0.0));

        assert_eq!(world.nearby_entities(&center, 5.0), vec![inside]);
        assert_eq!(world.spatial_queries(), 1);
    }
}
