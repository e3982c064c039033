//! Stack state store: typed access to the persisted stack count.
//!
//! The count lives in the host's per-entity attribute container under
//! [`STACK_SIZE_KEY`]. A missing attribute means a count of 1. Every access
//! runs inside a per-entity critical section taken from a striped lock table,
//! so independent scheduling contexts touching the same entity are
//! serialized.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::env::{AttributeOracle, STACK_SIZE_KEY};
use crate::indicator::IndicatorSync;
use crate::state::EntityId;

/// Number of lock stripes shared by all entities.
const LOCK_STRIPES: usize = 64;

pub struct StackStore {
    attributes: Arc<dyn AttributeOracle>,
    indicators: Arc<IndicatorSync>,
    max_stack_size: i32,
    stripes: Box<[Mutex<()>]>,
}

impl StackStore {
    pub fn new(
        attributes: Arc<dyn AttributeOracle>,
        indicators: Arc<IndicatorSync>,
        max_stack_size: i32,
    ) -> Self {
        Self {
            attributes,
            indicators,
            max_stack_size: max_stack_size.max(1),
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    #[inline]
    fn stripe_of(id: EntityId) -> usize {
        id.0 as usize % LOCK_STRIPES
    }

    pub fn max_stack_size(&self) -> i32 {
        self.max_stack_size
    }

    /// Runs `f` while holding the critical sections of every entity in `ids`.
    ///
    /// Stripes are locked in ascending order, so concurrent transactions over
    /// overlapping entity sets cannot deadlock.
    pub fn transaction<R>(&self, ids: &[EntityId], f: impl FnOnce(&mut StackTxn<'_>) -> R) -> R {
        let mut stripes: Vec<usize> = ids.iter().map(|&id| Self::stripe_of(id)).collect();
        stripes.sort_unstable();
        stripes.dedup();

        let guards = stripes
            .iter()
            .map(|&i| self.stripes[i].lock().unwrap_or_else(PoisonError::into_inner))
            .collect();
        let mut txn = StackTxn {
            store: self,
            stripes,
            _guards: guards,
        };
        f(&mut txn)
    }

    /// Stored count, or 1 if absent.
    pub fn get_stack_size(&self, id: EntityId) -> i32 {
        self.transaction(&[id], |txn| txn.get(id))
    }

    /// Persists `size` clamped to capacity; sizes below 1 clear the stack.
    ///
    /// Returns the stored count, or `None` when the stack was cleared.
    pub fn set_stack_size(&self, id: EntityId, size: i32) -> Option<i32> {
        self.transaction(&[id], |txn| txn.set(id, size))
    }

    pub fn increment_stack_size(&self, id: EntityId, delta: i32) -> Option<i32> {
        self.transaction(&[id], |txn| txn.increment(id, delta))
    }

    /// Clears the stored count and destroys any indicator. Idempotent.
    pub fn remove_stack_data(&self, id: EntityId) {
        self.transaction(&[id], |txn| txn.remove(id))
    }

    pub fn is_stacked(&self, id: EntityId) -> bool {
        self.get_stack_size(id) > 1
    }
}

/// Stack operations performed while the relevant critical sections are held.
pub struct StackTxn<'a> {
    store: &'a StackStore,
    stripes: Vec<usize>,
    _guards: Vec<MutexGuard<'a, ()>>,
}

impl StackTxn<'_> {
    fn check_held(&self, id: EntityId) {
        debug_assert!(
            self.stripes.binary_search(&StackStore::stripe_of(id)).is_ok(),
            "entity {id} accessed outside its critical section"
        );
    }

    pub fn get(&self, id: EntityId) -> i32 {
        self.check_held(id);
        self.store
            .attributes
            .get_int(id, STACK_SIZE_KEY)
            .map_or(1, |stored| stored.clamp(1, self.store.max_stack_size))
    }

    pub fn set(&mut self, id: EntityId, size: i32) -> Option<i32> {
        self.check_held(id);
        if size < 1 {
            self.remove(id);
            return None;
        }
        let actual = size.min(self.store.max_stack_size);
        self.store.attributes.set_int(id, STACK_SIZE_KEY, actual);
        self.store.indicators.update(id, actual);
        Some(actual)
    }

    pub fn increment(&mut self, id: EntityId, delta: i32) -> Option<i32> {
        let current = self.get(id);
        self.set(id, current.saturating_add(delta))
    }

    pub fn remove(&mut self, id: EntityId) {
        self.check_held(id);
        self.store.attributes.remove(id, STACK_SIZE_KEY);
        self.store.indicators.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StackingConfig;
    use crate::env::{MemoryWorld, WorldOracle};
    use crate::state::{EntityKind, Location, WorldId};

    fn setup(max: i32) -> (Arc<MemoryWorld>, StackStore, EntityId) {
        let world = Arc::new(MemoryWorld::new());
        let indicators = Arc::new(IndicatorSync::new(world.clone(), &StackingConfig::default()));
        let store = StackStore::new(world.clone(), indicators, max);
        let id = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 0.0, 0.0, 0.0));
        (world, store, id)
    }

    #[test]
    fn absent_attribute_reads_as_one() {
        let (_world, store, id) = setup(64);
        assert_eq!(store.get_stack_size(id), 1);
        assert!(!store.is_stacked(id));
    }

    #[test]
    fn set_clamps_to_capacity() {
        let (world, store, id) = setup(64);
        assert_eq!(store.set_stack_size(id, 100), Some(64));
        assert_eq!(store.get_stack_size(id), 64);
        assert_eq!(world.get_int(id, STACK_SIZE_KEY), Some(64));
    }

    #[test]
    fn non_positive_size_clears_stack_and_indicator() {
        let (world, store, id) = setup(64);
        store.set_stack_size(id, 5);
        assert_eq!(world.markers().len(), 1);

        assert_eq!(store.set_stack_size(id, 0), None);
        assert_eq!(world.get_int(id, STACK_SIZE_KEY), None);
        assert!(world.markers().is_empty());

        store.remove_stack_data(id);
        assert_eq!(store.get_stack_size(id), 1);
    }

    #[test]
    fn corrupt_stored_values_are_clamped_on_read() {
        let (world, store, id) = setup(10);
        world.set_int(id, STACK_SIZE_KEY, -4);
        assert_eq!(store.get_stack_size(id), 1);
        world.set_int(id, STACK_SIZE_KEY, 99);
        assert_eq!(store.get_stack_size(id), 10);
    }

    #[test]
    fn increment_reads_and_writes_in_one_section() {
        let (_world, store, id) = setup(64);
        assert_eq!(store.increment_stack_size(id, 1), Some(2));
        assert_eq!(store.increment_stack_size(id, 3), Some(5));
        assert_eq!(store.increment_stack_size(id, -5), None);
        assert_eq!(store.get_stack_size(id), 1);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let (world, store, id) = setup(10_000);
        let store = Arc::new(store);
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.increment_stack_size(id, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.get_stack_size(id), 801);
        assert!(world.is_valid(id));
    }

    #[test]
    fn transaction_over_colliding_stripes_does_not_deadlock() {
        let (world, store, a) = setup(64);
        // Same stripe as `a`.
        let b = EntityId(a.0 + LOCK_STRIPES as u32);
        store.transaction(&[a, b, a], |txn| {
            txn.set(a, 3);
            txn.set(b, 4);
        });
        assert_eq!(store.get_stack_size(a), 3);
        assert!(!world.is_valid(b));
    }
}
