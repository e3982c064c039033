//! Compatibility predicate deciding whether two entities may merge.

use std::sync::Arc;

use crate::config::StackingConfig;
use crate::env::{LevelGuard, LevelOracle, WorldOracle};
use crate::state::EntityId;
use crate::store::StackStore;

/// Decides if two entities may become one stack.
///
/// Checks run in a fixed order and short-circuit:
/// 1. same kind,
/// 2. same world and within the stack radius,
/// 3. neither at capacity, neither dead or invalid,
/// 4. levelling parity, and levels within [`StackingConfig::LEVEL_TOLERANCE`].
///
/// Every check is symmetric, so `can_stack(a, b) == can_stack(b, a)`.
pub struct StackPredicate {
    world: Arc<dyn WorldOracle>,
    levels: Arc<dyn LevelOracle>,
    radius_squared: f64,
    max_stack_size: i32,
}

impl StackPredicate {
    pub fn new(
        world: Arc<dyn WorldOracle>,
        levels: Arc<dyn LevelOracle>,
        config: &StackingConfig,
    ) -> Self {
        let radius = config.stack_radius();
        Self {
            world,
            levels,
            radius_squared: radius * radius,
            max_stack_size: config.max_stack_size(),
        }
    }

    /// Must not be called from inside a [`StackStore::transaction`] holding
    /// either entity: it reads counts through the store.
    pub fn can_stack(&self, store: &StackStore, a: EntityId, b: EntityId) -> bool {
        if a == b {
            return false;
        }

        match (self.world.kind(a), self.world.kind(b)) {
            (Some(kind_a), Some(kind_b)) if kind_a == kind_b => {}
            _ => return false,
        }

        let (Some(loc_a), Some(loc_b)) = (self.world.location(a), self.world.location(b)) else {
            return false;
        };
        match loc_a.distance_squared(&loc_b) {
            Some(distance_squared) if distance_squared <= self.radius_squared => {}
            _ => return false,
        }

        if store.get_stack_size(a) >= self.max_stack_size
            || store.get_stack_size(b) >= self.max_stack_size
        {
            return false;
        }
        if !self.world.is_alive(a) || !self.world.is_alive(b) {
            return false;
        }

        self.levels_compatible(a, b)
    }

    fn levels_compatible(&self, a: EntityId, b: EntityId) -> bool {
        let guard_a = LevelGuard::acquire(self.levels.as_ref(), a);
        let guard_b = LevelGuard::acquire(self.levels.as_ref(), b);

        let levelled = guard_a.is_levelled();
        if levelled != guard_b.is_levelled() {
            return false;
        }
        if !levelled {
            return true;
        }
        match (guard_a.level(), guard_b.level()) {
            (Some(level_a), Some(level_b)) => {
                (i64::from(level_a) - i64::from(level_b)).abs()
                    <= i64::from(StackingConfig::LEVEL_TOLERANCE)
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryWorld;
    use crate::indicator::IndicatorSync;
    use crate::state::{EntityKind, Location, WorldId};

    struct Fixture {
        world: Arc<MemoryWorld>,
        store: StackStore,
        predicate: StackPredicate,
    }

    fn fixture() -> Fixture {
        let config = StackingConfig::default();
        let world = Arc::new(MemoryWorld::new());
        let indicators = Arc::new(IndicatorSync::new(world.clone(), &config));
        let store = StackStore::new(world.clone(), indicators, config.max_stack_size());
        let predicate = StackPredicate::new(world.clone(), world.clone(), &config);
        Fixture {
            world,
            store,
            predicate,
        }
    }

    fn at(x: f64) -> Location {
        Location::at(WorldId(0), x, 64.0, 0.0)
    }

    impl Fixture {
        fn both_ways(&self, a: EntityId, b: EntityId) -> bool {
            let forward = self.predicate.can_stack(&self.store, a, b);
            assert_eq!(forward, self.predicate.can_stack(&self.store, b, a));
            forward
        }
    }

    #[test]
    fn same_kind_within_radius_stacks() {
        let f = fixture();
        let a = f.world.add_mob(EntityKind::Zombie, at(0.0));
        let b = f.world.add_mob(EntityKind::Zombie, at(25.0));
        assert!(f.both_ways(a, b));
    }

    #[test]
    fn different_kind_or_distance_rejects() {
        let f = fixture();
        let a = f.world.add_mob(EntityKind::Zombie, at(0.0));
        let husk = f.world.add_mob(EntityKind::Husk, at(1.0));
        let far = f.world.add_mob(EntityKind::Zombie, at(25.1));
        let other_world = f
            .world
            .add_mob(EntityKind::Zombie, Location::at(WorldId(1), 0.0, 64.0, 0.0));

        assert!(!f.both_ways(a, husk));
        assert!(!f.both_ways(a, far));
        assert!(!f.both_ways(a, other_world));
        assert!(!f.both_ways(a, a));
    }

    #[test]
    fn full_or_dead_entities_reject() {
        let f = fixture();
        let a = f.world.add_mob(EntityKind::Zombie, at(0.0));
        let full = f.world.add_mob(EntityKind::Zombie, at(1.0));
        let dead = f.world.add_mob(EntityKind::Zombie, at(2.0));
        f.store.set_stack_size(full, 64);
        f.world.kill(dead);

        assert!(!f.both_ways(a, full));
        assert!(!f.both_ways(a, dead));
    }

    #[test]
    fn level_parity_and_tolerance() {
        let f = fixture();
        let plain = f.world.add_mob(EntityKind::Zombie, at(0.0));
        let lvl_5 = f.world.add_levelled_mob(EntityKind::Zombie, at(1.0), 5);
        let lvl_15 = f.world.add_levelled_mob(EntityKind::Zombie, at(2.0), 15);
        let lvl_16 = f.world.add_levelled_mob(EntityKind::Zombie, at(3.0), 16);

        assert!(!f.both_ways(plain, lvl_5));
        assert!(f.both_ways(lvl_5, lvl_15));
        assert!(!f.both_ways(lvl_5, lvl_16));
    }

    #[test]
    fn level_handles_are_released_on_every_path() {
        let f = fixture();
        let plain = f.world.add_mob(EntityKind::Zombie, at(0.0));
        let lvl_1 = f.world.add_levelled_mob(EntityKind::Zombie, at(1.0), 1);
        let lvl_50 = f.world.add_levelled_mob(EntityKind::Zombie, at(2.0), 50);

        f.predicate.can_stack(&f.store, plain, lvl_1);
        f.predicate.can_stack(&f.store, lvl_1, lvl_50);
        f.predicate.can_stack(&f.store, plain, plain);

        assert_eq!(f.world.open_level_handles(), 0);
    }
}
