//! Pairwise merging and merge-on-spawn.

use tracing::debug;

use super::StackingEngine;
use crate::state::EntityId;

/// What [`StackingEngine::try_stack_on_spawn`] did with a new entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// Stacking is off, or the entity is ineligible, dead, or unobserved.
    Skipped,
    /// The entity merged with a neighbor; `removed` left the world.
    Merged {
        survivor: EntityId,
        removed: EntityId,
    },
    /// No compatible neighbor; the entity now carries an explicit count of 1.
    Unstacked,
}

impl StackingEngine {
    /// Merges `b` into `a` or `a` into `b`, keeping the larger stack.
    ///
    /// Ties keep `a`. The combined count is capped at the maximum stack size
    /// and any excess is discarded. Returns the survivor, or `None` if the
    /// pair is not compatible or either entity stopped being alive before the
    /// mutation. Calling it again with an already removed entity is a no-op.
    pub fn merge_stacks(&self, a: EntityId, b: EntityId) -> Option<EntityId> {
        if !self.can_stack(a, b) {
            return None;
        }

        let world = self.env.world.as_ref();
        let max = self.config.max_stack_size();
        let (survivor, removed, total) = self.store.transaction(&[a, b], |txn| {
            // Time may have passed since the predicate ran.
            if !world.is_alive(a) || !world.is_alive(b) {
                return None;
            }
            let (count_a, count_b) = (txn.get(a), txn.get(b));
            let (survivor, removed) = if count_a >= count_b { (a, b) } else { (b, a) };
            let total = count_a.saturating_add(count_b);

            txn.set(survivor, total.min(max));
            txn.remove(removed);
            world.remove(removed);
            Some((survivor, removed, total))
        })?;

        if total > max {
            debug!(
                %survivor, %removed, kept = max, discarded = total - max,
                "merged stacks at capacity"
            );
        } else {
            debug!(%survivor, %removed, size = total, "merged stacks");
        }
        Some(survivor)
    }

    /// Tries to fold a freshly spawned entity into one nearby stack.
    ///
    /// Scans the cube of half extent `stack-radius` around the entity and
    /// merges with the first compatible neighbor, then stops. When nothing
    /// merges, the entity's count is written as 1 so later reads see an
    /// explicit value.
    pub fn try_stack_on_spawn(&self, id: EntityId) -> SpawnOutcome {
        if !self.config.enabled || !self.config.stack_on_spawn {
            return SpawnOutcome::Skipped;
        }
        if !self.is_candidate(id) || !self.has_player_nearby(id) {
            return SpawnOutcome::Skipped;
        }
        let Some(location) = self.env.world.location(id) else {
            return SpawnOutcome::Skipped;
        };

        let neighbors = self
            .env
            .world
            .nearby_entities(&location, self.config.stack_radius());
        for neighbor in neighbors {
            if neighbor == id || !self.is_candidate(neighbor) {
                continue;
            }
            if let Some(survivor) = self.merge_stacks(id, neighbor) {
                let removed = if survivor == id { neighbor } else { id };
                return SpawnOutcome::Merged { survivor, removed };
            }
        }

        self.set_stack_size(id, 1);
        SpawnOutcome::Unstacked
    }

    /// True if some online observer shares the entity's world and is within
    /// `player-check-radius`. Always true when observers are not required.
    pub fn has_player_nearby(&self, id: EntityId) -> bool {
        if !self.config.require_player_nearby {
            return true;
        }
        let Some(location) = self.env.world.location(id) else {
            return false;
        };
        let radius = self.config.player_check_radius();
        self.env
            .world
            .observers()
            .iter()
            .filter(|observer| observer.online)
            .any(|observer| {
                observer.location.world == location.world
                    && observer.location.position.distance(&location.position) <= radius
            })
    }
}
