//! Death handling for stacked entities.
//!
//! A kill always accounts for exactly one unit. What happens to the rest of
//! the stack depends on `skip-death-animation`:
//!
//! - set: the host cancels the removal and the same entity lives on with one
//!   unit less;
//! - unset: the entity dies normally and a fresh replacement carrying the
//!   remaining units is spawned in its place.

use tracing::{debug, warn};

use super::StackingEngine;
use crate::env::{LevelGuard, OracleError};
use crate::state::EntityId;

/// What the host should do with a dying entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeathOutcome {
    /// Units that died; always 1.
    pub death_count: u32,
    /// The host must cancel the entity's removal.
    pub cancel_removal: bool,
    /// Entity spawned to carry the remaining units, if any.
    pub replacement: Option<EntityId>,
}

impl DeathOutcome {
    const fn ordinary() -> Self {
        Self {
            death_count: 1,
            cancel_removal: false,
            replacement: None,
        }
    }
}

/// Decision taken while the dying entity's critical section is held.
enum DeathStep {
    Ordinary,
    Decremented(i32),
    Split(i32),
}

impl StackingEngine {
    /// Turns the death of `id` into a decrement or a split.
    ///
    /// The count is read and written back in one critical section, so units
    /// merged into `id` by another context while it dies are kept.
    ///
    /// The host calls [`StackingEngine::remove_stack_display_on_death`] once
    /// its own death processing is done, whatever `cancel_removal` says. A
    /// host that already flags the entity dead when the event fires gets the
    /// decremented count stored but no marker; the marker comes back with the
    /// next count change.
    pub fn handle_stack_death(&self, id: EntityId) -> DeathOutcome {
        let skip_animation = self.config.skip_death_animation;
        let step = self.store.transaction(&[id], |txn| {
            let count = txn.get(id);
            if count <= 1 {
                return DeathStep::Ordinary;
            }
            let remaining = count - 1;
            if remaining == 0 {
                txn.remove(id);
                return DeathStep::Ordinary;
            }
            if skip_animation {
                txn.set(id, remaining);
                return DeathStep::Decremented(remaining);
            }
            // The units move to the replacement; the dying entity keeps none.
            txn.remove(id);
            DeathStep::Split(remaining)
        });

        match step {
            DeathStep::Ordinary => DeathOutcome::ordinary(),
            DeathStep::Decremented(remaining) => {
                debug!(entity = %id, remaining, "stack decremented in place");
                DeathOutcome {
                    cancel_removal: true,
                    ..DeathOutcome::ordinary()
                }
            }
            DeathStep::Split(remaining) => {
                let replacement = match self.spawn_replacement(id, remaining) {
                    Ok(replacement) => {
                        debug!(entity = %id, %replacement, remaining, "stack passed to replacement");
                        Some(replacement)
                    }
                    Err(err) => {
                        warn!(
                            entity = %id, remaining, error = %err,
                            severity = err.severity().as_str(),
                            "failed to spawn stack replacement, units lost"
                        );
                        None
                    }
                };
                DeathOutcome {
                    replacement,
                    ..DeathOutcome::ordinary()
                }
            }
        }
    }

    /// Spawns a same-kind entity where `original` stands, copies its level
    /// and hands it `remaining` units.
    fn spawn_replacement(&self, original: EntityId, remaining: i32) -> Result<EntityId, OracleError> {
        let world = self.env.world.as_ref();
        let kind = world
            .kind(original)
            .ok_or(OracleError::EntityNotFound(original))?;
        let location = world
            .location(original)
            .ok_or(OracleError::EntityNotFound(original))?;

        let replacement = world.spawn(kind, &location)?;

        let level = LevelGuard::acquire(self.env.levels.as_ref(), original).level();
        if let Some(level) = level {
            let guard = LevelGuard::acquire(self.env.levels.as_ref(), replacement);
            if let Err(err) = guard.apply_level(level) {
                warn!(%replacement, level, error = %err, "failed to copy level onto replacement");
            }
        }

        self.set_stack_size(replacement, remaining);
        Ok(replacement)
    }
}
