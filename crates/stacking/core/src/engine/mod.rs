//! Stacking engine: the single entry point hosts talk to.
//!
//! [`StackingEngine`] is constructed once per configuration load and shared
//! by reference (typically `Arc`) with every event handler and scheduled
//! activity. It owns the stack store, the compatibility predicate, and the
//! indicator synchronizer; there is no ambient global state.
//!
//! Operations are split by concern:
//! - [`merge`] handles pairwise merges and merge-on-spawn,
//! - [`sweep`] runs the periodic world-wide clustering pass,
//! - [`death`] turns kills on stacked entities into decrements or splits.

mod death;
mod merge;
mod sweep;

use std::sync::Arc;

use tracing::info;

pub use death::DeathOutcome;
pub use merge::SpawnOutcome;
pub use sweep::SweepReport;

use crate::config::StackingConfig;
use crate::eligibility::EligibleKinds;
use crate::env::StackEnv;
use crate::indicator::{IndicatorSync, TrackReport};
use crate::predicate::StackPredicate;
use crate::state::{EntityId, EntityKind, Location};
use crate::store::StackStore;

pub struct StackingEngine {
    config: StackingConfig,
    env: StackEnv,
    eligible: EligibleKinds,
    indicators: Arc<IndicatorSync>,
    store: StackStore,
    predicate: StackPredicate,
}

impl StackingEngine {
    /// Builds an engine for `config` on top of the host described by `env`.
    ///
    /// The eligible kind set is resolved here, once, against the host's
    /// capability table.
    pub fn new(config: StackingConfig, env: StackEnv) -> Self {
        let eligible =
            EligibleKinds::resolve(config.requested_kinds(), &env.world.supported_kinds());
        let indicators = Arc::new(IndicatorSync::new(env.world.clone(), &config));
        let store = StackStore::new(
            env.attributes.clone(),
            indicators.clone(),
            config.max_stack_size(),
        );
        let predicate = StackPredicate::new(env.world.clone(), env.levels.clone(), &config);

        if config.enabled {
            info!(
                max = config.max_stack_size(),
                radius = config.stack_radius(),
                require_player_nearby = config.require_player_nearby,
                kinds = eligible.len(),
                "mob stacking enabled"
            );
        }

        Self {
            config,
            env,
            eligible,
            indicators,
            store,
            predicate,
        }
    }

    pub fn config(&self) -> &StackingConfig {
        &self.config
    }

    pub fn env(&self) -> &StackEnv {
        &self.env
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    // ===== stack state =====

    pub fn get_stack_size(&self, id: EntityId) -> i32 {
        self.store.get_stack_size(id)
    }

    pub fn set_stack_size(&self, id: EntityId, size: i32) -> Option<i32> {
        self.store.set_stack_size(id, size)
    }

    pub fn increment_stack_size(&self, id: EntityId, delta: i32) -> Option<i32> {
        self.store.increment_stack_size(id, delta)
    }

    pub fn remove_stack_data(&self, id: EntityId) {
        self.store.remove_stack_data(id)
    }

    pub fn is_stacked(&self, id: EntityId) -> bool {
        self.store.is_stacked(id)
    }

    // ===== eligibility =====

    pub fn can_stack_type(&self, kind: EntityKind) -> bool {
        self.eligible.contains(kind)
    }

    pub fn can_stack(&self, a: EntityId, b: EntityId) -> bool {
        self.predicate.can_stack(&self.store, a, b)
    }

    /// Eligible kind, still valid and not dead.
    fn is_candidate(&self, id: EntityId) -> bool {
        self.env
            .world
            .kind(id)
            .is_some_and(|kind| self.can_stack_type(kind))
            && self.env.world.is_alive(id)
    }

    // ===== indicators =====

    pub fn indicators(&self) -> &IndicatorSync {
        &self.indicators
    }

    pub fn format_stack_display(&self, count: i32) -> String {
        self.indicators.format(count)
    }

    pub fn update_stack_display(&self, id: EntityId, count: i32) {
        self.indicators.update(id, count)
    }

    /// Call after the host finished death processing, whether or not the
    /// removal was cancelled.
    pub fn remove_stack_display_on_death(&self, id: EntityId) {
        self.indicators.remove(id);
    }

    /// One indicator tracking pass; see [`IndicatorSync::track`].
    pub fn track_indicators<F>(&self, in_scope: F) -> TrackReport
    where
        F: Fn(&Location) -> bool,
    {
        self.indicators.track(in_scope)
    }
}

impl std::fmt::Debug for StackingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackingEngine")
            .field("config", &self.config)
            .field("eligible", &self.eligible)
            .finish_non_exhaustive()
    }
}
