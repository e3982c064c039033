//! Stacking configuration constants and tunable parameters.

use crate::state::EntityKind;

/// Tunable parameters of the stacking engine.
///
/// Values are taken as loaded; nothing is validated at load time. Accessors
/// that feed the algorithms clamp out-of-range values at the point of use, so
/// a negative size or radius degrades to the nearest sane value instead of
/// breaking an invariant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct StackingConfig {
    pub enabled: bool,
    pub max_stack_size: i32,
    pub stack_radius: f64,
    pub stack_on_spawn: bool,
    pub skip_death_animation: bool,
    /// Indicators are only shown for stacks at least this large.
    pub min_stack_size: i32,
    pub require_player_nearby: bool,
    pub player_check_radius: f64,
    pub stack_display_format: String,
    /// Seconds between two world-wide sweeps.
    pub check_period: i64,
    /// Replaces [`EntityKind::DEFAULT_STACKABLE`] when present.
    pub entity_types: Option<Vec<EntityKind>>,
}

impl StackingConfig {
    // ===== fixed constants =====
    /// Largest level difference two levelled entities may have and still stack.
    pub const LEVEL_TOLERANCE: i32 = 10;
    /// Vertical gap between an entity's head and its indicator.
    pub const INDICATOR_MARGIN: f64 = 0.5;
    /// Placeholder substituted by the formatted count.
    pub const COUNT_PLACEHOLDER: &'static str = "%stack-size%";

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_MAX_STACK_SIZE: i32 = 64;
    pub const DEFAULT_STACK_RADIUS: f64 = 25.0;
    pub const DEFAULT_MIN_STACK_SIZE: i32 = 2;
    pub const DEFAULT_PLAYER_CHECK_RADIUS: f64 = 100.0;
    pub const DEFAULT_DISPLAY_FORMAT: &'static str = "&7x%stack-size%";
    pub const DEFAULT_CHECK_PERIOD: i64 = 3;

    pub fn new() -> Self {
        Self {
            enabled: true,
            max_stack_size: Self::DEFAULT_MAX_STACK_SIZE,
            stack_radius: Self::DEFAULT_STACK_RADIUS,
            stack_on_spawn: true,
            skip_death_animation: false,
            min_stack_size: Self::DEFAULT_MIN_STACK_SIZE,
            require_player_nearby: true,
            player_check_radius: Self::DEFAULT_PLAYER_CHECK_RADIUS,
            stack_display_format: Self::DEFAULT_DISPLAY_FORMAT.to_owned(),
            check_period: Self::DEFAULT_CHECK_PERIOD,
            entity_types: None,
        }
    }

    /// Effective capacity of a single stack (never below 1).
    pub fn max_stack_size(&self) -> i32 {
        self.max_stack_size.max(1)
    }

    /// Effective display threshold (never below 1).
    pub fn min_stack_size(&self) -> i32 {
        self.min_stack_size.max(1)
    }

    pub fn stack_radius(&self) -> f64 {
        non_negative(self.stack_radius)
    }

    pub fn player_check_radius(&self) -> f64 {
        non_negative(self.player_check_radius)
    }

    /// Sweep period in whole seconds (never below 1).
    pub fn sweep_period_secs(&self) -> u64 {
        self.check_period.max(1) as u64
    }

    /// Kinds the configuration asks to stack, before host capability filtering.
    pub fn requested_kinds(&self) -> &[EntityKind] {
        self.entity_types
            .as_deref()
            .unwrap_or(EntityKind::DEFAULT_STACKABLE)
    }
}

impl Default for StackingConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
