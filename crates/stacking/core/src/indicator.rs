//! Visual indicator synchronizer.
//!
//! Each stacked entity whose count reaches the display threshold gets one
//! marker entity floating above it. This module owns the entity → marker
//! mapping and is the only place that creates, updates or destroys markers.
//!
//! # Invariants
//!
//! - At most one marker per entity.
//! - The mapping never keeps a marker whose owner is gone; tracking passes and
//!   every removal path clean both sides.
//! - Removing twice is a no-op.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{trace, warn};

use crate::config::StackingConfig;
use crate::env::WorldOracle;
use crate::state::{EntityId, Location};

/// Prefix the configuration uses for color codes.
pub const MARKUP_COLOR_PREFIX: char = '&';
/// Prefix the host renders as a color code.
pub const NATIVE_COLOR_PREFIX: char = '§';

/// Outcome of one tracking pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackReport {
    /// Markers moved to follow their owner.
    pub repositioned: usize,
    /// Pairs dropped because the owner died or disappeared.
    pub orphaned: usize,
    /// Pairs dropped because the marker itself disappeared.
    pub stale: usize,
}

pub struct IndicatorSync {
    world: Arc<dyn WorldOracle>,
    template: String,
    min_stack_size: i32,
    markers: Mutex<HashMap<EntityId, EntityId>>,
}

impl IndicatorSync {
    pub fn new(world: Arc<dyn WorldOracle>, config: &StackingConfig) -> Self {
        Self {
            world,
            template: config.stack_display_format.clone(),
            min_stack_size: config.min_stack_size(),
            markers: Mutex::new(HashMap::new()),
        }
    }

    fn markers(&self) -> MutexGuard<'_, HashMap<EntityId, EntityId>> {
        self.markers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Where the marker of `owner` belongs right now.
    fn anchor(&self, owner: EntityId) -> Option<Location> {
        let location = self.world.location(owner)?;
        let height = self.world.height(owner).unwrap_or_default();
        Some(location.offset_y(height + StackingConfig::INDICATOR_MARGIN))
    }

    pub fn format(&self, count: i32) -> String {
        format_stack_display(&self.template, count)
    }

    /// Brings the marker of `owner` in line with `count`.
    ///
    /// Below the threshold, or for a dead or invalid owner, any marker is
    /// destroyed. Otherwise the marker is created if missing (or if the
    /// mapped one vanished), or retitled and moved if present.
    pub fn update(&self, owner: EntityId, count: i32) {
        if count < self.min_stack_size || !self.world.is_alive(owner) {
            self.remove(owner);
            return;
        }
        let Some(anchor) = self.anchor(owner) else {
            self.remove(owner);
            return;
        };
        let text = self.format(count);

        let mut markers = self.markers();
        if let Some(&marker) = markers.get(&owner) {
            if self.world.is_valid(marker) {
                self.world.set_marker_text(marker, &text);
                self.world.teleport(marker, &anchor);
                return;
            }
            markers.remove(&owner);
        }

        match self.world.spawn_marker(&anchor, &text) {
            Ok(marker) => {
                trace!(%owner, %marker, count, "indicator created");
                markers.insert(owner, marker);
            }
            Err(err) => warn!(%owner, error = %err, "failed to create stack indicator"),
        }
    }

    /// Drops the mapping for `owner` and destroys its marker if still present.
    ///
    /// Returns true if a mapping existed.
    pub fn remove(&self, owner: EntityId) -> bool {
        let Some(marker) = self.markers().remove(&owner) else {
            return false;
        };
        if self.world.is_valid(marker) {
            self.world.remove(marker);
        }
        true
    }

    /// Runs one tracking pass over every mapped pair.
    ///
    /// Pairs whose owner is gone are cleaned up regardless of `in_scope`;
    /// live pairs are only repositioned when `in_scope` accepts the owner's
    /// location, which lets regional lanes split the work.
    pub fn track<F>(&self, in_scope: F) -> TrackReport
    where
        F: Fn(&Location) -> bool,
    {
        let mut report = TrackReport::default();
        let mut markers = self.markers();
        markers.retain(|&owner, &mut marker| {
            if !self.world.is_alive(owner) {
                if self.world.is_valid(marker) {
                    self.world.remove(marker);
                }
                report.orphaned += 1;
                return false;
            }
            if !self.world.is_valid(marker) {
                report.stale += 1;
                return false;
            }
            let Some(location) = self.world.location(owner) else {
                report.orphaned += 1;
                return false;
            };
            if in_scope(&location) {
                if let Some(anchor) = self.anchor(owner) {
                    self.world.teleport(marker, &anchor);
                    report.repositioned += 1;
                }
            }
            true
        });
        report
    }

    pub fn indicator_for(&self, owner: EntityId) -> Option<EntityId> {
        self.markers().get(&owner).copied()
    }

    pub fn tracked_count(&self) -> usize {
        self.markers().len()
    }
}

/// Renders `count` through a display template.
///
/// `%stack-size%` is replaced by the count, and `&` followed by a color or
/// format code becomes the host's native prefix.
pub fn format_stack_display(template: &str, count: i32) -> String {
    let substituted = template.replace(StackingConfig::COUNT_PLACEHOLDER, &count.to_string());
    translate_color_codes(&substituted)
}

fn translate_color_codes(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 4);
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&code) if c == MARKUP_COLOR_PREFIX && is_color_code(code) => {
                out.push(NATIVE_COLOR_PREFIX);
                out.push(code.to_ascii_lowercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

fn is_color_code(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryWorld;
    use crate::state::{EntityKind, WorldId};

    fn setup() -> (Arc<MemoryWorld>, IndicatorSync) {
        let world = Arc::new(MemoryWorld::new());
        let sync = IndicatorSync::new(world.clone(), &StackingConfig::default());
        (world, sync)
    }

    #[test]
    fn formats_default_template() {
        assert_eq!(format_stack_display("&7x%stack-size%", 7), "§7x7");
    }

    #[test]
    fn only_valid_codes_are_translated() {
        assert_eq!(format_stack_display("&Lx%stack-size% & co", 3), "§lx3 & co");
        assert_eq!(format_stack_display("&zx%stack-size%", 3), "&zx3");
        assert_eq!(format_stack_display("%stack-size%&", 3), "3&");
    }

    #[test]
    fn marker_floats_above_owner() {
        let (world, sync) = setup();
        let owner = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 1.0, 64.0, 1.0));

        sync.update(owner, 3);

        let marker = sync.indicator_for(owner).expect("marker created");
        let placed = world.entity(marker).unwrap().location;
        let expected = 64.0 + MemoryWorld::DEFAULT_HEIGHT + StackingConfig::INDICATOR_MARGIN;
        assert_eq!(placed.position.y, expected);
        assert_eq!(world.marker_text(marker).as_deref(), Some("§7x3"));
    }

    #[test]
    fn threshold_crossings_create_and_destroy_once() {
        let (world, sync) = setup();
        let owner = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 0.0, 0.0, 0.0));

        sync.update(owner, 1);
        assert!(world.markers().is_empty());

        sync.update(owner, 2);
        sync.update(owner, 2);
        sync.update(owner, 5);
        assert_eq!(world.markers().len(), 1);
        let marker = sync.indicator_for(owner).unwrap();
        assert_eq!(world.marker_text(marker).as_deref(), Some("§7x5"));

        sync.update(owner, 1);
        assert!(world.markers().is_empty());
        assert_eq!(sync.tracked_count(), 0);
        assert!(!sync.remove(owner));
    }

    #[test]
    fn vanished_marker_is_recreated() {
        let (world, sync) = setup();
        let owner = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 0.0, 0.0, 0.0));
        sync.update(owner, 4);
        let first = sync.indicator_for(owner).unwrap();

        WorldOracle::remove(world.as_ref(), first);
        sync.update(owner, 4);

        let second = sync.indicator_for(owner).unwrap();
        assert_ne!(first, second);
        assert_eq!(world.markers(), vec![second]);
    }

    #[test]
    fn tracking_follows_owner_and_cleans_orphans() {
        let (world, sync) = setup();
        let walker = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 0.0, 0.0, 0.0));
        let doomed = world.add_mob(EntityKind::Husk, Location::at(WorldId(0), 9.0, 0.0, 0.0));
        sync.update(walker, 3);
        sync.update(doomed, 3);

        world.move_entity(walker, Location::at(WorldId(0), 5.0, 10.0, 5.0));
        world.kill(doomed);
        let report = sync.track(|_| true);

        assert_eq!(report.repositioned, 1);
        assert_eq!(report.orphaned, 1);
        assert_eq!(sync.tracked_count(), 1);
        let marker = sync.indicator_for(walker).unwrap();
        let position = world.entity(marker).unwrap().location.position;
        assert_eq!(position.x, 5.0);
        assert_eq!(world.markers(), vec![marker]);
    }

    #[test]
    fn out_of_scope_pairs_are_kept_but_not_moved() {
        let (world, sync) = setup();
        let owner = world.add_mob(EntityKind::Zombie, Location::at(WorldId(0), 0.0, 0.0, 0.0));
        sync.update(owner, 3);
        world.move_entity(owner, Location::at(WorldId(0), 50.0, 0.0, 0.0));

        let report = sync.track(|_| false);

        assert_eq!(report, TrackReport::default());
        let marker = sync.indicator_for(owner).unwrap();
        assert_eq!(world.entity(marker).unwrap().location.position.x, 0.0);
    }
}
