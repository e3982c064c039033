//! Periodic world-wide clustering pass.
//!
//! The sweep works in three phases: snapshot observers, collect candidates
//! around them, then greedily fold each candidate's neighbors into it. A
//! candidate absorbs its direct neighbors only; chains longer than one hop
//! converge over successive sweeps.

use std::collections::HashSet;

use tracing::debug;

use super::StackingEngine;
use crate::state::{EntityId, Observer, WorldId};

/// Summary of one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Stacking disabled, or no observer while observers are required.
    pub skipped: bool,
    pub worlds_scanned: usize,
    pub candidates: usize,
    /// Candidates that absorbed at least one neighbor.
    pub clusters: usize,
    pub entities_removed: usize,
    pub spatial_queries: usize,
}

impl SweepReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

impl StackingEngine {
    /// Runs one sweep over every world that holds an active observer.
    pub fn check_for_stacking_opportunities(&self) -> SweepReport {
        if !self.config.enabled {
            return SweepReport::skipped();
        }

        let observers: Vec<Observer> = self
            .env
            .world
            .observers()
            .into_iter()
            .filter(Observer::is_active)
            .collect();
        if self.config.require_player_nearby && observers.is_empty() {
            debug!("sweep skipped: no observers online");
            return SweepReport::skipped();
        }

        let mut worlds: Vec<WorldId> = Vec::new();
        for observer in &observers {
            if !worlds.contains(&observer.location.world) {
                worlds.push(observer.location.world);
            }
        }

        let mut report = SweepReport {
            worlds_scanned: worlds.len(),
            ..SweepReport::default()
        };
        let mut settled: HashSet<EntityId> = HashSet::new();

        for world in worlds {
            let candidates = self.collect_candidates(world, &observers, &mut report);
            report.candidates += candidates.len();
            for candidate in candidates {
                if settled.contains(&candidate) || !self.is_candidate(candidate) {
                    continue;
                }
                self.cluster_around(candidate, &mut settled, &mut report);
            }
        }

        debug!(?report, "stacking sweep finished");
        report
    }

    /// Eligible, live entities near any observer of `world`, first-seen order.
    fn collect_candidates(
        &self,
        world: WorldId,
        observers: &[Observer],
        report: &mut SweepReport,
    ) -> Vec<EntityId> {
        // Whole blocks, matching the host's integer search box.
        let reach = (self.config.player_check_radius() + self.config.stack_radius()).trunc();

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for observer in observers.iter().filter(|o| o.location.world == world) {
            report.spatial_queries += 1;
            for id in self.env.world.nearby_entities(&observer.location, reach) {
                if seen.contains(&id) || !self.is_candidate(id) {
                    continue;
                }
                if self.config.require_player_nearby && !self.has_player_nearby(id) {
                    continue;
                }
                seen.insert(id);
                candidates.push(id);
            }
        }
        candidates
    }

    /// Folds every compatible, unsettled neighbor of `center` into it.
    fn cluster_around(
        &self,
        center: EntityId,
        settled: &mut HashSet<EntityId>,
        report: &mut SweepReport,
    ) {
        let Some(location) = self.env.world.location(center) else {
            settled.insert(center);
            return;
        };

        report.spatial_queries += 1;
        let mut partners: Vec<EntityId> = Vec::new();
        for neighbor in self
            .env
            .world
            .nearby_entities(&location, self.config.stack_radius())
        {
            if neighbor == center || settled.contains(&neighbor) || partners.contains(&neighbor) {
                continue;
            }
            if self.is_candidate(neighbor) && self.can_stack(center, neighbor) {
                partners.push(neighbor);
            }
        }

        if partners.is_empty() {
            settled.insert(center);
            return;
        }

        let world = self.env.world.as_ref();
        let max = self.config.max_stack_size();
        let mut ids = partners.clone();
        ids.push(center);

        let absorbed = self.store.transaction(&ids, |txn| {
            if !world.is_alive(center) {
                return Vec::new();
            }
            let absorbed: Vec<EntityId> = partners
                .iter()
                .copied()
                .filter(|&partner| world.is_alive(partner))
                .collect();
            if absorbed.is_empty() {
                return absorbed;
            }

            let total = absorbed
                .iter()
                .fold(txn.get(center), |sum, &partner| sum.saturating_add(txn.get(partner)));
            txn.set(center, total.min(max));
            for &partner in &absorbed {
                txn.remove(partner);
                world.remove(partner);
            }
            absorbed
        });

        settled.insert(center);
        if absorbed.is_empty() {
            return;
        }
        report.clusters += 1;
        report.entities_removed += absorbed.len();
        settled.extend(absorbed.iter().copied());
        debug!(%center, absorbed = absorbed.len(), "clustered stack");
    }
}
