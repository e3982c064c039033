//! Per-tick indicator tracking.

use std::sync::Arc;

use stacking_core::StackingEngine;
use tracing::trace;

use super::{Cadence, StackingActivity};
use crate::scheduler::{Affinity, TickContext};

/// Keeps every indicator above its owner.
///
/// Runs on each region lane and repositions only the indicators whose owner
/// that lane owns. Orphaned pairs are cleaned by whichever lane sees them
/// first.
pub struct TrackingActivity {
    engine: Arc<StackingEngine>,
}

impl TrackingActivity {
    pub fn new(engine: Arc<StackingEngine>) -> Self {
        Self { engine }
    }
}

impl StackingActivity for TrackingActivity {
    fn name(&self) -> &'static str {
        "indicator-tracking"
    }

    fn affinity(&self) -> Affinity {
        Affinity::EachRegion
    }

    fn cadence(&self) -> Cadence {
        Cadence::EveryTick
    }

    fn run(&self, ctx: &TickContext) {
        let report = self.engine.track_indicators(|location| ctx.owns(location));
        if report.orphaned + report.stale > 0 {
            trace!(
                lane = %ctx.lane,
                orphaned = report.orphaned,
                stale = report.stale,
                "dropped indicator pairs"
            );
        }
    }
}
