//! Periodic clustering sweep.

use std::sync::Arc;
use std::time::Duration;

use stacking_core::StackingEngine;

use super::{Cadence, StackingActivity};
use crate::scheduler::{Affinity, TickContext};

/// Runs the world-wide sweep every `check-period` seconds on the global lane.
pub struct SweepActivity {
    engine: Arc<StackingEngine>,
    period: Duration,
}

impl SweepActivity {
    pub fn new(engine: Arc<StackingEngine>) -> Self {
        let period = Duration::from_secs(engine.config().sweep_period_secs());
        Self { engine, period }
    }
}

impl StackingActivity for SweepActivity {
    fn name(&self) -> &'static str {
        "stacking-sweep"
    }

    fn affinity(&self) -> Affinity {
        Affinity::Global
    }

    fn cadence(&self) -> Cadence {
        Cadence::FixedRate(self.period)
    }

    fn run(&self, _ctx: &TickContext) {
        self.engine.check_for_stacking_opportunities();
    }
}
