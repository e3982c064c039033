//! Periodic stacking activities registered with the scheduler.
//!
//! Each activity names itself, declares its cadence and affinity, and runs
//! one step against the shared engine when its lane calls it.

mod sweep;
mod tracking;

use std::sync::Arc;
use std::time::Duration;

pub use sweep::SweepActivity;
pub use tracking::TrackingActivity;

use crate::api::Result;
use crate::scheduler::{Affinity, TickContext, TickScheduler, TickTask};

/// How often an activity runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    EveryTick,
    FixedRate(Duration),
}

/// A unit of periodic engine work.
pub trait StackingActivity: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn affinity(&self) -> Affinity;

    fn cadence(&self) -> Cadence;

    fn run(&self, ctx: &TickContext);
}

/// Registers `activity` with `scheduler` according to its cadence.
pub async fn schedule(
    scheduler: &dyn TickScheduler,
    activity: Arc<dyn StackingActivity>,
) -> Result<()> {
    let name = activity.name();
    let affinity = activity.affinity();
    let cadence = activity.cadence();
    let task: TickTask = Arc::new(move |ctx: &TickContext| activity.run(ctx));

    match cadence {
        Cadence::EveryTick => scheduler.run_every_tick(name, affinity, task).await,
        Cadence::FixedRate(period) => {
            scheduler
                .run_at_fixed_rate(name, affinity, period, task)
                .await
        }
    }
}
