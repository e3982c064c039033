//! Single-lane backend.

use std::time::Duration;

use async_trait::async_trait;

use super::{
    Affinity, LaneKind, Registration, SchedulerConfig, TickScheduler, TickTask,
};
use crate::api::Result;
use crate::workers::LaneHandle;

/// Runs every task on one global lane, whatever its affinity.
pub struct GlobalScheduler {
    tick_duration: Duration,
    lane: LaneHandle,
}

impl GlobalScheduler {
    pub fn start(config: SchedulerConfig) -> Self {
        let tick_duration = config.tick();
        Self {
            tick_duration,
            lane: LaneHandle::spawn(
                LaneKind::Global,
                None,
                tick_duration,
                config.command_buffer_size,
            ),
        }
    }
}

#[async_trait]
impl TickScheduler for GlobalScheduler {
    fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    fn lanes(&self) -> Vec<LaneKind> {
        vec![self.lane.kind()]
    }

    async fn run_every_tick(
        &self,
        name: &'static str,
        _affinity: Affinity,
        task: TickTask,
    ) -> Result<()> {
        self.lane.register(Registration::every_tick(name, task)).await
    }

    async fn run_at_fixed_rate(
        &self,
        name: &'static str,
        _affinity: Affinity,
        period: Duration,
        task: TickTask,
    ) -> Result<()> {
        self.lane
            .register(Registration::fixed_rate(
                name,
                period,
                self.tick_duration,
                task,
            ))
            .await
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.lane.shutdown().await
    }
}
