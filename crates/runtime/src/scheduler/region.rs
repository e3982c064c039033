//! Region-parallel backend.

use std::time::Duration;

use async_trait::async_trait;

use super::{
    Affinity, LaneKind, RegionGrid, Registration, SchedulerConfig, TickScheduler, TickTask,
};
use crate::api::{Result, RuntimeError};
use crate::workers::LaneHandle;

/// One lane per region plus a global lane.
///
/// Region lanes receive a grid so their tasks can tell which locations they
/// own (see [`super::TickContext::owns`]).
pub struct RegionScheduler {
    tick_duration: Duration,
    grid: RegionGrid,
    global: LaneHandle,
    regions: Vec<LaneHandle>,
}

impl RegionScheduler {
    pub fn start(grid: RegionGrid, config: SchedulerConfig) -> Self {
        let tick_duration = config.tick();
        let spawn = |kind| {
            LaneHandle::spawn(kind, Some(grid), tick_duration, config.command_buffer_size)
        };
        Self {
            tick_duration,
            grid,
            global: spawn(LaneKind::Global),
            regions: grid.regions().map(|r| spawn(LaneKind::Region(r))).collect(),
        }
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    async fn register(&self, affinity: Affinity, registration: Registration) -> Result<()> {
        match affinity {
            Affinity::Global => self.global.register(registration).await,
            Affinity::Region(region) => {
                let lane = self
                    .regions
                    .get(region.0 as usize)
                    .ok_or(RuntimeError::UnknownRegion(region))?;
                lane.register(registration).await
            }
            Affinity::EachRegion => {
                for lane in &self.regions {
                    lane.register(registration.clone()).await?;
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl TickScheduler for RegionScheduler {
    fn tick_duration(&self) -> Duration {
        self.tick_duration
    }

    fn lanes(&self) -> Vec<LaneKind> {
        std::iter::once(&self.global)
            .chain(&self.regions)
            .map(LaneHandle::kind)
            .collect()
    }

    async fn run_every_tick(
        &self,
        name: &'static str,
        affinity: Affinity,
        task: TickTask,
    ) -> Result<()> {
        self.register(affinity, Registration::every_tick(name, task))
            .await
    }

    async fn run_at_fixed_rate(
        &self,
        name: &'static str,
        affinity: Affinity,
        period: Duration,
        task: TickTask,
    ) -> Result<()> {
        let registration = Registration::fixed_rate(name, period, self.tick_duration, task);
        self.register(affinity, registration).await
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.global.shutdown().await?;
        for lane in &mut self.regions {
            lane.shutdown().await?;
        }
        Ok(())
    }
}
