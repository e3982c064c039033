//! Tick scheduling backends.
//!
//! The engine needs two capabilities from its host: "run this every tick" and
//! "run this every N seconds". [`TickScheduler`] expresses both. Two backends
//! implement it:
//! - [`GlobalScheduler`] runs everything on one lane, like a single main
//!   thread;
//! - [`RegionScheduler`] runs one lane per region plus a global lane, like a
//!   host that ticks regions in parallel.
//!
//! [`select_scheduler`] picks one from the host's [`HostCapabilities`].

mod global;
mod grid;
mod lane;
mod region;

use std::time::Duration;

use async_trait::async_trait;
use stacking_core::RegionId;
use tracing::info;

pub use global::GlobalScheduler;
pub use grid::RegionGrid;
pub use lane::{LaneKind, Registration, TickContext, TickLane, TickTask, ticks_in};
pub use region::RegionScheduler;

use crate::api::{Result, RuntimeError};

/// Where a task should run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Affinity {
    /// The global lane.
    Global,
    /// The lane of one region.
    Region(RegionId),
    /// Once on every region lane; on a single-lane host, once on that lane.
    EachRegion,
}

/// Host scheduling capabilities.
#[async_trait]
pub trait TickScheduler: Send + Sync {
    fn tick_duration(&self) -> Duration;

    /// Lanes this backend drives.
    fn lanes(&self) -> Vec<LaneKind>;

    async fn run_every_tick(
        &self,
        name: &'static str,
        affinity: Affinity,
        task: TickTask,
    ) -> Result<()>;

    /// Runs `task` every `period`, rounded down to whole ticks. The first run
    /// happens one period after registration.
    async fn run_at_fixed_rate(
        &self,
        name: &'static str,
        affinity: Affinity,
        period: Duration,
        task: TickTask,
    ) -> Result<()>;

    /// Stops every lane and waits for its worker.
    async fn shutdown(&mut self) -> Result<()>;
}

/// What the host can do, as detected at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostCapabilities {
    /// The host ticks regions in parallel.
    pub regionized: bool,
    pub region_count: u32,
}

impl HostCapabilities {
    pub const fn single_lane() -> Self {
        Self {
            regionized: false,
            region_count: 0,
        }
    }

    pub const fn regionized(region_count: u32) -> Self {
        Self {
            regionized: true,
            region_count,
        }
    }
}

impl Default for HostCapabilities {
    fn default() -> Self {
        Self::single_lane()
    }
}

/// Scheduler construction parameters shared by both backends.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SchedulerConfig {
    pub tick_duration: Duration,
    pub command_buffer_size: usize,
    /// Cell side length of the [`RegionGrid`], in blocks.
    pub cell_size: f64,
}

impl SchedulerConfig {
    /// 20 ticks per second.
    pub const DEFAULT_TICK: Duration = Duration::from_millis(50);
    /// Shortest tick a lane will run.
    pub const MIN_TICK: Duration = Duration::from_millis(1);

    /// The tick length lanes actually run at.
    ///
    /// Lane intervals and fixed-rate tick counts both derive from this value.
    pub fn tick(&self) -> Duration {
        self.tick_duration.max(Self::MIN_TICK)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_duration: Self::DEFAULT_TICK,
            command_buffer_size: 32,
            cell_size: RegionGrid::DEFAULT_CELL_SIZE,
        }
    }
}

/// Starts the backend matching `capabilities`.
///
/// Must be called from within a tokio runtime: lane workers are spawned
/// immediately.
pub fn select_scheduler(
    capabilities: HostCapabilities,
    config: SchedulerConfig,
) -> Result<Box<dyn TickScheduler>> {
    if !capabilities.regionized {
        info!(tick_ms = config.tick().as_millis() as u64, "starting global scheduler");
        return Ok(Box::new(GlobalScheduler::start(config)));
    }
    if capabilities.region_count == 0 {
        return Err(RuntimeError::NoRegions);
    }
    info!(
        regions = capabilities.region_count,
        tick_ms = config.tick().as_millis() as u64,
        "starting region scheduler"
    );
    let grid = RegionGrid::new(capabilities.region_count, config.cell_size);
    Ok(Box::new(RegionScheduler::start(grid, config)))
}
