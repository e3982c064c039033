//! Tick lanes: ordered lists of periodic tasks stepped one tick at a time.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use stacking_core::{Location, RegionId};
use tracing::trace;

use super::RegionGrid;

/// Work run by a lane. Receives the context of the tick it runs in.
pub type TickTask = Arc<dyn Fn(&TickContext) + Send + Sync>;

/// Which lane a task executes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaneKind {
    Global,
    Region(RegionId),
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Global => f.write_str("global"),
            LaneKind::Region(region) => write!(f, "{region}"),
        }
    }
}

/// What a task knows about the tick it runs in.
#[derive(Clone, Debug)]
pub struct TickContext {
    pub lane: LaneKind,
    /// Ticks elapsed on this lane, starting at 1.
    pub tick: u64,
    grid: Option<RegionGrid>,
}

impl TickContext {
    /// True if `location` belongs to this lane.
    ///
    /// The global lane owns everything; a region lane owns the locations the
    /// grid assigns to its region.
    pub fn owns(&self, location: &Location) -> bool {
        match (self.lane, &self.grid) {
            (LaneKind::Region(region), Some(grid)) => grid.region_of(location) == region,
            _ => true,
        }
    }
}

/// A task together with its cadence.
#[derive(Clone)]
pub struct Registration {
    pub name: &'static str,
    /// Run every this many ticks (at least 1).
    pub every_ticks: u64,
    pub task: TickTask,
}

impl Registration {
    pub fn every_tick(name: &'static str, task: TickTask) -> Self {
        Self {
            name,
            every_ticks: 1,
            task,
        }
    }

    /// The first run happens one full period after registration.
    pub fn fixed_rate(
        name: &'static str,
        period: Duration,
        tick_duration: Duration,
        task: TickTask,
    ) -> Self {
        Self {
            name,
            every_ticks: ticks_in(period, tick_duration),
            task,
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("every_ticks", &self.every_ticks)
            .finish_non_exhaustive()
    }
}

/// Whole ticks in `period`, rounded down, never below 1.
pub fn ticks_in(period: Duration, tick_duration: Duration) -> u64 {
    let tick = tick_duration.as_nanos().max(1);
    u64::try_from(period.as_nanos() / tick)
        .unwrap_or(u64::MAX)
        .max(1)
}

struct Entry {
    registration: Registration,
    next_due: u64,
}

/// Synchronous core of a lane worker.
///
/// The worker loop calls [`TickLane::run_tick`] on every interval tick; tests
/// can call it directly to step time deterministically.
pub struct TickLane {
    kind: LaneKind,
    grid: Option<RegionGrid>,
    tick: u64,
    entries: Vec<Entry>,
}

impl TickLane {
    pub fn new(kind: LaneKind, grid: Option<RegionGrid>) -> Self {
        Self {
            kind,
            grid,
            tick: 0,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> LaneKind {
        self.kind
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn task_names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|e| e.registration.name).collect()
    }

    pub fn register(&mut self, mut registration: Registration) {
        registration.every_ticks = registration.every_ticks.max(1);
        let next_due = self.tick + registration.every_ticks;
        self.entries.push(Entry {
            registration,
            next_due,
        });
    }

    /// Advances one tick and runs every task that is due, in registration
    /// order. Returns how many tasks ran.
    pub fn run_tick(&mut self) -> usize {
        self.tick += 1;
        let ctx = TickContext {
            lane: self.kind,
            tick: self.tick,
            grid: self.grid,
        };

        let mut ran = 0;
        for entry in &mut self.entries {
            if entry.next_due > self.tick {
                continue;
            }
            (entry.registration.task)(&ctx);
            entry.next_due = self.tick + entry.registration.every_ticks;
            ran += 1;
        }
        if ran > 0 {
            trace!(lane = %self.kind, tick = self.tick, ran, "lane tick");
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn counter() -> (Arc<AtomicU64>, TickTask) {
        let count = Arc::new(AtomicU64::new(0));
        let task_count = count.clone();
        let task: TickTask = Arc::new(move |_ctx: &TickContext| {
            task_count.fetch_add(1, Ordering::SeqCst);
        });
        (count, task)
    }

    #[test]
    fn period_converts_to_whole_ticks() {
        let tick = Duration::from_millis(50);
        assert_eq!(ticks_in(Duration::from_secs(3), tick), 60);
        assert_eq!(ticks_in(Duration::from_millis(10), tick), 1);
        assert_eq!(ticks_in(Duration::from_millis(120), tick), 2);
        assert_eq!(ticks_in(Duration::from_secs(1), Duration::ZERO), 1_000_000_000);
    }

    #[test]
    fn tasks_run_at_their_cadence() {
        let mut lane = TickLane::new(LaneKind::Global, None);
        let (every, every_task) = counter();
        let (third, third_task) = counter();
        lane.register(Registration::every_tick("every", every_task));
        lane.register(Registration {
            name: "third",
            every_ticks: 3,
            task: third_task,
        });

        let ran: usize = (0..7).map(|_| lane.run_tick()).sum();

        assert_eq!(every.load(Ordering::SeqCst), 7);
        assert_eq!(third.load(Ordering::SeqCst), 2);
        assert_eq!(ran, 9);
        assert_eq!(lane.task_names(), vec!["every", "third"]);
    }

    #[test]
    fn late_registration_waits_a_full_period() {
        let mut lane = TickLane::new(LaneKind::Global, None);
        lane.run_tick();
        lane.run_tick();
        let (count, task) = counter();
        lane.register(Registration {
            name: "late",
            every_ticks: 2,
            task,
        });

        lane.run_tick();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        lane.run_tick();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn region_context_owns_only_its_cells() {
        let grid = RegionGrid::new(4, 16.0);
        let here = Location::at(stacking_core::WorldId(0), 3.0, 0.0, 3.0);
        let owner = grid.region_of(&here);

        let own = TickContext {
            lane: LaneKind::Region(owner),
            tick: 1,
            grid: Some(grid),
        };
        let other = TickContext {
            lane: LaneKind::Region(RegionId((owner.0 + 1) % 4)),
            tick: 1,
            grid: Some(grid),
        };
        let global = TickContext {
            lane: LaneKind::Global,
            tick: 1,
            grid: Some(grid),
        };

        assert!(own.owns(&here));
        assert!(!other.owns(&here));
        assert!(global.owns(&here));
    }
}
