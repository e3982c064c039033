//! Lane worker: a tokio task that drives one [`TickLane`].
//!
//! Receives registrations over an mpsc command channel and steps the lane on
//! a fixed interval until it is told to shut down or every sender is gone.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::api::{Result, RuntimeError};
use crate::scheduler::{LaneKind, RegionGrid, Registration, TickLane};

/// Commands that can be sent to a lane worker.
pub enum LaneCommand {
    /// Add a periodic task to the lane.
    Register(Registration),
    /// Stop ticking and exit the worker loop.
    Shutdown,
}

/// Background task that owns a [`TickLane`].
pub struct LaneWorker {
    lane: TickLane,
    tick_duration: Duration,
    command_rx: mpsc::Receiver<LaneCommand>,
}

impl LaneWorker {
    pub fn new(
        lane: TickLane,
        tick_duration: Duration,
        command_rx: mpsc::Receiver<LaneCommand>,
    ) -> Self {
        Self {
            lane,
            tick_duration,
            command_rx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        let mut interval = time::interval(self.tick_duration);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                cmd = self.command_rx.recv() => match cmd {
                    Some(LaneCommand::Register(registration)) => {
                        debug!(lane = %self.lane.kind(), task = registration.name, every_ticks = registration.every_ticks, "task registered");
                        self.lane.register(registration);
                    }
                    Some(LaneCommand::Shutdown) | None => break,
                },
                _ = interval.tick() => {
                    self.lane.run_tick();
                }
            }
        }
        debug!(lane = %self.lane.kind(), ticks = self.lane.current_tick(), "lane worker stopped");
    }
}

/// Owner side of a running lane worker.
pub struct LaneHandle {
    kind: LaneKind,
    command_tx: mpsc::Sender<LaneCommand>,
    join: Option<JoinHandle<()>>,
}

impl LaneHandle {
    /// Spawns a worker for a fresh lane on the current tokio runtime.
    pub fn spawn(
        kind: LaneKind,
        grid: Option<RegionGrid>,
        tick_duration: Duration,
        command_buffer_size: usize,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(command_buffer_size.max(1));
        let worker = LaneWorker::new(TickLane::new(kind, grid), tick_duration, command_rx);
        let join = tokio::spawn(async move {
            worker.run().await;
        });
        Self {
            kind,
            command_tx,
            join: Some(join),
        }
    }

    pub fn kind(&self) -> LaneKind {
        self.kind
    }

    pub async fn register(&self, registration: Registration) -> Result<()> {
        self.command_tx
            .send(LaneCommand::Register(registration))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Stops the worker and waits for it. Calling it twice is a no-op.
    pub async fn shutdown(&mut self) -> Result<()> {
        let Some(join) = self.join.take() else {
            return Ok(());
        };
        if self.command_tx.send(LaneCommand::Shutdown).await.is_err() {
            debug!(lane = %self.kind, "lane worker already gone");
        }
        join.await.map_err(RuntimeError::WorkerJoin)
    }
}
