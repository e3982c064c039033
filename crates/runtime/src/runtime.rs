//! High-level runtime orchestrator.
//!
//! The runtime starts the scheduler backend that matches the host, registers
//! the stacking activities with it, and stops everything on shutdown.

use std::sync::Arc;
use std::time::Duration;

use stacking_core::StackingEngine;
use tracing::info;

use crate::activities::{self, StackingActivity, SweepActivity, TrackingActivity};
use crate::api::{Result, RuntimeError};
use crate::scheduler::{HostCapabilities, SchedulerConfig, TickScheduler, select_scheduler};

/// Runtime configuration shared across the orchestrator and lanes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeConfig {
    pub capabilities: HostCapabilities,
    pub scheduler: SchedulerConfig,
}

/// Owns the scheduler and the activities registered on it.
pub struct StackingRuntime {
    engine: Arc<StackingEngine>,
    scheduler: Box<dyn TickScheduler>,
    activities: Vec<&'static str>,
}

impl StackingRuntime {
    pub fn builder() -> StackingRuntimeBuilder {
        StackingRuntimeBuilder::new()
    }

    pub fn engine(&self) -> &Arc<StackingEngine> {
        &self.engine
    }

    /// The running backend, for hosts that schedule work of their own.
    pub fn scheduler(&self) -> &dyn TickScheduler {
        self.scheduler.as_ref()
    }

    /// Names of the registered activities, in registration order.
    pub fn activities(&self) -> &[&'static str] {
        &self.activities
    }

    /// Registers one more activity.
    pub async fn schedule(&mut self, activity: Arc<dyn StackingActivity>) -> Result<()> {
        let name = activity.name();
        activities::schedule(self.scheduler.as_ref(), activity).await?;
        self.activities.push(name);
        Ok(())
    }

    /// Stops every lane and waits for the workers.
    pub async fn shutdown(mut self) -> Result<()> {
        self.scheduler.shutdown().await?;
        info!("stacking runtime stopped");
        Ok(())
    }
}

/// Builder for [`StackingRuntime`].
pub struct StackingRuntimeBuilder {
    config: RuntimeConfig,
    engine: Option<Arc<StackingEngine>>,
}

impl StackingRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            engine: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required engine
    pub fn engine(mut self, engine: Arc<StackingEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn capabilities(mut self, capabilities: HostCapabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    pub fn tick_duration(mut self, tick_duration: Duration) -> Self {
        self.config.scheduler.tick_duration = tick_duration;
        self
    }

    /// Start the scheduler and register the stacking activities.
    ///
    /// A disabled engine gets a running scheduler with nothing on it.
    pub async fn build(self) -> Result<StackingRuntime> {
        let engine = self.engine.ok_or(RuntimeError::MissingEngine)?;
        let scheduler = select_scheduler(self.config.capabilities, self.config.scheduler)?;

        let mut runtime = StackingRuntime {
            engine: engine.clone(),
            scheduler,
            activities: Vec::new(),
        };

        if !engine.is_enabled() {
            info!("mob stacking disabled, no activities registered");
            return Ok(runtime);
        }

        runtime
            .schedule(Arc::new(TrackingActivity::new(engine.clone())))
            .await?;
        runtime
            .schedule(Arc::new(SweepActivity::new(engine)))
            .await?;

        info!(
            lanes = runtime.scheduler.lanes().len(),
            activities = ?runtime.activities,
            "stacking runtime started"
        );
        Ok(runtime)
    }
}
