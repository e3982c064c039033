//! Simulation configuration loaded from the environment.
use std::env;
use std::path::PathBuf;

use anyhow::Result;
use stacking_content::ConfigLoader;
use stacking_core::StackingConfig;
use stacking_runtime::HostCapabilities;

/// Parameters of one simulation run.
#[derive(Clone, Debug)]
pub struct SimConfig {
    /// TOML file holding a `[mob-stacking]` table.
    pub stacking_config: Option<PathBuf>,
    /// Creatures spawned before the runtime starts.
    pub entities: usize,
    pub observers: usize,
    pub seconds: u64,
    /// Region lanes to run; 0 selects the single global lane.
    pub regions: u32,
    pub seed: u64,
    pub session_id: Option<String>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            stacking_config: None,
            entities: 200,
            observers: 2,
            seconds: 10,
            regions: 0,
            seed: 42,
            session_id: None,
        }
    }
}

impl SimConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `STACKING_CONFIG` - Path to the stacking TOML file (default: built-in defaults)
    /// - `SIM_ENTITIES` - Initial creature count (default: 200)
    /// - `SIM_OBSERVERS` - Observer count (default: 2)
    /// - `SIM_SECONDS` - Simulated run time (default: 10)
    /// - `SIM_REGIONS` - Region lanes, 0 for a single lane (default: 0)
    /// - `SIM_SEED` - RNG seed (default: 42)
    /// - `SIM_SESSION_ID` - Session identifier for the log directory (default: auto-generated)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.stacking_config = env::var("STACKING_CONFIG").ok().map(PathBuf::from);

        if let Some(entities) = read_env::<usize>("SIM_ENTITIES") {
            config.entities = entities;
        }
        if let Some(observers) = read_env::<usize>("SIM_OBSERVERS") {
            config.observers = observers;
        }
        if let Some(seconds) = read_env::<u64>("SIM_SECONDS") {
            config.seconds = seconds.max(1);
        }
        if let Some(regions) = read_env::<u32>("SIM_REGIONS") {
            config.regions = regions;
        }
        if let Some(seed) = read_env::<u64>("SIM_SEED") {
            config.seed = seed;
        }

        config.session_id = env::var("SIM_SESSION_ID").ok();

        config
    }

    pub fn capabilities(&self) -> HostCapabilities {
        if self.regions == 0 {
            HostCapabilities::single_lane()
        } else {
            HostCapabilities::regionized(self.regions)
        }
    }

    /// Loads the stacking configuration, or the defaults without a file.
    pub fn load_stacking_config(&self) -> Result<StackingConfig> {
        match &self.stacking_config {
            Some(path) => ConfigLoader::load(path),
            None => Ok(StackingConfig::default()),
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_regions_selects_single_lane() {
        let config = SimConfig::default();
        assert!(!config.capabilities().regionized);

        let config = SimConfig {
            regions: 6,
            ..SimConfig::default()
        };
        assert_eq!(config.capabilities(), HostCapabilities::regionized(6));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.load_stacking_config().unwrap(), StackingConfig::default());
    }
}
