//! Stacking configuration loader.

use std::path::Path;

use serde::Deserialize;
use stacking_core::StackingConfig;

use crate::loaders::{LoadResult, read_file};

/// Name of the table holding the stacking settings.
pub const SECTION: &str = "mob-stacking";

/// Top-level layout of a settings file. Other tables are ignored.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    #[serde(rename = "mob-stacking", default)]
    mob_stacking: StackingConfig,
}

/// Loader for stacking configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the `[mob-stacking]` table of a TOML file.
    ///
    /// A file without the table yields [`StackingConfig::default`].
    pub fn load(path: &Path) -> LoadResult<StackingConfig> {
        let content = read_file(path)?;
        Self::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load {}: {}", path.display(), e))
    }

    /// Parse TOML text holding a `[mob-stacking]` table.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> LoadResult<StackingConfig> {
        let file: SettingsFile = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {} TOML: {}", SECTION, e))?;
        Ok(file.mob_stacking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacking_core::EntityKind;

    #[test]
    fn missing_table_uses_defaults() {
        let config = ConfigLoader::from_str("[other]\nvalue = 1\n").unwrap();
        assert_eq!(config, StackingConfig::default());
    }

    #[test]
    fn partial_table_overrides_only_given_keys() {
        let config = ConfigLoader::from_str(
            r#"
            [mob-stacking]
            max-stack-size = 16
            skip-death-animation = true
            stack-display-format = "&ax%stack-size%"
            entity-types = ["zombie", "wither_skeleton"]
            "#,
        )
        .unwrap();

        assert_eq!(config.max_stack_size, 16);
        assert!(config.skip_death_animation);
        assert_eq!(config.stack_display_format, "&ax%stack-size%");
        assert_eq!(
            config.requested_kinds(),
            &[EntityKind::Zombie, EntityKind::WitherSkeleton]
        );
        assert_eq!(config.stack_radius, StackingConfig::DEFAULT_STACK_RADIUS);
        assert!(config.require_player_nearby);
    }

    #[test]
    fn wrong_types_are_rejected() {
        let err = ConfigLoader::from_str("[mob-stacking]\nmax-stack-size = \"lots\"\n").unwrap_err();
        assert!(err.to_string().contains("mob-stacking"));
    }
}
