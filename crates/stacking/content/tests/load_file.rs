use std::io::Write;

use stacking_content::ConfigLoader;
use stacking_core::StackingConfig;

#[test]
fn loads_settings_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[general]
debug = true

[mob-stacking]
enabled = true
stack-radius = 12.5
require-player-nearby = false
check-period = 10
"#
    )
    .unwrap();

    let config = ConfigLoader::load(file.path()).unwrap();

    assert_eq!(config.stack_radius(), 12.5);
    assert!(!config.require_player_nearby);
    assert_eq!(config.sweep_period_secs(), 10);
    assert_eq!(config.max_stack_size(), StackingConfig::DEFAULT_MAX_STACK_SIZE);
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = ConfigLoader::load(&path).unwrap_err();

    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn unknown_entity_kind_fails_to_load() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[mob-stacking]\nentity-types = [\"dragon_turtle\"]").unwrap();

    assert!(ConfigLoader::load(file.path()).is_err());
}
