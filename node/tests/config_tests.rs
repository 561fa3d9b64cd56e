// Configuration file loading tests

use node::{ConfigOverrides, NodeConfig, NodeConfigError};
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_file_overrides_defaults() {
    let file = toml_file(
        r#"
run_for_secs = 5
log_level = "debug"

[feed]
seed = 7
"#,
    );

    let config = NodeConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.run_for_secs, 5);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.feed.seed, 7);
    // Untouched sections keep their defaults
    assert_eq!(config.feed.metrics, NodeConfig::default().feed.metrics);
    assert_eq!(config.budgets, NodeConfig::default().budgets);
}

#[test]
fn test_printed_default_config_loads_back() {
    let printed = toml::to_string_pretty(&NodeConfig::default()).unwrap();
    let file = toml_file(&printed);

    let config = NodeConfig::load(Some(file.path())).unwrap();
    assert_eq!(config, NodeConfig::default());
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = toml_file(
        r#"
[feed]
connectivity = [60.0, 5.0]
"#,
    );

    let err = NodeConfig::load(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("Configuration validation error"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.toml");
    assert!(NodeConfig::load(Some(&missing)).is_err());
}

#[test]
fn test_command_line_overrides_win_over_file() {
    let file = toml_file(
        r#"
run_for_secs = 5
log_level = "debug"

[feed]
seed = 7
"#,
    );

    let mut config = NodeConfig::load(Some(file.path())).unwrap();
    config.apply_overrides(ConfigOverrides {
        seed: Some(99),
        run_for_secs: Some(30),
        log_level: Some("warn".to_string()),
    });
    config.validate().unwrap();

    assert_eq!(config.feed.seed, 99);
    assert_eq!(config.run_for_secs, 30);
    assert_eq!(config.run_for(), Some(std::time::Duration::from_secs(30)));
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_absent_overrides_keep_loaded_values() {
    let file = toml_file("run_for_secs = 5\n");

    let mut config = NodeConfig::load(Some(file.path())).unwrap();
    config.apply_overrides(ConfigOverrides::default());

    assert_eq!(config.run_for_secs, 5);
    assert_eq!(config.feed.seed, NodeConfig::default().feed.seed);
    assert_eq!(config.log_level, "info");
}

#[test]
fn test_invalid_log_level_override_fails_validation() {
    let mut config = NodeConfig::default();
    config.apply_overrides(ConfigOverrides {
        log_level: Some("loud".to_string()),
        ..ConfigOverrides::default()
    });

    assert!(matches!(config.validate(), Err(NodeConfigError::InvalidValue(_))));
}
