//! Integration tests for configuration loading and graceful degradation
//!
//! Tests that manipulate ADDONKIT_CONFIG are marked with #[serial]
//! so they do not race on the process environment.

use addonkit_common::config::{
    load_config, load_or_default, ConfigOutcome, load_toml_config, resolve_config_path, write_toml_config, IngestConfig,
    LoggingConfig, CONFIG_ENV_VAR,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_write_then_load_preserves_every_field() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.toml");

    let config = IngestConfig {
        assets_dir: PathBuf::from("/srv/project/assets"),
        batch_size: 7,
        max_drawables_per_addon: 64,
        auto_delete_files: true,
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    };

    write_toml_config(&config, &path).unwrap();
    assert!(!path.with_extension("toml.tmp").exists(), "temp file must be renamed away");

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "batch_size = \"many\"").unwrap();

    let err = load_toml_config(&path).unwrap_err();
    assert!(err.to_string().contains("Parse TOML failed"));
}

#[test]
fn test_zero_batch_size_rejected_on_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "batch_size = 0").unwrap();

    assert!(load_toml_config(&path).is_err());
}

#[test]
#[serial]
fn test_env_var_names_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("from-env.toml");
    std::fs::write(&path, "max_drawables_per_addon = 3").unwrap();

    env::set_var(CONFIG_ENV_VAR, &path);
    let resolved = resolve_config_path(None);
    let config = load_or_default(None);
    env::remove_var(CONFIG_ENV_VAR);

    assert_eq!(resolved, Some(path));
    assert_eq!(config.max_drawables_per_addon, 3);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    env::remove_var(CONFIG_ENV_VAR);
    let config = load_or_default(Some(&missing));

    assert_eq!(config, IngestConfig::default());
}

#[test]
fn test_unreadable_file_outcome_is_kept_for_later_logging() {
    // Given: a config file that does not parse
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[logging\nlevel = debug").unwrap();

    // When: loaded before any subscriber exists
    let (config, outcome) = load_config(Some(&path));

    // Then: defaults are used and the failure is carried, not dropped
    assert_eq!(config, IngestConfig::default());
    match outcome {
        ConfigOutcome::Fallback(e) => assert!(e.to_string().contains("Parse TOML failed")),
        other => panic!("expected fallback, got {:?}", other),
    }
}

#[test]
fn test_loaded_outcome_names_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let (config, outcome) = load_config(Some(&path));

    assert_eq!(config.logging.level, "debug");
    assert!(matches!(outcome, ConfigOutcome::Loaded(p) if p == path));
}
