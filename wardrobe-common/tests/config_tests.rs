//! Config file location and loading tests
//!
//! Uses serial_test because WARDROBE_CONFIG is process-global state.

use serde::Deserialize;
use serial_test::serial;
use std::env;
use std::io::Write;
use wardrobe_common::config::{
    env_non_empty, load_toml_config, ConfigFileLocator, LoggingConfig, CONFIG_PATH_ENV,
};
use wardrobe_common::Error;

#[derive(Debug, Default, Deserialize, PartialEq)]
struct SampleConfig {
    #[serde(default)]
    bind_address: Option<String>,
    #[serde(default)]
    logging: LoggingConfig,
}

#[test]
#[serial]
fn test_candidates_without_override_use_module_file_name() {
    env::remove_var(CONFIG_PATH_ENV);

    let locator = ConfigFileLocator::new("wardrobe-tryon");
    let candidates = locator.candidates();

    assert!(!candidates.is_empty());
    for candidate in candidates {
        assert!(candidate.ends_with("wardrobe-tryon.toml"), "{:?}", candidate);
    }
}

#[test]
#[serial]
fn test_explicit_config_env_takes_priority() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    std::fs::write(&path, "bind_address = \"0.0.0.0:9000\"\n").unwrap();

    env::set_var(CONFIG_PATH_ENV, &path);
    let locator = ConfigFileLocator::new("wardrobe-tryon");
    let located = locator.locate();
    env::remove_var(CONFIG_PATH_ENV);

    assert_eq!(located, Some(path));
}

#[test]
#[serial]
fn test_blank_env_value_treated_as_unset() {
    env::set_var("WARDROBE_TEST_BLANK", "   ");
    assert_eq!(env_non_empty("WARDROBE_TEST_BLANK"), None);

    env::set_var("WARDROBE_TEST_BLANK", "value");
    assert_eq!(env_non_empty("WARDROBE_TEST_BLANK"), Some("value".to_string()));

    env::remove_var("WARDROBE_TEST_BLANK");
}

#[test]
fn test_missing_file_yields_defaults() {
    let config: SampleConfig = load_toml_config(None).unwrap();
    assert_eq!(config, SampleConfig::default());
}

#[test]
fn test_load_parses_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind_address = \"127.0.0.1:6000\"").unwrap();
    writeln!(file, "[logging]").unwrap();
    writeln!(file, "level = \"debug\"").unwrap();

    let config: SampleConfig = load_toml_config(Some(file.path())).unwrap();

    assert_eq!(config.bind_address.as_deref(), Some("127.0.0.1:6000"));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind_address = [unterminated").unwrap();

    let result: Result<SampleConfig, Error> = load_toml_config(Some(file.path()));

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_unreadable_path_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let result: Result<SampleConfig, Error> = load_toml_config(Some(&missing));

    assert!(matches!(result, Err(Error::Config(_))));
}
