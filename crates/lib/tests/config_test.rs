//! # Configuration Loading Tests
//!
//! Layering of defaults, a YAML file and `PATSCOPE_` environment variables.
//! These tests mutate the process environment, so they run under `#[serial]`.

mod common;

use patscope::analytics::rolling::RollingStat;
use patscope::config::TemporalEligibility;
use patscope::constants::{DEFAULT_ROLLING_WINDOW, DEFAULT_SOURCE_PATH};
use patscope::{get_config, ConfigError, EngineConfig};
use patscope_test_utils::TestSetup;
use serial_test::serial;
use std::env;

const ENV_KEYS: [&str; 4] = [
    "PATSCOPE_SOURCE_PATH",
    "PATSCOPE_ROLLING__WINDOW",
    "PATSCOPE_ELIGIBILITY",
    "PATSCOPE_TEST_DATA_DIR",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

/// With no file and no variables, every field keeps its default.
#[test]
#[serial]
fn test_defaults_without_sources() {
    // Arrange
    common::setup_tracing();
    clear_env();

    // Act
    let config = get_config(None).unwrap();

    // Assert
    assert_eq!(config, EngineConfig::default());
    assert_eq!(config.source_path, DEFAULT_SOURCE_PATH);
    assert_eq!(config.rolling.window, DEFAULT_ROLLING_WINDOW);
    assert_eq!(config.eligibility, TemporalEligibility::ApplicationDateOnly);
    assert_eq!(config.lag.short_months, 18);
    assert_eq!(config.lag.long_months, 30);
}

/// Prefixed variables override defaults, with `__` reaching nested keys.
#[test]
#[serial]
fn test_environment_overrides() {
    // Arrange
    clear_env();
    env::set_var("PATSCOPE_SOURCE_PATH", "/data/export.csv");
    env::set_var("PATSCOPE_ROLLING__WINDOW", "6");
    env::set_var("PATSCOPE_ELIGIBILITY", "application_and_priority");

    // Act
    let config = get_config(None);
    clear_env();

    // Assert
    let config = config.unwrap();
    assert_eq!(config.source_path, "/data/export.csv");
    assert_eq!(config.rolling.window, 6);
    assert_eq!(config.rolling.stat, RollingStat::Sum);
    assert_eq!(
        config.eligibility,
        TemporalEligibility::ApplicationAndPriority
    );
}

/// A YAML file fills in nested sections and expands `${VAR}` references.
#[test]
#[serial]
fn test_yaml_file_with_substitution() {
    // Arrange
    clear_env();
    let setup = TestSetup::new().unwrap();
    env::set_var("PATSCOPE_TEST_DATA_DIR", "/srv/patents");
    let path = setup
        .write(
            "patscope.yml",
            r#"
source_path: "${PATSCOPE_TEST_DATA_DIR}/export.csv"
rolling:
  window: 3
  stat: mean
lag:
  short_types: ["4", "5", "7"]
extra_invalid_classifications: ["PENDING"]
"#,
        )
        .unwrap();

    // Act
    let config = get_config(path.to_str());
    clear_env();

    // Assert
    let config = config.unwrap();
    assert_eq!(config.source_path, "/srv/patents/export.csv");
    assert_eq!(config.rolling.window, 3);
    assert_eq!(config.rolling.stat, RollingStat::Mean);
    assert_eq!(config.lag.short_types, vec!["4", "5", "7"]);
    assert_eq!(config.lag.long_months, 30);
    assert!(config.invalid_classifications().contains("PENDING"));
    assert!(config.invalid_classifications().contains("NO CLASSIFICATION"));
}

/// Environment variables win over the file.
#[test]
#[serial]
fn test_environment_beats_file() {
    // Arrange
    clear_env();
    let setup = TestSetup::new().unwrap();
    let path = setup
        .write("patscope.yml", "rolling:\n  window: 3\n")
        .unwrap();
    env::set_var("PATSCOPE_ROLLING__WINDOW", "24");

    // Act
    let config = get_config(path.to_str());
    clear_env();

    // Assert
    assert_eq!(config.unwrap().rolling.window, 24);
}

/// An explicit path that does not exist is an error, not a silent default.
#[test]
#[serial]
fn test_missing_override_path_is_not_found() {
    // Arrange
    clear_env();
    let setup = TestSetup::new().unwrap();
    let path = setup.path("absent.yml");

    // Act
    let result = get_config(path.to_str());

    // Assert
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

/// Values of the wrong shape surface as a general configuration error.
#[test]
#[serial]
fn test_invalid_value_is_reported() {
    // Arrange
    clear_env();
    let setup = TestSetup::new().unwrap();
    let path = setup
        .write("patscope.yml", "eligibility: sometimes\n")
        .unwrap();

    // Act
    let result = get_config(path.to_str());

    // Assert
    assert!(matches!(result, Err(ConfigError::General(_))));
}
