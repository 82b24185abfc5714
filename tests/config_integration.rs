//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use redtri::config::{AppConfig, PowerPreference};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;

/// Fresh config directory under the target tmp dir
fn config_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("REDTRI_DISPLAY__VSYNC", "false");
    let config = AppConfig::load().unwrap();
    std::env::remove_var("REDTRI_DISPLAY__VSYNC");
    assert!(!config.display.vsync);
}

#[test]
#[serial]
fn test_repository_defaults_load() {
    let config = AppConfig::load_from(concat!(env!("CARGO_MANIFEST_DIR"), "/config")).unwrap();
    assert!(config.display.vsync);
    assert_eq!(config.gpu.power_preference, PowerPreference::Low);
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = config_dir("user_override");
    fs::write(dir.join("default.toml"), "[debug]\nlog_level = \"warn\"\n").unwrap();
    fs::write(
        dir.join("user.toml"),
        "[gpu]\npower_preference = \"high\"\nvalidation = true\n",
    )
    .unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.debug.log_level, "warn");
    assert_eq!(config.gpu.power_preference, PowerPreference::High);
    assert!(config.gpu.validation);
    assert!(config.display.vsync);
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = AppConfig::load_from("/nonexistent/redtri/config").unwrap();
    assert_eq!(config.debug.log_level, "info");
}

#[test]
#[serial]
fn test_invalid_value_is_an_error() {
    let dir = config_dir("invalid_value");
    fs::write(
        dir.join("default.toml"),
        "[gpu]\npower_preference = \"turbo\"\nvalidation = false\n",
    )
    .unwrap();
    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));
}
