// Config loading and validation tests

use sysaudit::config::AppConfig;

const VALID_CONFIG: &str = r#"
[monitoring]
interval_seconds = 2
probe_timeout_secs = 4
history_len = 10

[publishing]
broadcast_capacity = 8
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.monitoring.interval_seconds, 2);
    assert_eq!(config.monitoring.probe_timeout_secs, 4);
    assert_eq!(config.monitoring.history_len, 10);
    assert_eq!(config.publishing.broadcast_capacity, 8);
}

#[test]
fn test_config_defaults_when_omitted() {
    let config = AppConfig::load_from_str("").expect("empty config is all defaults");
    assert_eq!(config.monitoring.interval_seconds, 5);
    assert_eq!(config.monitoring.probe_timeout_secs, 3);
    assert_eq!(config.monitoring.history_len, 20);
    assert_eq!(config.publishing.broadcast_capacity, 16);
}

#[test]
fn test_config_partial_section_keeps_other_defaults() {
    let config = AppConfig::load_from_str("[monitoring]\ninterval_seconds = 30\n").expect("valid");
    assert_eq!(config.monitoring.interval_seconds, 30);
    assert_eq!(config.monitoring.probe_timeout_secs, 3);
    assert_eq!(config.publishing.broadcast_capacity, 16);
}

#[test]
fn test_config_validation_rejects_interval_zero() {
    let bad = VALID_CONFIG.replace("interval_seconds = 2", "interval_seconds = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("interval_seconds"));
}

#[test]
fn test_config_validation_rejects_probe_timeout_zero() {
    let bad = VALID_CONFIG.replace("probe_timeout_secs = 4", "probe_timeout_secs = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("probe_timeout_secs"));
}

#[test]
fn test_config_validation_rejects_history_len_zero() {
    let bad = VALID_CONFIG.replace("history_len = 10", "history_len = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("history_len"));
}

#[test]
fn test_config_validation_rejects_broadcast_capacity_zero() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 8", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_invalid_toml() {
    let err = AppConfig::load_from_str("not valid toml [[[").unwrap_err();
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_config_load_from_file_via_env() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, VALID_CONFIG).unwrap();
    unsafe { std::env::set_var("CONFIG_FILE", path.to_str().unwrap()) };
    let result = AppConfig::load();
    // Missing file falls back to defaults rather than failing startup.
    unsafe { std::env::set_var("CONFIG_FILE", dir.path().join("absent.toml").to_str().unwrap()) };
    let missing = AppConfig::load();
    unsafe { std::env::remove_var("CONFIG_FILE") };

    let config = result.expect("load from CONFIG_FILE");
    assert_eq!(config.monitoring.interval_seconds, 2);
    let defaults = missing.expect("defaults for missing file");
    assert_eq!(defaults.monitoring.interval_seconds, 5);
}
