use tasksync::config::Config;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.sync.batch_size, 50);
    assert_eq!(config.sync.max_retries, 3);
    assert_eq!(config.sync.remote_timeout_seconds, 5);
    assert_eq!(config.sync.auto_sync_interval_seconds, 300);
    assert!(config.storage.path.is_none());
    assert!(config.logging.enabled);
}

#[test]
fn test_config_validation() {
    let mut config = Config::default();

    // Valid config should pass
    assert!(config.validate().is_ok());

    // Zero batch size should fail
    config.sync.batch_size = 0;
    assert!(config.validate().is_err());

    // Reset and test zero retry ceiling
    config.sync.batch_size = 50;
    config.sync.max_retries = 0;
    assert!(config.validate().is_err());

    config.sync.max_retries = 3;
    config.sync.remote_timeout_seconds = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_config_serialization() {
    let config = Config::default();
    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("batch_size = 50"));
    assert!(toml_str.contains("max_retries = 3"));
}

#[test]
fn test_partial_config_deserialization() {
    // Partial TOML configs merge with defaults
    let partial_toml = r#"
[sync]
batch_size = 10

[logging]
enabled = false
"#;

    let config: Config = toml::from_str(partial_toml).unwrap();

    assert_eq!(config.sync.batch_size, 10);
    assert!(!config.logging.enabled);

    // Unspecified values keep their defaults
    assert_eq!(config.sync.max_retries, 3);
    assert_eq!(config.sync.auto_sync_interval_seconds, 300);
    assert!(config.storage.path.is_none());
}

#[test]
fn test_empty_config_deserialization() {
    let config: Config = toml::from_str("").unwrap();
    let default_config = Config::default();

    assert_eq!(config.sync.batch_size, default_config.sync.batch_size);
    assert_eq!(config.sync.max_retries, default_config.sync.max_retries);
    assert_eq!(config.logging.enabled, default_config.logging.enabled);
}

#[test]
fn test_generate_config_creates_directory() {
    use std::fs;

    let temp_dir = std::env::temp_dir().join("tasksync_test_config");
    let config_path = temp_dir.join("nested").join("config.toml");

    if temp_dir.exists() {
        let _ = fs::remove_dir_all(&temp_dir);
    }
    assert!(!temp_dir.exists());

    let result = Config::generate_default_config(&config_path);
    assert!(result.is_ok());

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("# tasksync Configuration File"));
    assert!(content.contains("batch_size = 50"));

    // Round-trips through the loader
    let loaded = Config::load_from_path(&config_path).unwrap();
    assert_eq!(loaded.sync.batch_size, 50);

    let _ = fs::remove_dir_all(&temp_dir);
}
