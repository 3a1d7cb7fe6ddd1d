use super::*;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = Config::default();
    let hotstrings = config.get_hotstrings();
    assert_eq!(hotstrings.enabled, DEFAULT_HOTSTRINGS_ENABLED);
    assert_eq!(hotstrings.max_buffer_len, DEFAULT_MAX_BUFFER_LEN);
    assert!(config.get_watch_commands());
    assert_eq!(config.log_level, None);
}

#[test]
fn test_injector_defaults() {
    let injector = Config::default().get_injector();
    assert_eq!(injector.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    assert_eq!(injector.key_delay_ms, DEFAULT_KEY_DELAY_MS);
    assert_eq!(injector.paste_delay_ms, DEFAULT_PASTE_DELAY_MS);
    assert_eq!(injector.resume_delay_ms, DEFAULT_RESUME_DELAY_MS);

    let injector_config = injector.to_injector_config();
    assert_eq!(injector_config.key_delay_ms, DEFAULT_KEY_DELAY_MS);
    assert_eq!(injector_config.paste_delay_ms, DEFAULT_PASTE_DELAY_MS);
}

#[test]
fn test_partial_hotstring_settings_fill_defaults() {
    let json = r#"{"hotstrings": {"enabled": false}}"#;
    let config: Config = serde_json::from_str(json).unwrap();
    let hotstrings = config.get_hotstrings();
    assert!(!hotstrings.enabled);
    assert_eq!(hotstrings.max_buffer_len, DEFAULT_MAX_BUFFER_LEN);
}

#[test]
fn test_camel_case_fields() {
    let json = r#"{
        "hotstrings": {"maxBufferLen": 12},
        "injector": {"settleDelayMs": 5},
        "commandsPath": "/tmp/cmds.json",
        "watchCommands": false,
        "logLevel": "debug"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();
    assert_eq!(config.get_hotstrings().max_buffer_len, 12);
    assert_eq!(config.get_injector().settle_delay_ms, 5);
    assert_eq!(config.get_injector().key_delay_ms, DEFAULT_KEY_DELAY_MS);
    assert_eq!(config.get_commands_path(), PathBuf::from("/tmp/cmds.json"));
    assert!(!config.get_watch_commands());
    assert_eq!(config.log_level.as_deref(), Some("debug"));
}

#[test]
fn test_default_paths_live_in_app_dir() {
    let config = Config::default();
    assert_eq!(config.get_commands_path(), app_dir().join("commands.json"));
    assert_eq!(config.get_vault_path(), app_dir().join("vault.json"));
}

#[test]
fn test_tilde_paths_are_expanded() {
    let config = Config {
        vault_path: Some("~/vault.json".to_string()),
        ..Default::default()
    };
    let path = config.get_vault_path();
    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with("vault.json"));
}

#[test]
fn test_load_missing_file_returns_defaults() {
    let config = load_config(&PathBuf::from("/nonexistent/stratum/settings.json"));
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_malformed_file_returns_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    std::fs::write(&path, "{ not json").unwrap();

    assert_eq!(load_config(&path), Config::default());
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join(SETTINGS_FILE_NAME);

    let config = Config {
        hotstrings: Some(HotstringSettings {
            enabled: false,
            max_buffer_len: 20,
        }),
        watch_commands: Some(false),
        ..Default::default()
    };
    save_config(&config, &path).unwrap();

    let loaded = load_config(&path);
    assert_eq!(loaded, config);
}

#[test]
fn test_none_fields_are_not_serialized() {
    let json = serde_json::to_string(&Config::default()).unwrap();
    assert_eq!(json, "{}");
}
