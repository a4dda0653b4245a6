use munigraph_core::ConfigManager;
use std::fs;
use tempfile::TempDir;

#[test]
fn layered_files_override_defaults() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("default.toml"),
        r#"
[source]
max_retries = 5

[graph]
active_until = 2020
"#,
    )
    .unwrap();
    fs::write(
        tmp.path().join("staging.toml"),
        r#"
[source]
endpoint = "http://localhost:7200/query"
"#,
    )
    .unwrap();

    let manager =
        ConfigManager::load(Some(tmp.path().to_path_buf()), Some("staging".into())).unwrap();
    let settings = manager.settings();
    assert_eq!(manager.env(), "staging");
    assert_eq!(settings.source.max_retries, 5);
    assert_eq!(settings.source.endpoint, "http://localhost:7200/query");
    assert_eq!(settings.graph.active_until, Some(2020));
    assert_eq!(settings.source.backoff_factor_ms, 300);
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    let manager = ConfigManager::load(Some(tmp.path().to_path_buf()), Some("test".into())).unwrap();
    assert_eq!(manager.settings().logging.level, "info");
    assert_eq!(manager.config_dir(), tmp.path());
}

#[test]
fn invalid_file_is_rejected() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("default.toml"),
        r#"
[server]
host = ""
"#,
    )
    .unwrap();
    assert!(ConfigManager::load(Some(tmp.path().to_path_buf()), Some("test".into())).is_err());
}
