// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the dbsnap configuration system.

use dbsnap_config::diagnostic::ConfigError;
use dbsnap_config::model::{DbsnapConfig, ReadMode};
use dbsnap_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// A complete file with every section deserializes field by field.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[log]
level = "debug"

[database]
dialect = "sqlite"
dsn = "file:///var/lib/wblog/wblog.db?_loc=Local"

[backup]
enabled = true
backup_key = "s3cr3t-key-32-bytes-long!!"
file_prefix = "wblog"
read_mode = "sqlite-online"
max_attempts = 5

[restore]
keep_pre_restore_copy = false
verify_sqlite = true

[remote]
enabled = true
access_key = "AK"
secret_key = "SK"
bucket = "blog"
file_server = "https://files.example.com/backups"
fetch_timeout_secs = 10

[gateway]
port = 9000
bearer_token = "token-123"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.database.dialect, "sqlite");
    assert!(config.backup.enabled);
    assert!(config.backup.encryption_enabled());
    assert_eq!(config.backup.read_mode, ReadMode::SqliteOnline);
    assert_eq!(config.backup.max_attempts, 5);
    assert!(!config.restore.keep_pre_restore_copy);
    assert!(config.restore.verify_sqlite);
    assert!(config.remote.enabled);
    assert_eq!(config.remote.bucket, "blog");
    assert_eq!(config.remote.fetch_timeout_secs, 10);
    assert_eq!(config.gateway.port, 9000);
}

/// Unknown keys are rejected rather than silently ignored.
#[test]
fn unknown_field_in_remote_produces_error() {
    let toml = r#"
[remote]
file_sever = "https://files.example.com"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("file_sever"),
        "got: {err_str}"
    );
}

/// The diagnostic bridge offers the closest valid key.
#[test]
fn diagnostic_suggests_closest_key() {
    let errors = load_and_validate_str("[remote]\nfile_sever = \"x\"\n").unwrap_err();
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey { suggestion, .. } => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("file_server"));
}

/// Omitted sections fall back to compiled defaults.
#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty config is valid");
    assert_eq!(config.database.dialect, "sqlite");
    assert!(!config.backup.enabled);
    assert!(!config.backup.encryption_enabled());
    assert_eq!(config.backup.file_prefix, "wblog");
    assert_eq!(config.backup.read_mode, ReadMode::Raw);
    assert!(!config.remote.enabled);
    assert_eq!(config.remote.fetch_timeout_secs, 30);
    assert!(config.restore.keep_pre_restore_copy);
}

/// Env overrides land on the dotted path the loader maps them to.
#[test]
fn dotted_override_sets_backup_key() {
    use figment::{providers::Serialized, Figment};

    let key = dbsnap_config::loader::env_key_to_path("backup_backup_key");
    let config: DbsnapConfig = Figment::new()
        .merge(Serialized::defaults(DbsnapConfig::default()))
        .merge((key.as_str(), "from-env"))
        .extract()
        .expect("override should merge");

    assert_eq!(config.backup.backup_key, "from-env");
}

/// Semantic validation runs after a successful parse.
#[test]
fn validation_rejects_insecure_file_server() {
    let toml = r#"
[remote]
enabled = true
access_key = "AK"
secret_key = "SK"
bucket = "blog"
file_server = "http://files.example.com/backups"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(errors.iter().any(|e| e.to_string().contains("https")));
}

/// An explicit config file path is honored.
#[test]
fn loads_from_explicit_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dbsnap.toml");
    std::fs::write(&path, "[database]\ndsn = \"/tmp/explicit.db\"\n").unwrap();

    let config = load_and_validate_path(&path).expect("file config is valid");
    assert_eq!(config.database.dsn, "/tmp/explicit.db");
}

/// Default config serializes to TOML and parses back unchanged in shape.
#[test]
fn serialized_defaults_reparse() {
    let rendered = toml::to_string(&DbsnapConfig::default()).unwrap();
    let config = load_config_from_str(&rendered).expect("rendered defaults parse");
    assert_eq!(config.remote.upload_url, "https://upload.qiniup.com");
}

/// Secret values are collected for scrubbing, empty ones skipped.
#[test]
fn secret_values_skip_empty_entries() {
    let mut config = DbsnapConfig::default();
    config.backup.backup_key = "k".to_string();
    config.remote.secret_key = "sk".to_string();
    let secrets = config.secret_values();
    assert_eq!(secrets, vec!["k", "sk"]);
}
