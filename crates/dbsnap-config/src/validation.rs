// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes.
//! Messages name the offending key but never echo secret values.

use crate::diagnostic::ConfigError;
use crate::model::DbsnapConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &DbsnapConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.database.dsn.trim().is_empty() {
        fail("database.dsn must not be empty".to_string());
    }

    if config.backup.file_prefix.is_empty()
        || !config
            .backup
            .file_prefix
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        fail(format!(
            "backup.file_prefix `{}` must be non-empty and contain only letters, digits, `-` or `_`",
            config.backup.file_prefix
        ));
    }

    if config.backup.max_attempts < 1 {
        fail("backup.max_attempts must be at least 1".to_string());
    }

    if config.backup.initial_backoff_ms > config.backup.max_backoff_ms {
        fail(format!(
            "backup.initial_backoff_ms ({}) must not exceed backup.max_backoff_ms ({})",
            config.backup.initial_backoff_ms, config.backup.max_backoff_ms
        ));
    }

    if config.backup.kdf_iterations < 1 {
        fail("backup.kdf_iterations must be at least 1".to_string());
    }

    if config.backup.kdf_parallelism < 1 {
        fail("backup.kdf_parallelism must be at least 1".to_string());
    }

    if config.backup.kdf_memory_cost < 8 * config.backup.kdf_parallelism.max(1) {
        fail(format!(
            "backup.kdf_memory_cost must be at least 8 * kdf_parallelism KiB, got {}",
            config.backup.kdf_memory_cost
        ));
    }

    if config.restore.max_snapshot_bytes == 0 {
        fail("restore.max_snapshot_bytes must be greater than 0".to_string());
    }

    if config.remote.fetch_timeout_secs == 0 {
        fail("remote.fetch_timeout_secs must be greater than 0".to_string());
    }

    if config.remote.upload_timeout_secs == 0 {
        fail("remote.upload_timeout_secs must be greater than 0".to_string());
    }

    if config.remote.enabled {
        for (key, value) in [
            ("remote.bucket", &config.remote.bucket),
            ("remote.access_key", &config.remote.access_key),
            ("remote.secret_key", &config.remote.secret_key),
        ] {
            if value.trim().is_empty() {
                fail(format!("{key} must be set when remote.enabled = true"));
            }
        }

        match url::Url::parse(&config.remote.file_server) {
            Ok(parsed) if parsed.scheme() == "https" => {}
            Ok(parsed) => fail(format!(
                "remote.file_server must use https, got `{}`",
                parsed.scheme()
            )),
            Err(e) => fail(format!("remote.file_server is not a valid URL: {e}")),
        }

        if url::Url::parse(&config.remote.upload_url).is_err() {
            fail("remote.upload_url is not a valid URL".to_string());
        }
    }

    for ip in &config.security.allowed_private_ips {
        if ip.parse::<std::net::IpAddr>().is_err() {
            fail(format!(
                "security.allowed_private_ips entry `{ip}` is not an IP address"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled_config() -> DbsnapConfig {
        let mut config = DbsnapConfig::default();
        config.backup.enabled = true;
        config.remote.enabled = true;
        config.remote.bucket = "blog-backups".to_string();
        config.remote.access_key = "AK".to_string();
        config.remote.secret_key = "super-secret-sk".to_string();
        config.remote.file_server = "https://files.example.com/backups".to_string();
        config
    }

    fn has_message(errors: &[ConfigError], needle: &str) -> bool {
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains(needle)))
    }

    #[test]
    fn default_config_validates() {
        assert!(validate_config(&DbsnapConfig::default()).is_ok());
    }

    #[test]
    fn fully_enabled_config_validates() {
        assert!(validate_config(&enabled_config()).is_ok());
    }

    #[test]
    fn empty_dsn_fails_validation() {
        let mut config = DbsnapConfig::default();
        config.database.dsn = "  ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "database.dsn"));
    }

    #[test]
    fn insecure_file_server_fails_validation() {
        let mut config = enabled_config();
        config.remote.file_server = "http://files.example.com/backups".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "must use https"));
    }

    #[test]
    fn missing_credentials_reported_together() {
        let mut config = enabled_config();
        config.remote.access_key.clear();
        config.remote.secret_key.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "remote.access_key"));
        assert!(has_message(&errors, "remote.secret_key"));
    }

    #[test]
    fn remote_checks_skipped_when_disabled() {
        let mut config = DbsnapConfig::default();
        config.remote.file_server = "ftp://nowhere".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn zero_attempts_fails_validation() {
        let mut config = DbsnapConfig::default();
        config.backup.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "max_attempts"));
    }

    #[test]
    fn prefix_with_separator_fails_validation() {
        let mut config = DbsnapConfig::default();
        config.backup.file_prefix = "../wblog".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(has_message(&errors, "backup.file_prefix"));
    }

    #[test]
    fn messages_never_contain_secret_values() {
        let mut config = enabled_config();
        config.remote.file_server = "not a url".to_string();
        config.backup.max_attempts = 0;
        let errors = validate_config(&config).unwrap_err();
        for error in errors {
            assert!(!error.to_string().contains("super-secret-sk"));
        }
    }
}
