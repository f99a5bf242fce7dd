// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for dbsnap.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// The only database dialect snapshots are supported for.
pub const SUPPORTED_DIALECT: &str = "sqlite";

/// Top-level dbsnap configuration.
///
/// Read-only once loaded: services receive it behind an `Arc` and never
/// mutate it.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DbsnapConfig {
    /// Log output settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Which database is snapshotted and where it lives.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Backup feature flag, encryption key, naming and retry.
    #[serde(default)]
    pub backup: BackupConfig,

    /// Restore persistence behavior.
    #[serde(default)]
    pub restore: RestoreConfig,

    /// Remote object storage and trusted file server.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Outbound network policy.
    #[serde(default)]
    pub security: SecurityConfig,

    /// HTTP trigger surface.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl DbsnapConfig {
    /// Secret values that must never appear in user-visible output.
    pub fn secret_values(&self) -> Vec<&str> {
        [
            self.backup.backup_key.as_str(),
            self.remote.secret_key.as_str(),
            self.remote.access_key.as_str(),
            self.gateway.bearer_token.as_str(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Database location configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Engine identifier. Only [`SUPPORTED_DIALECT`] is accepted by the services.
    #[serde(default = "default_dialect")]
    pub dialect: String,

    /// Connection string whose path component names the database file.
    #[serde(default = "default_dsn")]
    pub dsn: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            dialect: default_dialect(),
            dsn: default_dsn(),
        }
    }
}

fn default_dialect() -> String {
    SUPPORTED_DIALECT.to_string()
}

fn default_dsn() -> String {
    dirs::data_dir()
        .map(|p| p.join("wblog").join("wblog.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("wblog.db"))
        .to_string_lossy()
        .into_owned()
}

/// How the database bytes are read during backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadMode {
    /// Read the file bytes as they are on disk.
    #[default]
    Raw,
    /// Copy through SQLite's online backup API first, for a consistent
    /// image while other connections are writing.
    SqliteOnline,
}

/// Backup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BackupConfig {
    /// Master switch for backup and restore.
    #[serde(default)]
    pub enabled: bool,

    /// Symmetric passphrase. Empty disables encryption on both paths.
    #[serde(default)]
    pub backup_key: String,

    /// Prefix of generated snapshot names (`<prefix>_<YYYYMMDDhhmmss>.db`).
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// How the database file is read.
    #[serde(default)]
    pub read_mode: ReadMode,

    /// Total upload attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry, doubled for each subsequent one.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound for a single retry delay.
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Argon2id memory cost in KiB (default: 19456 = 19 MiB).
    #[serde(default = "default_kdf_memory_cost")]
    pub kdf_memory_cost: u32,

    /// Argon2id iteration count.
    #[serde(default = "default_kdf_iterations")]
    pub kdf_iterations: u32,

    /// Argon2id parallelism lanes.
    #[serde(default = "default_kdf_parallelism")]
    pub kdf_parallelism: u32,
}

impl BackupConfig {
    /// Whether snapshots are encrypted.
    pub fn encryption_enabled(&self) -> bool {
        !self.backup_key.is_empty()
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backup_key: String::new(),
            file_prefix: default_file_prefix(),
            read_mode: ReadMode::default(),
            max_attempts: default_max_attempts(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            kdf_memory_cost: default_kdf_memory_cost(),
            kdf_iterations: default_kdf_iterations(),
            kdf_parallelism: default_kdf_parallelism(),
        }
    }
}

fn default_file_prefix() -> String {
    "wblog".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8_000
}

fn default_kdf_memory_cost() -> u32 {
    19_456
}

fn default_kdf_iterations() -> u32 {
    2
}

fn default_kdf_parallelism() -> u32 {
    1
}

/// Restore configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RestoreConfig {
    /// Copy the current database to `<db>.pre-restore` before replacing it.
    #[serde(default = "default_keep_pre_restore_copy")]
    pub keep_pre_restore_copy: bool,

    /// Open the restored bytes with SQLite before swapping them in.
    #[serde(default)]
    pub verify_sqlite: bool,

    /// Largest snapshot body accepted from the file server.
    #[serde(default = "default_max_snapshot_bytes")]
    pub max_snapshot_bytes: u64,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        Self {
            keep_pre_restore_copy: default_keep_pre_restore_copy(),
            verify_sqlite: false,
            max_snapshot_bytes: default_max_snapshot_bytes(),
        }
    }
}

fn default_keep_pre_restore_copy() -> bool {
    true
}

fn default_max_snapshot_bytes() -> u64 {
    1024 * 1024 * 1024
}

/// Remote object storage and file server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteConfig {
    /// Master switch for the remote storage integration.
    #[serde(default)]
    pub enabled: bool,

    /// Object storage access key.
    #[serde(default)]
    pub access_key: String,

    /// Object storage secret key.
    #[serde(default)]
    pub secret_key: String,

    /// Bucket (upload scope) snapshots are stored in.
    #[serde(default)]
    pub bucket: String,

    /// Form upload endpoint of the object storage provider.
    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    /// Trusted base URL snapshots are fetched from. Must be `https`.
    #[serde(default)]
    pub file_server: String,

    /// Timeout for a single snapshot fetch.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for a single upload request.
    #[serde(default = "default_upload_timeout_secs")]
    pub upload_timeout_secs: u64,

    /// Lifetime of issued upload tokens.
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            access_key: String::new(),
            secret_key: String::new(),
            bucket: String::new(),
            upload_url: default_upload_url(),
            file_server: String::new(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            upload_timeout_secs: default_upload_timeout_secs(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

fn default_upload_url() -> String {
    "https://upload.qiniup.com".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

fn default_upload_timeout_secs() -> u64 {
    120
}

fn default_token_ttl_secs() -> u64 {
    3600
}

/// Outbound network security configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SecurityConfig {
    /// Private IP addresses the file server may resolve to.
    #[serde(default)]
    pub allowed_private_ips: Vec<String>,
}

/// HTTP trigger surface configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Host address to bind.
    #[serde(default = "default_gateway_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bearer token required on trigger routes. Empty rejects every request.
    #[serde(default)]
    pub bearer_token: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            bearer_token: String::new(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8088
}
