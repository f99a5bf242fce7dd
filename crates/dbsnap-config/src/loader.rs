// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./dbsnap.toml` > `~/.config/dbsnap/dbsnap.toml` > `/etc/dbsnap/dbsnap.toml`
//! with environment variable overrides via `DBSNAP_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::DbsnapConfig;

/// Config sections, in the order their env prefixes are tried.
const SECTIONS: [&str; 7] = [
    "log", "database", "backup", "restore", "remote", "security", "gateway",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/dbsnap/dbsnap.toml` (system-wide)
/// 3. `~/.config/dbsnap/dbsnap.toml` (user XDG config)
/// 4. `./dbsnap.toml` (local directory)
/// 5. `DBSNAP_*` environment variables
pub fn load_config() -> Result<DbsnapConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<DbsnapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DbsnapConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<DbsnapConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(DbsnapConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(DbsnapConfig::default()))
        .merge(Toml::file("/etc/dbsnap/dbsnap.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("dbsnap/dbsnap.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("dbsnap.toml"))
        .merge(env_provider())
}

/// Create the environment variable provider.
///
/// Uses `Env::map()` rather than `Env::split("_")`: key names contain
/// underscores, so `DBSNAP_BACKUP_BACKUP_KEY` must map to
/// `backup.backup_key`, not `backup.backup.key`.
fn env_provider() -> Env {
    Env::prefixed("DBSNAP_").map(|key| env_key_to_path(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
///
/// Only the first underscore after a known section name becomes a dot.
/// Matching ignores case.
pub fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}
