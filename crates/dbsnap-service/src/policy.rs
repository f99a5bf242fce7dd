// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feature gate shared by backup and restore.

use dbsnap_config::DbsnapConfig;
use dbsnap_config::model::SUPPORTED_DIALECT;
use dbsnap_core::SnapshotError;

/// Refuse to run unless the dialect is supported and both the backup and
/// remote storage features are enabled. Performs no I/O.
pub fn check_policy(config: &DbsnapConfig) -> Result<(), SnapshotError> {
    if config.database.dialect != SUPPORTED_DIALECT {
        return Err(SnapshotError::Config(format!(
            "only the {SUPPORTED_DIALECT} dialect is supported"
        )));
    }
    if !config.backup.enabled {
        return Err(SnapshotError::Config("backup is not enabled".to_string()));
    }
    if !config.remote.enabled {
        return Err(SnapshotError::Config(
            "remote storage is not enabled".to_string(),
        ));
    }
    Ok(())
}
