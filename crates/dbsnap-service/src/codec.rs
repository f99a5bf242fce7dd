// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use dbsnap_config::model::BackupConfig;
use dbsnap_core::SnapshotError;
use dbsnap_crypto::{KdfParams, SnapshotCodec};
use secrecy::SecretString;

/// The codec for the configured key, or `None` in plaintext mode.
pub fn codec_from_config(backup: &BackupConfig) -> Result<Option<SnapshotCodec>, SnapshotError> {
    if !backup.encryption_enabled() {
        return Ok(None);
    }
    let params = KdfParams {
        memory_cost: backup.kdf_memory_cost,
        iterations: backup.kdf_iterations,
        parallelism: backup.kdf_parallelism,
    };
    SnapshotCodec::new(SecretString::from(backup.backup_key.clone()), params).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_means_plaintext() {
        assert!(codec_from_config(&BackupConfig::default()).unwrap().is_none());
    }

    #[test]
    fn key_builds_codec() {
        let backup = BackupConfig {
            backup_key: "k".into(),
            kdf_memory_cost: 64,
            kdf_iterations: 1,
            ..BackupConfig::default()
        };
        assert!(codec_from_config(&backup).unwrap().is_some());
    }
}
