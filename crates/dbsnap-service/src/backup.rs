// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup pipeline.
//!
//! `check policy -> locate file -> read -> maybe encrypt -> name -> upload`.
//! The first failing stage ends the run with its error; nothing is
//! retried except the upload, and only under [`RetryPolicy`].

use std::sync::Arc;

use dbsnap_config::DbsnapConfig;
use dbsnap_core::{BackupReceipt, Clock, SnapshotError};
use dbsnap_transfer::SnapshotUploader;
use tracing::{debug, error, info};

use crate::codec::codec_from_config;
use crate::locate::database_path;
use crate::naming::snapshot_name;
use crate::policy::check_policy;
use crate::read::read_database;
use crate::retry::RetryPolicy;

pub struct BackupService {
    config: Arc<DbsnapConfig>,
    uploader: Arc<dyn SnapshotUploader>,
    clock: Arc<dyn Clock>,
    retry: RetryPolicy,
}

impl BackupService {
    /// Service with the retry policy taken from `config.backup`.
    pub fn new(
        config: Arc<DbsnapConfig>,
        uploader: Arc<dyn SnapshotUploader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let retry = RetryPolicy::from_config(&config.backup);
        Self {
            config,
            uploader,
            clock,
            retry,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Take and upload one snapshot.
    pub async fn run(&self) -> Result<BackupReceipt, SnapshotError> {
        let result = self.run_inner().await;
        if let Err(e) = &result {
            error!(kind = %e.kind(), error = %e, "backup failed");
        }
        result
    }

    async fn run_inner(&self) -> Result<BackupReceipt, SnapshotError> {
        check_policy(&self.config)?;

        let path = database_path(&self.config.database.dsn)?;
        debug!(path = %path.display(), "located database file");

        let codec = codec_from_config(&self.config.backup)?;
        let read_mode = self.config.backup.read_mode;
        let (payload, encrypted) = tokio::task::spawn_blocking(
            move || -> Result<(Vec<u8>, bool), SnapshotError> {
                let plain = read_database(&path, read_mode)?;
                debug!(bytes = plain.len(), "database file read");
                match codec {
                    Some(codec) => Ok((codec.encrypt(&plain)?, true)),
                    None => Ok((plain, false)),
                }
            },
        )
        .await
        .map_err(|e| SnapshotError::Internal(format!("backup task failed: {e}")))??;

        let name = snapshot_name(&self.config.backup.file_prefix, self.clock.now());
        debug!(name = %name, encrypted, "snapshot prepared");

        let uploader = &self.uploader;
        let (name_ref, bytes) = (name.as_str(), payload.as_slice());
        let ((), attempts) = self
            .retry
            .run("snapshot upload", move || uploader.put(name_ref, bytes))
            .await?;

        info!(name = %name, bytes = payload.len(), encrypted, attempts, "backup uploaded");
        Ok(BackupReceipt {
            name,
            bytes: payload.len() as u64,
            encrypted,
            attempts,
        })
    }
}
