// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Restore pipeline.
//!
//! `validate name -> check policy -> build URL -> fetch -> maybe decrypt
//! -> persist`. The name is validated before anything touches the network
//! or disk, and decryption completes before the local file is replaced,
//! so a wrong key or a corrupt snapshot never overwrites the database.

use std::sync::Arc;

use dbsnap_config::DbsnapConfig;
use dbsnap_core::{RestoreReceipt, SnapshotError};
use dbsnap_security::{LeafName, TrustedBaseUrl};
use dbsnap_transfer::SnapshotFetcher;
use tracing::{debug, error, info};

use crate::codec::codec_from_config;
use crate::locate::database_path;
use crate::persist::{PersistOptions, persist_atomically};
use crate::policy::check_policy;

pub struct RestoreService {
    config: Arc<DbsnapConfig>,
    fetcher: Arc<dyn SnapshotFetcher>,
}

impl RestoreService {
    pub fn new(config: Arc<DbsnapConfig>, fetcher: Arc<dyn SnapshotFetcher>) -> Self {
        Self { config, fetcher }
    }

    /// Fetch `file_name` from the trusted file server and replace the
    /// local database with it.
    pub async fn run(&self, file_name: &str) -> Result<RestoreReceipt, SnapshotError> {
        let result = self.run_inner(file_name).await;
        if let Err(e) = &result {
            error!(kind = %e.kind(), error = %e, "restore failed");
        }
        result
    }

    async fn run_inner(&self, file_name: &str) -> Result<RestoreReceipt, SnapshotError> {
        let leaf = LeafName::parse(file_name)?;
        check_policy(&self.config)?;

        let base = TrustedBaseUrl::parse(&self.config.remote.file_server)?;
        let url = base.join(&leaf)?;
        debug!(url = %url, "restore source resolved");

        let target = database_path(&self.config.database.dsn)?;
        let codec = codec_from_config(&self.config.backup)?;

        let body = self.fetcher.fetch(&base, &leaf).await?;
        let limit = self.config.restore.max_snapshot_bytes;
        if body.len() as u64 > limit {
            return Err(SnapshotError::Transport {
                message: format!("snapshot exceeds the {limit} byte limit"),
                source: None,
            });
        }
        debug!(bytes = body.len(), "snapshot fetched");

        let options = PersistOptions::from(&self.config.restore);
        let (bytes, decrypted) = tokio::task::spawn_blocking(
            move || -> Result<(u64, bool), SnapshotError> {
                let (plain, decrypted) = match codec {
                    Some(codec) => (codec.decrypt(&body)?, true),
                    None => (body, false),
                };
                persist_atomically(&target, &plain, options)?;
                Ok((plain.len() as u64, decrypted))
            },
        )
        .await
        .map_err(|e| SnapshotError::Internal(format!("restore task failed: {e}")))??;

        info!(name = %leaf, bytes, decrypted, "database restored");
        Ok(RestoreReceipt {
            name: leaf.to_string(),
            bytes,
            decrypted,
        })
    }
}
