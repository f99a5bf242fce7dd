// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dbsnap backup`, `dbsnap restore` and `dbsnap check`.

use std::sync::Arc;
use std::time::Duration;

use dbsnap_config::DbsnapConfig;
use dbsnap_core::{OperationResult, SnapshotError, SystemClock};
use dbsnap_security::{SecretList, TrustedBaseUrl, build_secure_client, redact};
use dbsnap_service::{BackupService, RestoreService, database_path};
use dbsnap_transfer::{FormUploadStore, HttpSnapshotFetcher, StoreUploader};

/// Configured secrets, shared with the log writer.
pub fn secret_list(config: &DbsnapConfig) -> SecretList {
    Arc::new(
        config
            .secret_values()
            .into_iter()
            .map(str::to_string)
            .collect(),
    )
}

/// Render an error with every configured secret value removed.
pub fn scrub(config: &DbsnapConfig, err: &SnapshotError) -> String {
    redact(&err.to_string(), &config.secret_values())
}

fn failure(config: &DbsnapConfig, err: &SnapshotError) -> OperationResult {
    let secrets = config.secret_values();
    OperationResult::failure(err, |msg| redact(msg, &secrets))
}

/// Wire both services against the real transports.
///
/// The clients are built up front; nothing connects until a run starts.
pub fn build_services(
    config: Arc<DbsnapConfig>,
) -> Result<(BackupService, RestoreService), SnapshotError> {
    let client = build_secure_client(&config.security)?;
    let store = FormUploadStore::new(client, &config.remote)?;
    let uploader = StoreUploader::new(
        Arc::new(store),
        config.remote.bucket.clone(),
        Duration::from_secs(config.remote.token_ttl_secs),
        Arc::new(SystemClock),
    );
    let fetcher = HttpSnapshotFetcher::from_config(&config)?;

    let backup = BackupService::new(config.clone(), Arc::new(uploader), Arc::new(SystemClock));
    let restore = RestoreService::new(config, Arc::new(fetcher));
    Ok((backup, restore))
}

pub async fn run_backup(config: Arc<DbsnapConfig>) -> OperationResult {
    let backup = match build_services(config.clone()) {
        Ok((backup, _)) => backup,
        Err(e) => return failure(&config, &e),
    };
    match backup.run().await {
        Ok(receipt) => OperationResult::success(format!(
            "backup stored as {} ({} bytes{})",
            receipt.name,
            receipt.bytes,
            if receipt.encrypted { ", encrypted" } else { "" }
        )),
        Err(e) => failure(&config, &e),
    }
}

pub async fn run_restore(config: Arc<DbsnapConfig>, file_name: &str) -> OperationResult {
    let restore = match build_services(config.clone()) {
        Ok((_, restore)) => restore,
        Err(e) => return failure(&config, &e),
    };
    match restore.run(file_name).await {
        Ok(receipt) => OperationResult::success(format!(
            "restored {} ({} bytes)",
            receipt.name, receipt.bytes
        )),
        Err(e) => failure(&config, &e),
    }
}

/// Resolve everything a run would use without touching the network.
pub fn run_check(config: &DbsnapConfig) -> Result<Vec<String>, SnapshotError> {
    let path = database_path(&config.database.dsn)?;
    let base = TrustedBaseUrl::parse(&config.remote.file_server)?;
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    Ok(vec![
        format!("database:   {} ({})", path.display(), config.database.dialect),
        format!(
            "            {}",
            if path.is_file() { "file exists" } else { "file does not exist" }
        ),
        format!("backup:     {}", on_off(config.backup.enabled)),
        format!("encryption: {}", on_off(config.backup.encryption_enabled())),
        format!("remote:     {}", on_off(config.remote.enabled)),
        format!("upload to:  {} (bucket {})", config.remote.upload_url, config.remote.bucket),
        format!("fetch from: {base}"),
    ])
}
