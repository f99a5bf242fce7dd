// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `dbsnap serve` and process-wide logging setup.

use std::sync::Arc;

use dbsnap_config::DbsnapConfig;
use dbsnap_core::SnapshotError;
use dbsnap_gateway::{GatewayState, start_server};
use dbsnap_security::{RedactingWriter, SecretList};
use tracing::info;

use crate::commands::build_services;

/// Serve the trigger endpoints until shutdown.
pub async fn run_serve(config: Arc<DbsnapConfig>) -> Result<(), SnapshotError> {
    let (backup, restore) = build_services(config.clone())?;
    let state = GatewayState::new(&config, backup, restore);

    if config.gateway.bearer_token.is_empty() {
        tracing::warn!("gateway.bearer_token is not set; trigger routes will reject every request");
    }
    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        encryption = config.backup.encryption_enabled(),
        "starting dbsnap gateway"
    );

    start_server(&config.gateway.host, config.gateway.port, state).await?;

    info!("dbsnap serve shutdown complete");
    Ok(())
}

/// Log to stderr through a writer that scrubs configured secrets.
pub fn init_tracing(log_level: &str, secrets: SecretList) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dbsnap={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(move || RedactingWriter::new(std::io::stderr(), secrets.clone()))
        .init();
}
