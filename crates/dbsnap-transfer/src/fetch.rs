// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP snapshot fetcher.
//!
//! Issues one bounded GET per fetch and reads the body as a stream so an
//! oversized response is cut off instead of buffered.

use std::time::Duration;

use async_trait::async_trait;
use dbsnap_config::DbsnapConfig;
use dbsnap_core::SnapshotError;
use dbsnap_security::{LeafName, TrustedBaseUrl, build_secure_client};
use futures::StreamExt;
use tracing::{debug, warn};
use url::Url;

use crate::traits::SnapshotFetcher;

/// [`SnapshotFetcher`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpSnapshotFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl HttpSnapshotFetcher {
    pub fn new(client: reqwest::Client, timeout: Duration, max_bytes: u64) -> Self {
        Self {
            client,
            timeout,
            max_bytes,
        }
    }

    /// Fetcher using the hardened client and the configured limits.
    pub fn from_config(config: &DbsnapConfig) -> Result<Self, SnapshotError> {
        let client = build_secure_client(&config.security)?;
        Ok(Self::new(
            client,
            Duration::from_secs(config.remote.fetch_timeout_secs),
            config.restore.max_snapshot_bytes,
        ))
    }

    /// GET an already-joined URL. The response is dropped on every early return.
    pub(crate) async fn fetch_url(&self, url: Url) -> Result<Vec<u8>, SnapshotError> {
        debug!(url = %url, "fetching snapshot");

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "file server refused snapshot fetch");
            return Err(SnapshotError::RemoteStatus {
                status: status.as_u16(),
            });
        }

        if let Some(len) = response.content_length()
            && len > self.max_bytes
        {
            return Err(self.too_large());
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| self.transport_error(e))?;
            if (body.len() + chunk.len()) as u64 > self.max_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        debug!(bytes = body.len(), "snapshot body received");
        Ok(body)
    }

    fn transport_error(&self, e: reqwest::Error) -> SnapshotError {
        let message = if e.is_timeout() {
            format!("snapshot fetch timed out after {}s", self.timeout.as_secs_f32())
        } else if e.is_connect() {
            "could not connect to file server".to_string()
        } else {
            "snapshot fetch failed".to_string()
        };
        SnapshotError::transport(message, e.without_url())
    }

    fn too_large(&self) -> SnapshotError {
        SnapshotError::Transport {
            message: format!("snapshot exceeds the {} byte limit", self.max_bytes),
            source: None,
        }
    }
}

#[async_trait]
impl SnapshotFetcher for HttpSnapshotFetcher {
    async fn fetch(&self, base: &TrustedBaseUrl, leaf: &LeafName) -> Result<Vec<u8>, SnapshotError> {
        let url = base.join(leaf)?;
        self.fetch_url(url).await
    }
}
