// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock snapshot fetcher for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dbsnap_core::SnapshotError;
use dbsnap_security::{LeafName, TrustedBaseUrl};
use dbsnap_transfer::SnapshotFetcher;
use tokio::sync::Mutex;

/// A fetcher serving queued responses and recording the URLs it was asked for.
///
/// With an empty queue it answers like a file server missing the object
/// (status 404).
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<Mutex<VecDeque<Result<Vec<u8>, SnapshotError>>>>,
    requested: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher whose first response is `body`.
    pub async fn serving(body: Vec<u8>) -> Self {
        let fetcher = Self::new();
        fetcher.push_response(Ok(body)).await;
        fetcher
    }

    /// Sleep this long inside every `fetch`, after recording the URL.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub async fn push_response(&self, response: Result<Vec<u8>, SnapshotError>) {
        self.responses.lock().await.push_back(response);
    }

    /// Joined URLs of every fetch, in order.
    pub async fn requested_urls(&self) -> Vec<String> {
        self.requested.lock().await.clone()
    }

    pub async fn fetch_count(&self) -> usize {
        self.requested.lock().await.len()
    }
}

#[async_trait]
impl SnapshotFetcher for MockFetcher {
    async fn fetch(&self, base: &TrustedBaseUrl, leaf: &LeafName) -> Result<Vec<u8>, SnapshotError> {
        let url = base.join(leaf)?;
        self.requested.lock().await.push(url.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or(Err(SnapshotError::RemoteStatus { status: 404 }))
    }
}
