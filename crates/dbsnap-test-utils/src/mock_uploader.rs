// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock snapshot uploader for deterministic testing.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dbsnap_core::SnapshotError;
use dbsnap_transfer::SnapshotUploader;
use tokio::sync::Mutex;

/// One recorded `put` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCall {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// An uploader that records every call.
///
/// Outcomes are popped from a FIFO queue; when the queue is empty the
/// upload succeeds.
#[derive(Clone, Default)]
pub struct MockUploader {
    calls: Arc<Mutex<Vec<UploadCall>>>,
    outcomes: Arc<Mutex<VecDeque<Result<(), SnapshotError>>>>,
    delay: Option<Duration>,
}

impl MockUploader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep this long inside every `put`, to hold an operation open.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue the outcome of the next call.
    pub async fn push_outcome(&self, outcome: Result<(), SnapshotError>) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Queue a retryable upload failure.
    pub async fn fail_next(&self, status: u16) {
        self.push_outcome(Err(SnapshotError::Upload {
            message: format!("object store returned {status}"),
            status: Some(status),
            source: None,
        }))
        .await;
    }

    pub async fn calls(&self) -> Vec<UploadCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl SnapshotUploader for MockUploader {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), SnapshotError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.lock().await.push(UploadCall {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        });
        self.outcomes.lock().await.pop_front().unwrap_or(Ok(()))
    }
}
