// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded exponential backoff around a fallible async call.

use std::future::Future;
use std::time::Duration;

use dbsnap_config::model::BackupConfig;
use dbsnap_core::SnapshotError;
use tracing::warn;

/// How many times to attempt a call and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(backup: &BackupConfig) -> Self {
        Self {
            max_attempts: backup.max_attempts,
            initial_backoff: Duration::from_millis(backup.initial_backoff_ms),
            max_backoff: Duration::from_millis(backup.max_backoff_ms),
        }
    }

    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based): initial, 2x, 4x, ... capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u32
            .checked_shl(retry.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or
    /// the attempts are used up. Returns the value and the attempt count.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<(T, u32), SnapshotError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SnapshotError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok((value, attempt)),
                Err(e) if attempt < max_attempts && e.is_retryable() => {
                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        kind = %e.kind(),
                        "{what} failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
