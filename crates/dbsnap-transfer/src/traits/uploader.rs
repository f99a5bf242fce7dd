// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upload side of the transfer boundary.

use async_trait::async_trait;
use dbsnap_core::SnapshotError;

/// Stores snapshot bytes under a name.
///
/// One call is one attempt. Retrying is the caller's decision.
#[async_trait]
pub trait SnapshotUploader: Send + Sync {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), SnapshotError>;
}
