// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fetch side of the transfer boundary.

use async_trait::async_trait;
use dbsnap_core::SnapshotError;
use dbsnap_security::{LeafName, TrustedBaseUrl};

/// Retrieves a stored snapshot from the trusted file server.
///
/// Both arguments are already-validated types: the base URL came from
/// configuration and is `https`, the leaf name passed filename validation.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    /// Download the full snapshot body.
    ///
    /// Network failures map to [`SnapshotError::Transport`]; a non-success
    /// status maps to [`SnapshotError::RemoteStatus`].
    async fn fetch(&self, base: &TrustedBaseUrl, leaf: &LeafName) -> Result<Vec<u8>, SnapshotError>;
}
