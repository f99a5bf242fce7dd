// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The configuration-supplied base URL snapshots are fetched from.
//!
//! Only `https` bases are accepted. Leaf names are appended as a single
//! percent-encoded path segment, so a joined URL always keeps the base's
//! scheme, host, port and path prefix.

use std::fmt;

use dbsnap_core::SnapshotError;
use tracing::error;
use url::Url;

use crate::filename::LeafName;

const SECURE_SCHEME: &str = "https";

/// A parsed, `https`-only base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedBaseUrl(Url);

impl TrustedBaseUrl {
    /// Parse and check a configured base URL.
    ///
    /// Messages stay generic: the configured value is not echoed back to
    /// request callers.
    pub fn parse(raw: &str) -> Result<Self, SnapshotError> {
        let url = Url::parse(raw).map_err(|e| {
            error!(error = %e, "trusted file server URL does not parse");
            SnapshotError::Config(
                "internal server configuration error: invalid file server URL".to_string(),
            )
        })?;
        Self::from_url(url)
    }

    /// Check an already-parsed URL.
    pub fn from_url(mut url: Url) -> Result<Self, SnapshotError> {
        if url.scheme() != SECURE_SCHEME {
            error!(scheme = url.scheme(), "trusted file server URL is not https");
            return Err(SnapshotError::Config(
                "internal server configuration error: file server must use https".to_string(),
            ));
        }
        if url.cannot_be_a_base() || url.host_str().is_none() {
            return Err(SnapshotError::Config(
                "internal server configuration error: file server URL has no host".to_string(),
            ));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(SnapshotError::Config(
                "internal server configuration error: file server URL must not embed credentials"
                    .to_string(),
            ));
        }
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self(url))
    }

    /// Append a validated leaf name as one path segment.
    pub fn join(&self, leaf: &LeafName) -> Result<Url, SnapshotError> {
        let mut joined = self.0.clone();
        joined
            .path_segments_mut()
            .map_err(|_| {
                SnapshotError::Config("internal error constructing URL".to_string())
            })?
            .pop_if_empty()
            .push(leaf.as_str());

        // Holds by construction; checked so a url crate change cannot widen it.
        let prefix = self.0.path().trim_end_matches('/');
        if joined.origin() != self.0.origin() || !joined.path().starts_with(prefix) {
            return Err(SnapshotError::Config(
                "internal error constructing URL".to_string(),
            ));
        }
        Ok(joined)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for TrustedBaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
