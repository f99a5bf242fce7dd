// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hardened reqwest client for outbound snapshot transfers.

use std::sync::Arc;

use dbsnap_config::model::SecurityConfig;
use dbsnap_core::SnapshotError;
use tracing::error;

use crate::ssrf::SsrfSafeResolver;

/// Build a reqwest::Client with security defaults.
///
/// - Minimum TLS 1.2.
/// - SSRF-safe DNS resolver that blocks private IP ranges not allowlisted.
/// - Redirects are not followed, so a response can never move the request
///   off the trusted host.
pub fn build_secure_client(config: &SecurityConfig) -> Result<reqwest::Client, SnapshotError> {
    let resolver = SsrfSafeResolver::new(&config.allowed_private_ips);

    reqwest::Client::builder()
        .min_tls_version(reqwest::tls::Version::TLS_1_2)
        .https_only(true)
        .redirect(reqwest::redirect::Policy::none())
        .dns_resolver(Arc::new(resolver))
        .build()
        .map_err(|e| {
            error!("failed to build secure HTTP client: {e}");
            SnapshotError::Config(format!("failed to build secure HTTP client: {e}"))
        })
}
