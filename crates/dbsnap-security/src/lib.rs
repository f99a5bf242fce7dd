// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input and network hardening for the snapshot pipeline.
//!
//! Provides filename validation, the https-only trusted base URL, an
//! SSRF-filtering DNS resolver with a TLS 1.2+ client, and secret redaction
//! for log output.

pub mod filename;
pub mod redact;
pub mod ssrf;
pub mod tls;
pub mod trusted_url;

pub use filename::{LeafName, is_base_name, is_valid_filename};
pub use redact::{RedactingWriter, SecretList, redact};
pub use ssrf::SsrfSafeResolver;
pub use tls::build_secure_client;
pub use trusted_url::TrustedBaseUrl;
