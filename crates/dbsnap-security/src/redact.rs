// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scrubbing of credentials from log lines and caller-facing messages.
//!
//! Pattern rules catch credential shapes that may appear without being
//! configured values (upload tokens, bearer headers, URL userinfo). The
//! exact-match list covers the configured backup key, storage keys, and
//! gateway token.

use std::io::Write;
use std::sync::{Arc, LazyLock};

use regex::Regex;

const REDACTED: &str = "[REDACTED]";

static REDACTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        // Form upload token: access_key:signature:encoded_policy
        (
            Regex::new(r"[A-Za-z0-9_\-]{8,}:[A-Za-z0-9_\-]{20,}={0,2}:[A-Za-z0-9_\-]{20,}={0,2}")
                .expect("static upload token pattern"),
            REDACTED,
        ),
        (
            Regex::new(r"Bearer\s+[A-Za-z0-9._\-]{8,}").expect("static bearer pattern"),
            "Bearer [REDACTED]",
        ),
        // user:password@ inside a URL
        (
            Regex::new(r"(?P<scheme>[a-z][a-z0-9+.\-]*://)[^/@\s]+@")
                .expect("static userinfo pattern"),
            "${scheme}[REDACTED]@",
        ),
    ]
});

/// Replace known credential shapes and every non-empty `secrets` entry.
///
/// Exact values are replaced longest first so a secret that contains
/// another is not left half-visible.
pub fn redact<S: AsRef<str>>(input: &str, secrets: &[S]) -> String {
    let mut result = input.to_string();
    for (pattern, replacement) in REDACTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, *replacement).into_owned();
    }

    let mut sorted: Vec<&str> = secrets
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| !s.is_empty())
        .collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
    for secret in sorted {
        result = result.replace(secret, REDACTED);
    }
    result
}

/// Exact values a [`RedactingWriter`] scrubs, fixed at startup.
pub type SecretList = Arc<Vec<String>>;

/// `Write` adapter used as the tracing output so secrets never reach stderr.
pub struct RedactingWriter<W> {
    inner: W,
    secrets: SecretList,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W, secrets: SecretList) -> Self {
        Self { inner, secrets }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let input = String::from_utf8_lossy(buf);
        let redacted = redact(&input, self.secrets.as_slice());
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
