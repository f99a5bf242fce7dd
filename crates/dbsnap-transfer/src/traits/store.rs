// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contract of the object-storage collaborator.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dbsnap_core::SnapshotError;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// Scope and expiry an upload token is issued for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutPolicy {
    /// Bucket the token may write to.
    pub scope: String,
    /// Unix seconds after which the token is rejected.
    pub deadline: i64,
}

impl PutPolicy {
    /// Policy for `bucket`, valid for `ttl` from `now`.
    pub fn for_bucket(bucket: impl Into<String>, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            scope: bucket.into(),
            deadline: now.timestamp().saturating_add(ttl),
        }
    }
}

/// A signed upload credential. Never printed.
#[derive(Clone)]
pub struct UploadToken(SecretString);

impl UploadToken {
    pub fn new(token: String) -> Self {
        Self(SecretString::from(token))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for UploadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UploadToken([redacted])")
    }
}

/// What the store reported for a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutReceipt {
    /// Object key as stored.
    pub key: String,
    /// Content hash reported by the store, when it reports one.
    pub hash: Option<String>,
}

/// External object storage: token issuance plus a single transfer.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a token authorizing uploads under `policy`.
    async fn issue_token(&self, policy: &PutPolicy) -> Result<UploadToken, SnapshotError>;

    /// Upload `len` bytes of `body` as `name`.
    async fn upload(
        &self,
        token: &UploadToken,
        name: &str,
        body: Vec<u8>,
        len: u64,
    ) -> Result<PutReceipt, SnapshotError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn deadline_is_now_plus_ttl() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let policy = PutPolicy::for_bucket("snapshots", Duration::from_secs(3600), now);
        assert_eq!(policy.scope, "snapshots");
        assert_eq!(policy.deadline, now.timestamp() + 3600);
    }

    #[test]
    fn policy_serializes_scope_then_deadline() {
        let policy = PutPolicy {
            scope: "b".into(),
            deadline: 10,
        };
        assert_eq!(
            serde_json::to_string(&policy).unwrap(),
            r#"{"scope":"b","deadline":10}"#
        );
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = UploadToken::new("ak:sig:policy".into());
        assert_eq!(token.expose(), "ak:sig:policy");
        assert!(!format!("{token:?}").contains("sig"));
    }
}
