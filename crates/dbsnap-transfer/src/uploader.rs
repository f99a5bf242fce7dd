// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`SnapshotUploader`] over an [`ObjectStore`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use dbsnap_core::{Clock, SnapshotError};
use tracing::debug;

use crate::traits::{ObjectStore, PutPolicy, SnapshotUploader};

/// Shapes a put request: scope the token to the bucket, then upload once.
pub struct StoreUploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    token_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl StoreUploader {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        token_ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            token_ttl,
            clock,
        }
    }
}

#[async_trait]
impl SnapshotUploader for StoreUploader {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<(), SnapshotError> {
        let now = self.clock.now().with_timezone(&Utc);
        let policy = PutPolicy::for_bucket(&self.bucket, self.token_ttl, now);
        let token = self.store.issue_token(&policy).await?;

        let receipt = self
            .store
            .upload(&token, name, bytes.to_vec(), bytes.len() as u64)
            .await?;
        debug!(key = %receipt.key, hash = ?receipt.hash, "object store accepted snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::{DateTime, Local, TimeZone};
    use dbsnap_core::ErrorKind;

    use crate::traits::{PutReceipt, UploadToken};

    struct FixedClock(DateTime<Local>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Local> {
            self.0
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        policies: Mutex<Vec<PutPolicy>>,
        uploads: Mutex<Vec<(String, String, Vec<u8>, u64)>>,
        fail_upload: bool,
    }

    #[async_trait]
    impl ObjectStore for RecordingStore {
        async fn issue_token(&self, policy: &PutPolicy) -> Result<UploadToken, SnapshotError> {
            self.policies.lock().unwrap().push(policy.clone());
            Ok(UploadToken::new(format!("tok-{}", policy.scope)))
        }

        async fn upload(
            &self,
            token: &UploadToken,
            name: &str,
            body: Vec<u8>,
            len: u64,
        ) -> Result<PutReceipt, SnapshotError> {
            self.uploads.lock().unwrap().push((
                token.expose().to_string(),
                name.to_string(),
                body,
                len,
            ));
            if self.fail_upload {
                return Err(SnapshotError::Upload {
                    message: "rejected".into(),
                    status: Some(503),
                    source: None,
                });
            }
            Ok(PutReceipt {
                key: name.to_string(),
                hash: None,
            })
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock(Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn put_scopes_token_and_uploads_exact_bytes() {
        let store = Arc::new(RecordingStore::default());
        let uploader = StoreUploader::new(store.clone(), "snapshots", Duration::from_secs(60), clock());

        uploader.put("wblog_20240101120000.db", b"DBDATA").await.unwrap();

        let policies = store.policies.lock().unwrap();
        assert_eq!(policies.len(), 1);
        assert_eq!(policies[0].scope, "snapshots");
        let expected_deadline =
            Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap().timestamp() + 60;
        assert_eq!(policies[0].deadline, expected_deadline);

        let uploads = store.uploads.lock().unwrap();
        assert_eq!(
            uploads[0],
            (
                "tok-snapshots".to_string(),
                "wblog_20240101120000.db".to_string(),
                b"DBDATA".to_vec(),
                6
            )
        );
    }

    #[tokio::test]
    async fn failure_is_reported_after_a_single_attempt() {
        let store = Arc::new(RecordingStore {
            fail_upload: true,
            ..RecordingStore::default()
        });
        let uploader = StoreUploader::new(store.clone(), "snapshots", Duration::from_secs(60), clock());

        let err = uploader.put("x.db", b"x").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upload);
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }
}
