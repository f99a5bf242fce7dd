// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Form-upload object storage client.
//!
//! Upload tokens are `access_key:sign:encoded_policy`, where
//! `encoded_policy` is the URL-safe base64 of the JSON put policy and
//! `sign` is the URL-safe base64 HMAC-SHA1 of `encoded_policy` under the
//! secret key. The upload itself is a multipart POST with `token`, `key`
//! and `file` fields.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use dbsnap_config::model::RemoteConfig;
use dbsnap_core::SnapshotError;
use hmac::{Hmac, Mac};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha1::Sha1;
use tracing::{debug, warn};
use url::Url;

use crate::traits::{ObjectStore, PutPolicy, PutReceipt, UploadToken};

type HmacSha1 = Hmac<Sha1>;

/// Success body of the upload endpoint.
#[derive(Debug, Deserialize)]
struct UploadResponse {
    key: Option<String>,
    hash: Option<String>,
}

/// Error body of the upload endpoint.
#[derive(Debug, Deserialize)]
struct UploadErrorResponse {
    error: String,
}

/// [`ObjectStore`] speaking the form-upload protocol.
#[derive(Clone)]
pub struct FormUploadStore {
    client: reqwest::Client,
    upload_url: Url,
    access_key: String,
    secret_key: SecretString,
    timeout: Duration,
}

impl fmt::Debug for FormUploadStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormUploadStore")
            .field("upload_url", &self.upload_url.as_str())
            .field("access_key", &"[redacted]")
            .field("secret_key", &"[redacted]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FormUploadStore {
    pub fn new(client: reqwest::Client, remote: &RemoteConfig) -> Result<Self, SnapshotError> {
        let upload_url = Url::parse(&remote.upload_url)
            .map_err(|e| SnapshotError::Config(format!("invalid remote.upload_url: {e}")))?;
        Ok(Self {
            client,
            upload_url,
            access_key: remote.access_key.clone(),
            secret_key: SecretString::from(remote.secret_key.clone()),
            timeout: Duration::from_secs(remote.upload_timeout_secs),
        })
    }

    /// Sign a put policy into an upload token. Pure; no network.
    pub fn sign_policy(&self, policy: &PutPolicy) -> Result<UploadToken, SnapshotError> {
        if self.access_key.is_empty() || self.secret_key.expose_secret().is_empty() {
            return Err(SnapshotError::Config(
                "remote storage credentials are not configured".to_string(),
            ));
        }
        let policy_json = serde_json::to_vec(policy)
            .map_err(|e| SnapshotError::Internal(format!("failed to encode put policy: {e}")))?;
        let encoded_policy = URL_SAFE.encode(policy_json);

        let mut mac = HmacSha1::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .map_err(|_| SnapshotError::Config("invalid remote secret key".to_string()))?;
        mac.update(encoded_policy.as_bytes());
        let sign = URL_SAFE.encode(mac.finalize().into_bytes());

        Ok(UploadToken::new(format!(
            "{}:{sign}:{encoded_policy}",
            self.access_key
        )))
    }
}

#[async_trait]
impl ObjectStore for FormUploadStore {
    async fn issue_token(&self, policy: &PutPolicy) -> Result<UploadToken, SnapshotError> {
        self.sign_policy(policy)
    }

    async fn upload(
        &self,
        token: &UploadToken,
        name: &str,
        body: Vec<u8>,
        len: u64,
    ) -> Result<PutReceipt, SnapshotError> {
        if body.len() as u64 != len {
            return Err(SnapshotError::Internal(format!(
                "upload length mismatch: declared {len}, have {}",
                body.len()
            )));
        }

        let file = Part::stream_with_length(body, len)
            .file_name(name.to_string())
            .mime_str("application/octet-stream")
            .map_err(|e| SnapshotError::Internal(format!("invalid upload part: {e}")))?;
        let form = Form::new()
            .text("token", token.expose().to_string())
            .text("key", name.to_string())
            .part("file", file);

        debug!(name, len, "uploading snapshot");
        let response = self
            .client
            .post(self.upload_url.clone())
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("upload timed out after {}s", self.timeout.as_secs())
                } else {
                    "upload request failed".to_string()
                };
                SnapshotError::Upload {
                    message,
                    status: None,
                    source: Some(Box::new(e.without_url())),
                }
            })?;

        let status = response.status();
        // Key and hash are optional extras; an unreadable body only loses them.
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!(status = status.as_u16(), error = %e, "failed to read upload response body");
                String::new()
            }
        };

        if !status.is_success() {
            let detail = serde_json::from_str::<UploadErrorResponse>(&text)
                .map(|r| r.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
            warn!(status = status.as_u16(), detail = %detail, "object store rejected upload");
            return Err(SnapshotError::Upload {
                message: format!("object store returned {}: {detail}", status.as_u16()),
                status: Some(status.as_u16()),
                source: None,
            });
        }

        let parsed = serde_json::from_str::<UploadResponse>(&text).ok();
        Ok(PutReceipt {
            key: parsed
                .as_ref()
                .and_then(|r| r.key.clone())
                .unwrap_or_else(|| name.to_string()),
            hash: parsed.and_then(|r| r.hash),
        })
    }
}
