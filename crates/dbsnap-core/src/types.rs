// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result types shared by the services and the trigger surfaces.

use serde::{Deserialize, Serialize};

use crate::error::SnapshotError;

/// Outcome of a backup or restore, as reported to the caller.
///
/// Built exactly once per invocation. Serializes as
/// `{"succeed": bool, "message": string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationResult {
    #[serde(rename = "succeed")]
    pub succeeded: bool,
    pub message: String,
}

impl OperationResult {
    /// A successful outcome with a short description.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    /// A failed outcome rendered from a classified error.
    ///
    /// `scrub` runs over the rendered message before it leaves the process,
    /// so secret values that reached an error string are never echoed back.
    pub fn failure(err: &SnapshotError, scrub: impl Fn(&str) -> String) -> Self {
        Self {
            succeeded: false,
            message: scrub(&err.to_string()),
        }
    }
}

/// What a completed backup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReceipt {
    /// Remote name the snapshot was stored under.
    pub name: String,
    /// Exact number of bytes handed to the uploader.
    pub bytes: u64,
    /// Whether the payload was encrypted.
    pub encrypted: bool,
    /// Upload attempts made (1 when the first attempt succeeded).
    pub attempts: u32,
}

/// What a completed restore wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReceipt {
    /// Snapshot name that was fetched.
    pub name: String,
    /// Bytes written to the local database file.
    pub bytes: u64,
    /// Whether the fetched payload was decrypted.
    pub decrypted: bool,
}
