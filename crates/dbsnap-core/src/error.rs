// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the snapshot transfer pipeline.

use thiserror::Error;

/// The single error type returned by every pipeline stage.
///
/// Each variant corresponds to one failure class; see [`ErrorKind`]. The
/// `Display` output of every variant is safe to return to the triggering
/// surface: none of them embed key material or credentials.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Unsupported dialect, disabled feature, malformed or insecure trusted URL.
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing, malformed, or path-traversing caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Local database file missing, unreadable, or unwritable.
    #[error("local I/O error: {context}: {source}")]
    LocalIo {
        context: String,
        source: std::io::Error,
    },

    /// Key length mismatch, corrupted envelope, or failed authentication tag.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// DNS, connect, timeout, or body read failure reaching the fetch endpoint.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The fetch endpoint answered with a non-success status.
    #[error("remote server returned {status}")]
    RemoteStatus { status: u16 },

    /// The object-storage collaborator reported a failed upload.
    #[error("upload error: {message}")]
    Upload {
        message: String,
        status: Option<u16>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors (e.g. a panicked blocking task).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Classification of a [`SnapshotError`], independent of its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Validation,
    LocalIo,
    Crypto,
    Transport,
    RemoteStatus,
    Upload,
    Internal,
}

impl SnapshotError {
    /// Shorthand for a [`SnapshotError::LocalIo`] with context.
    pub fn local_io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::LocalIo {
            context: context.into(),
            source,
        }
    }

    /// Shorthand for a [`SnapshotError::Transport`] with a boxed source.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Validation(_) => ErrorKind::Validation,
            Self::LocalIo { .. } => ErrorKind::LocalIo,
            Self::Crypto(_) => ErrorKind::Crypto,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::RemoteStatus { .. } => ErrorKind::RemoteStatus,
            Self::Upload { .. } => ErrorKind::Upload,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether a higher layer may reasonably retry the failed call.
    ///
    /// Only network-level failures qualify. An upload rejected with a 4xx
    /// status other than 429 is treated as permanent.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Upload { status, .. } => match status {
                Some(code) => *code == 429 || *code >= 500,
                None => true,
            },
            _ => false,
        }
    }
}
