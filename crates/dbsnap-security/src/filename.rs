// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation of caller-supplied snapshot file names.
//!
//! A name is usable only if it passes both the character-class check and
//! the base-name self-equality check. [`LeafName`] can only be constructed
//! through both, so holding one proves the name is a bare leaf.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use dbsnap_core::SnapshotError;
use regex::Regex;

/// ASCII letters, digits, `.`, `-`, `_`; at least one character.
static FILENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("static filename pattern"));

/// Whether `name` consists only of the allowed filename characters.
pub fn is_valid_filename(name: &str) -> bool {
    FILENAME_PATTERN.is_match(name)
}

/// Whether the last path segment of `name` is `name` itself.
///
/// Rejects any embedded separator and the `.`/`..` segments, independently
/// of the character class.
pub fn is_base_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|base| base == name)
}

/// A validated snapshot file name with no directory components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LeafName(String);

impl LeafName {
    /// Validate untrusted input. Performs no I/O.
    pub fn parse(name: &str) -> Result<Self, SnapshotError> {
        if name.is_empty() {
            return Err(SnapshotError::Validation(
                "fileName cannot be empty".to_string(),
            ));
        }
        if !is_valid_filename(name) {
            return Err(SnapshotError::Validation(
                "invalid fileName format: only alphanumeric, ., -, _ are allowed".to_string(),
            ));
        }
        if !is_base_name(name) {
            return Err(SnapshotError::Validation(
                "invalid fileName: path traversal is not allowed".to_string(),
            ));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LeafName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LeafName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
