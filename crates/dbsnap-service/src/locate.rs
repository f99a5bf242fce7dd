// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolving the database file from the configured connection string.

use std::path::PathBuf;

use dbsnap_core::SnapshotError;
use url::Url;

/// Path component of `dsn`.
///
/// URL-shaped values (`file:///var/lib/wblog.db`, `sqlite:///p?mode=rwc`)
/// yield their percent-decoded path. Values without a scheme
/// (`./data/wblog.db?_loc=Local`) yield the text before any `?`.
pub fn database_path(dsn: &str) -> Result<PathBuf, SnapshotError> {
    let dsn = dsn.trim();
    if dsn.is_empty() {
        return Err(SnapshotError::Config("database.dsn is empty".to_string()));
    }

    let path = match Url::parse(dsn) {
        Ok(url) => urlencoding::decode(url.path())
            .map_err(|_| {
                SnapshotError::Config("database.dsn path is not valid UTF-8".to_string())
            })?
            .into_owned(),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            dsn.split('?').next().unwrap_or_default().to_string()
        }
        Err(e) => {
            return Err(SnapshotError::Config(format!(
                "database.dsn does not parse: {e}"
            )));
        }
    };

    if path.is_empty() {
        return Err(SnapshotError::Config(
            "database.dsn has no file path".to_string(),
        ));
    }
    Ok(PathBuf::from(path))
}
