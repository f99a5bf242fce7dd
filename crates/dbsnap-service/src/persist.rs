// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Atomic replacement of the local database file.
//!
//! The restored bytes go to a temp file in the target's directory, are
//! synced, optionally checked with SQLite, and only then renamed over the
//! target. An interrupted restore leaves the previous file in place.
//! The previous file's `-wal`/`-shm` sidecars are removed after the swap
//! so SQLite cannot replay them over the restored pages.
//! Blocking; call from `spawn_blocking`.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

use dbsnap_config::model::RestoreConfig;
use dbsnap_core::SnapshotError;
use rusqlite::{Connection, OpenFlags};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Suffix of the safety copy taken before a restore.
pub const PRE_RESTORE_SUFFIX: &str = ".pre-restore";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistOptions {
    /// Copy the current file to `<target>.pre-restore` before the swap.
    pub keep_pre_restore_copy: bool,
    /// Require the new bytes to open as a healthy SQLite database.
    pub verify_sqlite: bool,
}

impl From<&RestoreConfig> for PersistOptions {
    fn from(restore: &RestoreConfig) -> Self {
        Self {
            keep_pre_restore_copy: restore.keep_pre_restore_copy,
            verify_sqlite: restore.verify_sqlite,
        }
    }
}

/// SQLite sidecar files that belong to a database in WAL mode.
const SIDECAR_SUFFIXES: [&str; 2] = ["-wal", "-shm"];

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// `<target>.pre-restore`
pub fn pre_restore_path(target: &Path) -> PathBuf {
    with_suffix(target, PRE_RESTORE_SUFFIX)
}

/// Replace `target` with `bytes`. Returns only after the rename succeeded.
pub fn persist_atomically(
    target: &Path,
    bytes: &[u8],
    options: PersistOptions,
) -> Result<(), SnapshotError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
        SnapshotError::local_io("failed to create temporary file beside the database", e)
    })?;
    tmp.write_all(bytes)
        .map_err(|e| SnapshotError::local_io("failed to write restored snapshot", e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| SnapshotError::local_io("failed to sync restored snapshot", e))?;

    if let Ok(existing) = std::fs::metadata(target) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .map_err(|e| SnapshotError::local_io("failed to copy database permissions", e))?;
    }

    if options.verify_sqlite {
        verify_sqlite(tmp.path())?;
    }

    if options.keep_pre_restore_copy && target.is_file() {
        let safety = pre_restore_path(target);
        std::fs::copy(target, &safety)
            .map_err(|e| SnapshotError::local_io("failed to write pre-restore copy", e))?;
        // Uncheckpointed pages live in the WAL; the copy is incomplete without it.
        let wal = with_suffix(target, "-wal");
        if wal.is_file() {
            std::fs::copy(&wal, with_suffix(&safety, "-wal"))
                .map_err(|e| SnapshotError::local_io("failed to write pre-restore copy", e))?;
        }
        info!(path = %safety.display(), "pre-restore safety copy written");
    }

    tmp.persist(target).map_err(|e| {
        SnapshotError::local_io("failed to move restored database into place", e.error)
    })?;
    remove_stale_sidecars(target)?;
    debug!(path = %target.display(), bytes = bytes.len(), "database file replaced");
    Ok(())
}

fn remove_stale_sidecars(target: &Path) -> Result<(), SnapshotError> {
    for suffix in SIDECAR_SUFFIXES {
        let sidecar = with_suffix(target, suffix);
        match std::fs::remove_file(&sidecar) {
            Ok(()) => debug!(path = %sidecar.display(), "removed stale sidecar"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SnapshotError::local_io(
                    format!("failed to remove stale {suffix} file"),
                    e,
                ));
            }
        }
    }
    Ok(())
}

/// Open `path` read-only and run SQLite's quick integrity check.
fn verify_sqlite(path: &Path) -> Result<(), SnapshotError> {
    let failed = |e: rusqlite::Error| {
        SnapshotError::local_io(
            "restored snapshot is not a valid SQLite database",
            std::io::Error::other(e),
        )
    };
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY).map_err(failed)?;
    let verdict: String = conn
        .query_row("PRAGMA quick_check", [], |row| row.get(0))
        .map_err(failed)?;
    if verdict != "ok" {
        return Err(SnapshotError::local_io(
            "restored snapshot failed SQLite integrity check",
            std::io::Error::other(verdict),
        ));
    }
    Ok(())
}
