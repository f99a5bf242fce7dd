// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reading the live database file for a backup.
//!
//! Blocking; call from `spawn_blocking`.

use std::path::Path;
use std::time::Duration;

use dbsnap_config::model::ReadMode;
use dbsnap_core::SnapshotError;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

/// Read the whole database file according to `mode`.
pub fn read_database(path: &Path, mode: ReadMode) -> Result<Vec<u8>, SnapshotError> {
    if !path.is_file() {
        return Err(SnapshotError::local_io(
            "database file does not exist",
            std::io::Error::from(std::io::ErrorKind::NotFound),
        ));
    }
    match mode {
        ReadMode::Raw => std::fs::read(path)
            .map_err(|e| SnapshotError::local_io("failed to read database file", e)),
        ReadMode::SqliteOnline => read_online(path),
    }
}

/// Copy through SQLite's online backup API into a temp file, then read that.
///
/// The source is opened read-only and copied 100 pages per step, so other
/// connections keep writing while the copy runs.
fn read_online(path: &Path) -> Result<Vec<u8>, SnapshotError> {
    let sqlite_err = |context: &'static str| {
        move |e: rusqlite::Error| SnapshotError::local_io(context, std::io::Error::other(e))
    };

    let src = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(sqlite_err("failed to open database for online backup"))?;

    let scratch = tempfile::NamedTempFile::new()
        .map_err(|e| SnapshotError::local_io("failed to create backup scratch file", e))?;
    let mut dst = Connection::open(scratch.path())
        .map_err(sqlite_err("failed to open backup scratch file"))?;

    {
        let backup = rusqlite::backup::Backup::new(&src, &mut dst)
            .map_err(sqlite_err("failed to start online backup"))?;
        backup
            .run_to_completion(100, Duration::from_millis(10), None)
            .map_err(sqlite_err("online backup failed"))?;
    }
    drop(dst);

    let bytes = std::fs::read(scratch.path())
        .map_err(|e| SnapshotError::local_io("failed to read backup scratch file", e))?;
    debug!(bytes = bytes.len(), "online backup copied");
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsnap_core::ErrorKind;

    #[test]
    fn raw_read_returns_exact_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wblog.db");
        std::fs::write(&path, b"DBDATA").unwrap();
        assert_eq!(read_database(&path, ReadMode::Raw).unwrap(), b"DBDATA");
    }

    #[test]
    fn empty_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wblog.db");
        std::fs::write(&path, b"").unwrap();
        assert!(read_database(&path, ReadMode::Raw).unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_local_io_without_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let err = read_database(&path, ReadMode::Raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalIo);
        assert!(!err.to_string().contains("missing.db"));
    }

    #[test]
    fn directory_is_not_a_database_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_database(dir.path(), ReadMode::Raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LocalIo);
    }

    #[test]
    fn online_read_produces_openable_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wblog.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE posts (id INTEGER PRIMARY KEY, title TEXT);
             INSERT INTO posts VALUES (1, 'hello');
             INSERT INTO posts VALUES (2, 'world');",
        )
        .unwrap();

        // Writer connection stays open during the copy.
        let bytes = read_database(&path, ReadMode::SqliteOnline).unwrap();
        drop(conn);

        let copy = dir.path().join("copy.db");
        std::fs::write(&copy, &bytes).unwrap();
        let copy_conn = Connection::open(&copy).unwrap();
        let count: i64 = copy_conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }
}
