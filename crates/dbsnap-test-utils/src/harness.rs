// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness: a temporary database file plus a configuration that
//! points the services at it.
//!
//! The generated configuration passes every policy gate, uses the
//! cheapest KDF parameters the codec accepts, and retries without delay.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dbsnap_config::DbsnapConfig;
use dbsnap_config::model::SUPPORTED_DIALECT;
use dbsnap_core::SnapshotError;

/// Trusted file server used by every harness configuration.
pub const TEST_FILE_SERVER: &str = "https://files.example.com/backups";

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    contents: Option<Vec<u8>>,
    backup_key: String,
    max_attempts: u32,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            contents: Some(b"DBDATA".to_vec()),
            backup_key: String::new(),
            max_attempts: 1,
        }
    }

    /// Initial database file contents (default `b"DBDATA"`).
    pub fn with_db_contents(mut self, contents: &[u8]) -> Self {
        self.contents = Some(contents.to_vec());
        self
    }

    /// Do not create the database file.
    pub fn without_db_file(mut self) -> Self {
        self.contents = None;
        self
    }

    /// Encrypt snapshots with `key`.
    pub fn with_backup_key(mut self, key: &str) -> Self {
        self.backup_key = key.to_string();
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn build(self) -> Result<TestHarness, SnapshotError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| SnapshotError::local_io("failed to create temp dir", e))?;
        let db_path = temp_dir.path().join("wblog.db");
        if let Some(contents) = &self.contents {
            std::fs::write(&db_path, contents)
                .map_err(|e| SnapshotError::local_io("failed to seed database file", e))?;
        }

        let mut config = DbsnapConfig::default();
        config.database.dialect = SUPPORTED_DIALECT.to_string();
        config.database.dsn = db_path.to_string_lossy().into_owned();

        config.backup.enabled = true;
        config.backup.backup_key = self.backup_key;
        config.backup.max_attempts = self.max_attempts;
        config.backup.initial_backoff_ms = 0;
        config.backup.max_backoff_ms = 0;
        config.backup.kdf_memory_cost = 64;
        config.backup.kdf_iterations = 1;
        config.backup.kdf_parallelism = 1;

        config.remote.enabled = true;
        config.remote.access_key = "test-access-key".to_string();
        config.remote.secret_key = "test-secret-key".to_string();
        config.remote.bucket = "snapshots".to_string();
        config.remote.file_server = TEST_FILE_SERVER.to_string();

        config.gateway.bearer_token = "test-gateway-token".to_string();

        Ok(TestHarness {
            config,
            db_path,
            _temp_dir: temp_dir,
        })
    }
}

/// A temporary database directory and a matching configuration.
pub struct TestHarness {
    /// Configuration pointing at [`TestHarness::db_path`]. Tests may
    /// mutate it before calling [`TestHarness::config_arc`].
    pub config: DbsnapConfig,
    db_path: PathBuf,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Current database file contents.
    ///
    /// # Panics
    /// If the file cannot be read.
    pub fn db_contents(&self) -> Vec<u8> {
        std::fs::read(&self.db_path).expect("read harness database file")
    }

    pub fn config_arc(&self) -> Arc<DbsnapConfig> {
        Arc::new(self.config.clone())
    }
}
