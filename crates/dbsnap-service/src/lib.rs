// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Backup and restore orchestration.
//!
//! [`BackupService`] and [`RestoreService`] are the only entry points.
//! Each takes its configuration and transfer collaborators at
//! construction and runs a short linear pipeline per call. Callers must
//! not run two operations against the same database file at once; the
//! gateway serializes them with a single-flight lock.

pub mod backup;
pub mod codec;
pub mod locate;
pub mod naming;
pub mod persist;
pub mod policy;
pub mod read;
pub mod restore;
pub mod retry;

pub use backup::BackupService;
pub use locate::database_path;
pub use policy::check_policy;
pub use restore::RestoreService;
pub use retry::RetryPolicy;
