// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for dbsnap.
//!
//! Holds the error taxonomy every pipeline stage reports through, the
//! strongly-typed operation results handed back to trigger surfaces, and
//! the clock abstraction used for snapshot naming.

pub mod clock;
pub mod error;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{ErrorKind, SnapshotError};
pub use types::{BackupReceipt, OperationResult, RestoreReceipt};
