// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot encryption for dbsnap.
//!
//! AES-256-GCM (via `ring`) with an Argon2id-derived key. [`SnapshotCodec`]
//! is what the services use; [`crypto`] and [`kdf`] are the raw building
//! blocks and validate key sizes themselves.

pub mod crypto;
pub mod envelope;
pub mod kdf;

pub use envelope::SnapshotCodec;
pub use kdf::KdfParams;
