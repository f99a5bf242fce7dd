// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seams between the services and the network.

pub mod fetcher;
pub mod store;
pub mod uploader;

pub use fetcher::SnapshotFetcher;
pub use store::{ObjectStore, PutPolicy, PutReceipt, UploadToken};
pub use uploader::SnapshotUploader;
