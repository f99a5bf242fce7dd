// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Moving snapshot bytes across the network boundary.
//!
//! The services depend only on the [`SnapshotFetcher`] and
//! [`SnapshotUploader`] traits. [`HttpSnapshotFetcher`] and
//! [`StoreUploader`] over [`FormUploadStore`] are the production
//! implementations.

pub mod fetch;
pub mod form_upload;
pub mod traits;
pub mod uploader;

pub use fetch::HttpSnapshotFetcher;
pub use form_upload::FormUploadStore;
pub use traits::{
    ObjectStore, PutPolicy, PutReceipt, SnapshotFetcher, SnapshotUploader, UploadToken,
};
pub use uploader::StoreUploader;
