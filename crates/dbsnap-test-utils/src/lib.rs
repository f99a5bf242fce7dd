// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for dbsnap integration tests.
//!
//! Provides mock transfer collaborators, a frozen clock, and a harness
//! that seeds a temporary database file, so the services can be exercised
//! without network access.
//!
//! # Components
//!
//! - [`MockUploader`] - records puts, serves queued outcomes
//! - [`MockFetcher`] - serves queued bodies, records requested URLs
//! - [`FixedClock`] - deterministic snapshot names
//! - [`TestHarness`] - temp database file plus matching configuration

pub mod clock;
pub mod harness;
pub mod mock_fetcher;
pub mod mock_uploader;

pub use clock::FixedClock;
pub use harness::{TEST_FILE_SERVER, TestHarness, TestHarnessBuilder};
pub use mock_fetcher::MockFetcher;
pub use mock_uploader::{MockUploader, UploadCall};
