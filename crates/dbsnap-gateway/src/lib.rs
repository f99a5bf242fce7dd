// SPDX-FileCopyrightText: 2026 dbsnap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP trigger surface for backup and restore.
//!
//! A single-flight lock shared by both trigger routes keeps backup and
//! restore from running against the database file at the same time.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::AuthConfig;
pub use server::{GatewayState, router, start_server};
