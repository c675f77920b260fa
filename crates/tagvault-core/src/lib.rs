// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Tagvault.
//!
//! Holds the error taxonomy, the record types that cross crate boundaries,
//! and the adapter traits for persistence and the tag reader.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{AuthError, HardwareError, TagvaultError};
pub use traits::{CredentialStore, PluginAdapter, TagReader};
pub use types::{AdapterType, HealthStatus, ScanOutcome, UserId};
