// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tag reader trait for the token factor.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TagvaultError;
use crate::traits::adapter::PluginAdapter;
use crate::types::ScanOutcome;

/// A source of tag identifiers.
///
/// Implementations must serialize concurrent scans: only one scan may hold
/// the device at a time.
#[async_trait]
pub trait TagReader: PluginAdapter {
    /// Wait up to `timeout` for a tag report.
    ///
    /// Returns `Err(TagvaultError::Hardware(UnauthorizedOrAbsent))` when no
    /// authorized device is attached. Timeouts and read failures are
    /// reported through [`ScanOutcome`].
    async fn scan(&self, timeout: Duration) -> Result<ScanOutcome, TagvaultError>;
}
