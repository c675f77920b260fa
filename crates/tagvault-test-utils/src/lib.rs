// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tagvault integration tests.
//!
//! - [`MockTagReader`] - tag reader with scripted scan outcomes
//! - [`TestHarness`] - the full gateway over an in-memory store

pub mod harness;
pub mod mock_reader;

pub use harness::{TestHarness, TestResponse, fast_crypto};
pub use mock_reader::MockTagReader;
