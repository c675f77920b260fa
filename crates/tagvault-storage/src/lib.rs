// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite credential store for Tagvault.
//!
//! WAL-mode SQLite with embedded refinery migrations. All statements go
//! through a single `tokio-rusqlite` connection thread.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStore;
pub use database::Database;
