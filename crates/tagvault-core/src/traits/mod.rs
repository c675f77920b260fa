// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits at the seams between the core services and their
//! collaborators (persistence and hardware).

pub mod adapter;
pub mod reader;
pub mod store;

pub use adapter::PluginAdapter;
pub use reader::TagReader;
pub use store::CredentialStore;
