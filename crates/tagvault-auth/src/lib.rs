// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-factor authentication for Tagvault.
//!
//! A [`Session`] advances from `Unauthenticated` to `PasswordVerified` on a
//! correct password and to `FullyAuthenticated` on a matching tag. Only a
//! fully authenticated session yields the [`SessionContext`] that
//! [`VaultService`] requires.

pub mod context;
pub mod registry;
pub mod service;
pub mod session;
pub mod state;
pub mod vault;

pub use context::SessionContext;
pub use registry::SessionRegistry;
pub use service::{AuthService, LoginOutcome, TokenGrant};
pub use session::Session;
pub use state::AuthState;
pub use vault::{EntryInput, VaultEntry, VaultService};
