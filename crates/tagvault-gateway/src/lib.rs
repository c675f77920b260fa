// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON HTTP gateway for Tagvault.
//!
//! Every response body carries `success`; failures add `message`. The
//! session travels in a signed `tagvault_session` cookie.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::{SESSION_COOKIE, SessionCookies, SessionId};
pub use error::ApiError;
pub use server::{AppState, build_router, serve, shutdown_signal};
