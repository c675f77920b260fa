// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed statements, one module per table.

pub mod entries;
pub mod identities;
pub mod tokens;
