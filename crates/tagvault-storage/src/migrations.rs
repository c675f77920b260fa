// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! The SQL under `migrations/` is compiled into the binary and applied on
//! every open. refinery records progress in `refinery_schema_history`.

use tagvault_core::TagvaultError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), TagvaultError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(TagvaultError::storage)?;
    for migration in report.applied_migrations() {
        tracing::info!(version = migration.version(), name = migration.name(), "applied migration");
    }
    Ok(())
}
