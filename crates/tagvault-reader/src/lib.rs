// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serial RFID tag reader for Tagvault.
//!
//! Discovers the authorized reader by USB manufacturer and serial number,
//! then reads `Card UID:` lines from it within a bounded window.

pub mod discovery;
pub mod handle;
pub mod protocol;

pub use discovery::{AllowList, PortSummary, list_ports};
pub use handle::{SerialBackend, SystemSerial, TagReaderHandle};
