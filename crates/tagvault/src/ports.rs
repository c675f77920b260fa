// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagvault ports`: enumerate serial ports for the reader allow-list.

use tagvault_core::TagvaultError;

pub fn run_ports() -> Result<(), TagvaultError> {
    let ports = tagvault_reader::list_ports()?;
    if ports.is_empty() {
        println!("no serial ports found");
        return Ok(());
    }
    for port in &ports {
        println!("{port}");
    }
    Ok(())
}
