// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Semantic checks run after deserialization.

use crate::diagnostic::ConfigError;
use crate::model::TagvaultConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first.
pub fn validate_config(config: &TagvaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must not be 0"));
    }

    if !LOG_LEVELS.contains(&config.server.log_level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "server.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.server.log_level
        )));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    let crypto = &config.crypto;
    if !(10..=20).contains(&crypto.scrypt_log_n) {
        errors.push(ConfigError::validation(format!(
            "crypto.scrypt_log_n must be between 10 and 20, got {}",
            crypto.scrypt_log_n
        )));
    }
    if crypto.scrypt_r == 0 || crypto.scrypt_p == 0 {
        errors.push(ConfigError::validation(
            "crypto.scrypt_r and crypto.scrypt_p must be at least 1",
        ));
    }
    if crypto.password_memory_cost < 19456 {
        errors.push(ConfigError::validation(format!(
            "crypto.password_memory_cost must be at least 19456 (19 MiB), got {}",
            crypto.password_memory_cost
        )));
    }
    if crypto.password_iterations < 2 {
        errors.push(ConfigError::validation(format!(
            "crypto.password_iterations must be at least 2, got {}",
            crypto.password_iterations
        )));
    }
    if crypto.password_parallelism < 1 {
        errors.push(ConfigError::validation(
            "crypto.password_parallelism must be at least 1",
        ));
    }

    let reader = &config.reader;
    if reader.manufacturer.trim().is_empty() {
        errors.push(ConfigError::validation(
            "reader.manufacturer must not be empty",
        ));
    }
    if reader.serial_number.trim().is_empty() {
        errors.push(ConfigError::validation(
            "reader.serial_number must not be empty",
        ));
    }
    if reader.baud_rate == 0 {
        errors.push(ConfigError::validation("reader.baud_rate must not be 0"));
    }
    if !(10..=10_000).contains(&reader.read_timeout_ms) {
        errors.push(ConfigError::validation(format!(
            "reader.read_timeout_ms must be between 10 and 10000, got {}",
            reader.read_timeout_ms
        )));
    }
    if !(1..=300).contains(&reader.scan_timeout_secs) {
        errors.push(ConfigError::validation(format!(
            "reader.scan_timeout_secs must be between 1 and 300, got {}",
            reader.scan_timeout_secs
        )));
    }
    if reader.tag_prefix.is_empty() {
        errors.push(ConfigError::validation("reader.tag_prefix must not be empty"));
    }

    if config.session.idle_timeout_secs < 30 {
        errors.push(ConfigError::validation(format!(
            "session.idle_timeout_secs must be at least 30, got {}",
            config.session.idle_timeout_secs
        )));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
