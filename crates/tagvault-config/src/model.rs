// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! startup instead of silently falling back to a default.

use serde::{Deserialize, Serialize};

/// Top-level Tagvault configuration.
///
/// Every section is optional and defaults to values that run against the
/// reference RFID reader on a local machine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TagvaultConfig {
    /// HTTP listener and logging.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite credential store.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Password hashing and key wrapping costs.
    #[serde(default)]
    pub crypto: CryptoConfig,

    /// Serial tag reader allow-list and protocol.
    #[serde(default)]
    pub reader: ReaderConfig,

    /// Login session lifetime and cookie flags.
    #[serde(default)]
    pub session: SessionConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tagvault").join("vault.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("vault.db"))
        .display()
        .to_string()
}

fn default_wal_mode() -> bool {
    true
}

/// Cost parameters for the password hash and the wrapping-key KDF.
///
/// Only new registrations and password changes use these values; each
/// stored identity keeps the scrypt parameters it was wrapped with.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CryptoConfig {
    /// scrypt log2(N) (default: 14).
    #[serde(default = "default_scrypt_log_n")]
    pub scrypt_log_n: u8,

    /// scrypt block size r (default: 8).
    #[serde(default = "default_scrypt_r")]
    pub scrypt_r: u32,

    /// scrypt parallelism p (default: 1).
    #[serde(default = "default_scrypt_p")]
    pub scrypt_p: u32,

    /// Argon2id memory cost in KiB for the password hash (default: 19456).
    #[serde(default = "default_password_memory_cost")]
    pub password_memory_cost: u32,

    /// Argon2id iterations for the password hash (default: 2).
    #[serde(default = "default_password_iterations")]
    pub password_iterations: u32,

    /// Argon2id lanes for the password hash (default: 1).
    #[serde(default = "default_password_parallelism")]
    pub password_parallelism: u32,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            scrypt_log_n: default_scrypt_log_n(),
            scrypt_r: default_scrypt_r(),
            scrypt_p: default_scrypt_p(),
            password_memory_cost: default_password_memory_cost(),
            password_iterations: default_password_iterations(),
            password_parallelism: default_password_parallelism(),
        }
    }
}

fn default_scrypt_log_n() -> u8 {
    14
}

fn default_scrypt_r() -> u32 {
    8
}

fn default_scrypt_p() -> u32 {
    1
}

fn default_password_memory_cost() -> u32 {
    19456
}

fn default_password_iterations() -> u32 {
    2
}

fn default_password_parallelism() -> u32 {
    1
}

/// Serial tag reader configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ReaderConfig {
    /// Substring the USB manufacturer string must contain.
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,

    /// Substring the USB serial number must contain.
    #[serde(default = "default_serial_number")]
    pub serial_number: String,

    /// Serial line speed.
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// Per-read timeout in milliseconds.
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    /// How long one scan waits for a tag, in seconds.
    #[serde(default = "default_scan_timeout_secs")]
    pub scan_timeout_secs: u64,

    /// Literal prefix of a tag-report line.
    #[serde(default = "default_tag_prefix")]
    pub tag_prefix: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            manufacturer: default_manufacturer(),
            serial_number: default_serial_number(),
            baud_rate: default_baud_rate(),
            read_timeout_ms: default_read_timeout_ms(),
            scan_timeout_secs: default_scan_timeout_secs(),
            tag_prefix: default_tag_prefix(),
        }
    }
}

fn default_manufacturer() -> String {
    "Arduino".to_string()
}

fn default_serial_number() -> String {
    "5573532373535151D062".to_string()
}

fn default_baud_rate() -> u32 {
    9600
}

fn default_read_timeout_ms() -> u64 {
    1000
}

fn default_scan_timeout_secs() -> u64 {
    30
}

fn default_tag_prefix() -> String {
    "Card UID:".to_string()
}

/// Login session configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Sessions idle for longer than this are discarded (default: 900).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Set the `Secure` attribute on the session cookie.
    #[serde(default)]
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
            cookie_secure: false,
        }
    }
}

fn default_idle_timeout_secs() -> u64 {
    900
}
