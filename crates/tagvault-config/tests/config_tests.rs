// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Tagvault configuration system.

use tagvault_config::diagnostic::ConfigError;
use tagvault_config::model::TagvaultConfig;
use tagvault_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_document_deserializes() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 8443
log_level = "debug"

[storage]
database_path = "/tmp/tagvault-test.db"
wal_mode = false

[crypto]
scrypt_log_n = 15
scrypt_r = 8
scrypt_p = 2
password_memory_cost = 65536
password_iterations = 3
password_parallelism = 2

[reader]
manufacturer = "Arduino"
serial_number = "ABC123"
baud_rate = 115200
read_timeout_ms = 250
scan_timeout_secs = 10
tag_prefix = "UID:"

[session]
idle_timeout_secs = 300
cookie_secure = true
"#;

    let config = load_and_validate_str(toml).expect("valid document");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8443);
    assert!(!config.storage.wal_mode);
    assert_eq!(config.crypto.scrypt_log_n, 15);
    assert_eq!(config.crypto.password_parallelism, 2);
    assert_eq!(config.reader.serial_number, "ABC123");
    assert_eq!(config.reader.baud_rate, 115200);
    assert_eq!(config.reader.tag_prefix, "UID:");
    assert_eq!(config.session.idle_timeout_secs, 300);
    assert!(config.session.cookie_secure);
}

#[test]
fn empty_document_yields_defaults() {
    let config = load_config_from_str("").unwrap();
    let defaults = TagvaultConfig::default();
    assert_eq!(config.server.port, defaults.server.port);
    assert_eq!(config.reader.baud_rate, 9600);
    assert_eq!(config.reader.tag_prefix, "Card UID:");
    assert_eq!(config.reader.scan_timeout_secs, 30);
    assert_eq!(config.session.idle_timeout_secs, 900);
    assert_eq!(config.crypto.scrypt_log_n, 14);
}

#[test]
fn unknown_key_is_rejected_with_suggestion() {
    let errors = load_and_validate_str("[reader]\nbaud_rte = 9600\n").unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "baud_rte");
            assert_eq!(suggestion.as_deref(), Some("baud_rate"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

#[test]
fn unknown_section_is_rejected() {
    let errors = load_and_validate_str("[telemetry]\nenabled = true\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "telemetry"));
}

#[test]
fn session_secret_cannot_come_from_toml() {
    let errors = load_and_validate_str("[session]\nsecret = \"abc\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "secret"));
}

#[test]
fn wrong_type_is_reported() {
    let errors = load_and_validate_str("[server]\nport = \"eighty\"\n").unwrap_err();
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key.contains("port")));
}

#[test]
fn validation_errors_are_collected() {
    let toml = "[server]\nport = 0\n\n[reader]\ntag_prefix = \"\"\n";
    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert!(
        errors
            .iter()
            .all(|e| matches!(e, ConfigError::Validation { .. }))
    );
}

#[test]
fn explicit_file_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagvault.toml");
    std::fs::write(&path, "[storage]\ndatabase_path = \"/srv/vault.db\"\n").unwrap();
    let config = load_and_validate_path(&path).unwrap();
    assert_eq!(config.storage.database_path, "/srv/vault.db");
}

#[test]
fn unknown_key_in_file_suggests_correction() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagvault.toml");
    std::fs::write(&path, "[session]\nidle_timout_secs = 60\n").unwrap();
    let errors = load_and_validate_path(&path).unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "idle_timout_secs");
            assert_eq!(suggestion.as_deref(), Some("idle_timeout_secs"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
