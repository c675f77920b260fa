// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tagvault config`: print the effective configuration as TOML.

use tagvault_config::{SESSION_SECRET_ENV_VAR, TagvaultConfig};
use tagvault_core::TagvaultError;

/// The effective configuration followed by the session secret's status.
/// The secret itself is never printed.
pub fn render_config(config: &TagvaultConfig, secret_present: bool) -> Result<String, TagvaultError> {
    let body = toml::to_string_pretty(config)
        .map_err(|e| TagvaultError::Internal(format!("failed to serialize config: {e}")))?;
    let secret = if secret_present { "set" } else { "missing" };
    Ok(format!("{body}\n# {SESSION_SECRET_ENV_VAR}: {secret} (value redacted)\n"))
}

pub fn run_config(config: &TagvaultConfig) -> Result<(), TagvaultError> {
    let present = std::env::var_os(SESSION_SECRET_ENV_VAR).is_some();
    print!("{}", render_config(config, present)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_has_every_section() {
        let out = render_config(&TagvaultConfig::default(), false).unwrap();
        for section in ["[server]", "[storage]", "[crypto]", "[reader]", "[session]"] {
            assert!(out.contains(section), "missing {section}");
        }
        assert!(out.contains("TAGVAULT_SESSION_SECRET: missing"));
    }

    #[test]
    fn rendered_config_parses_back() {
        let out = render_config(&TagvaultConfig::default(), true).unwrap();
        let reparsed = tagvault_config::load_and_validate_str(&out).unwrap();
        assert_eq!(reparsed.server.port, 5001);
        assert_eq!(reparsed.reader.tag_prefix, "Card UID:");
    }
}
