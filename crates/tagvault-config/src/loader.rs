// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading.
//!
//! Lookup order, lowest precedence first: compiled defaults,
//! `/etc/tagvault/tagvault.toml`, `$XDG_CONFIG_HOME/tagvault/tagvault.toml`,
//! `./tagvault.toml`, then `TAGVAULT_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TagvaultConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "TAGVAULT_";

/// Environment keys under [`ENV_PREFIX`] that are not configuration fields.
const NON_CONFIG_ENV_KEYS: &[&str] = &["session_secret"];

/// Top-level sections, used to turn `TAGVAULT_READER_BAUD_RATE` into `reader.baud_rate`.
const SECTIONS: &[&str] = &["server", "storage", "crypto", "reader", "session"];

/// Candidate config files in merge order.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/tagvault/tagvault.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tagvault").join("tagvault.toml"));
    }
    paths.push(PathBuf::from("tagvault.toml"));
    paths
}

/// Load configuration from the standard file hierarchy with env overrides.
pub fn load_config() -> Result<TagvaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from an inline TOML document only.
pub fn load_config_from_str(toml_content: &str) -> Result<TagvaultConfig, figment::Error> {
    defaults().merge(Toml::string(toml_content)).extract()
}

/// Load configuration from one explicit file, still honouring env overrides.
pub fn load_config_from_path(path: &Path) -> Result<TagvaultConfig, figment::Error> {
    defaults()
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// The figment behind [`load_config`], before extraction.
pub fn build_figment() -> Figment {
    config_file_paths()
        .into_iter()
        .fold(defaults(), |figment, path| figment.merge(Toml::file(path)))
        .merge(env_provider())
}

fn defaults() -> Figment {
    Figment::new().merge(Serialized::defaults(TagvaultConfig::default()))
}

/// Map `TAGVAULT_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// figment hands the key over in its original case, so it is lowercased
/// before matching. Only the first underscore after a known section name becomes a dot, so
/// `TAGVAULT_READER_READ_TIMEOUT_MS` lands on `reader.read_timeout_ms`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .ignore(NON_CONFIG_ENV_KEYS)
        .map(|key| {
            let key = key.as_str().to_ascii_lowercase();
            SECTIONS
                .iter()
                .find_map(|section| {
                    key.strip_prefix(section)
                        .and_then(|rest| rest.strip_prefix('_'))
                        .map(|field| format!("{section}.{field}"))
                })
                .unwrap_or(key)
                .into()
        })
}
