// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for Tagvault.
//!
//! TOML files and `TAGVAULT_*` environment variables are merged with figment,
//! unknown keys are rejected, and failures are reported as miette
//! diagnostics with typo suggestions.
//!
//! ```no_run
//! use tagvault_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("listening on {}:{}", config.server.host, config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod secret;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{
    CryptoConfig, ReaderConfig, ServerConfig, SessionConfig, StorageConfig, TagvaultConfig,
};
pub use secret::{SESSION_SECRET_ENV_VAR, load_session_secret};

/// Load from the file hierarchy and environment, then validate.
pub fn load_and_validate() -> Result<TagvaultConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load from one explicit file (plus environment), then validate.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<TagvaultConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load from an inline TOML string, then validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<TagvaultConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<TagvaultConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TagvaultConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Contents of every config file that exists, keyed by the path figment reports.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_file_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let shown = if path.is_relative() {
                std::env::current_dir()
                    .map(|dir| dir.join(&path))
                    .unwrap_or(path)
            } else {
                path
            };
            Some((shown.display().to_string(), content))
        })
        .collect()
}
