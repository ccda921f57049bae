// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration system for Tomahawk account plugins.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, miette diagnostics
//! with typo suggestions, and the persisted account id list.
//!
//! # Usage
//!
//! ```no_run
//! use tomahawk_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("retry delay: {}s", config.accounts.retry_delay_secs);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod store;
pub mod validation;

use std::path::Path;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{config_file_candidates, load_config, load_config_from_path, load_config_from_str};
pub use model::TomahawkConfig;
pub use store::{AccountStore, MemoryAccountStore, TomlAccountStore};

/// Load configuration from the XDG hierarchy and validate it.
pub fn load_and_validate() -> Result<TomahawkConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Load configuration from a specific file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<TomahawkConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        std::fs::read_to_string(path)
            .map(|content| vec![(path.display().to_string(), content)])
            .unwrap_or_default()
    })
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TomahawkConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Validate on success; on failure, build diagnostics against the sources
/// that were read.
fn finish(
    loaded: Result<TomahawkConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<TomahawkConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    config_file_candidates()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let name = std::path::absolute(&path)
                .unwrap_or(path)
                .display()
                .to_string();
            Some((name, content))
        })
        .collect()
}
