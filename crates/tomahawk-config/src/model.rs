// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Tomahawk configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TomahawkConfig {
    /// Application-wide settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Account plugin discovery settings.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Account lifecycle settings.
    #[serde(default)]
    pub accounts: AccountsConfig,
}

/// Application-wide configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory for persisted state. Defaults to the platform data dir.
    #[serde(default)]
    pub data_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            data_dir: None,
        }
    }
}

impl AppConfig {
    /// Resolve the data directory, falling back to `<data dir>/tomahawk`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => dirs::data_dir()
                .map(|d| d.join("tomahawk"))
                .unwrap_or_else(|| PathBuf::from(".tomahawk")),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Account plugin discovery configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Overrides the compile-time install prefix. Plugins are searched in `<prefix>/lib`.
    #[serde(default)]
    pub install_prefix: Option<String>,

    /// Additional directories scanned after the built-in ones.
    #[serde(default)]
    pub extra_dirs: Vec<String>,

    /// Walk up out of an app bundle's `MacOS` directory. Defaults to on for macOS.
    #[serde(default)]
    pub bundle_fallback: Option<bool>,
}

/// Account lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AccountsConfig {
    /// Delay before re-authenticating after a non-auth error.
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// File holding the ordered list of configured account ids.
    /// Defaults to `accounts.toml` inside the data directory.
    #[serde(default)]
    pub store_file: Option<String>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            retry_delay_secs: default_retry_delay_secs(),
            store_file: None,
        }
    }
}

impl AccountsConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }
}

fn default_retry_delay_secs() -> u64 {
    10
}

impl TomahawkConfig {
    /// Path of the persisted account list.
    pub fn account_store_path(&self) -> PathBuf {
        match &self.accounts.store_file {
            Some(path) => PathBuf::from(path),
            None => self.app.resolved_data_dir().join("accounts.toml"),
        }
    }
}
