// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tomahawk.toml` > `~/.config/tomahawk/tomahawk.toml` > `/etc/tomahawk/tomahawk.toml`
//! with environment variable overrides via `TOMAHAWK_` prefix.

#![allow(clippy::result_large_err)] // the public API returns figment::Error as is

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TomahawkConfig;

const SYSTEM_CONFIG: &str = "/etc/tomahawk/tomahawk.toml";
const LOCAL_CONFIG: &str = "tomahawk.toml";

/// Config files consulted by [`load_config`], lowest precedence first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("tomahawk/tomahawk.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tomahawk/tomahawk.toml` (system-wide)
/// 3. `~/.config/tomahawk/tomahawk.toml` (user XDG config)
/// 4. `./tomahawk.toml` (local directory)
/// 5. `TOMAHAWK_*` environment variables
pub fn load_config() -> Result<TomahawkConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TomahawkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TomahawkConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TomahawkConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TomahawkConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for the XDG hierarchy, before extraction.
pub fn build_figment() -> Figment {
    config_file_candidates()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(TomahawkConfig::default())),
            |figment, path| figment.merge(Toml::file(path)),
        )
        .merge(env_provider())
}

/// Environment provider mapping `TOMAHAWK_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys containing
/// underscores survive: `TOMAHAWK_ACCOUNTS_RETRY_DELAY_SECS` must become
/// `accounts.retry_delay_secs`.
fn env_provider() -> Env {
    Env::prefixed("TOMAHAWK_").map(|key| {
        key.as_str()
            .to_ascii_lowercase()
            .replacen("app_", "app.", 1)
            .replacen("plugins_", "plugins.", 1)
            .replacen("accounts_", "accounts.", 1)
            .into()
    })
}
