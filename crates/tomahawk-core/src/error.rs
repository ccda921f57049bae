// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types for the Tomahawk account subsystem.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across account plugins and the account manager.
#[derive(Debug, Error)]
pub enum TomahawkError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// The shared library could not be opened.
    #[error("failed to load plugin {}: {message}", path.display())]
    PluginLoad { path: PathBuf, message: String },

    /// The library opened but does not export a usable account factory.
    #[error("invalid plugin {}: {message}", path.display())]
    InvalidPlugin { path: PathBuf, message: String },

    /// The plugin was built against a different plugin ABI.
    #[error("plugin {} has ABI version {found}, expected {expected}", path.display())]
    AbiMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    /// An account id refers to a factory that is not loaded.
    #[error("no factory `{factory_id}` loaded for account {account_id}")]
    UnknownFactory {
        account_id: String,
        factory_id: String,
    },

    /// An account with the same id is already registered.
    #[error("account {0} is already registered")]
    DuplicateAccount(String),

    /// No account with the given id is registered.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// Persisted account settings could not be read or written.
    #[error("settings error: {source}")]
    Settings {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TomahawkError {
    /// Returns true for errors that only affect a single plugin candidate.
    ///
    /// Discovery logs these and carries on with the next candidate.
    pub fn is_plugin_load_failure(&self) -> bool {
        matches!(
            self,
            TomahawkError::PluginLoad { .. }
                | TomahawkError::InvalidPlugin { .. }
                | TomahawkError::AbiMismatch { .. }
        )
    }
}
