// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Persisted list of configured account ids.
//!
//! The account manager reads the ordered id list at startup and updates it
//! when accounts are added or removed. Per-account plugin settings are owned
//! by the plugins themselves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tomahawk_core::TomahawkError;
use tracing::debug;

/// Storage for the ordered list of account ids.
pub trait AccountStore {
    /// Configured account ids, in the order they were added.
    fn accounts(&self) -> Vec<String>;

    /// Append an id. Adding an id that is already present is a no-op.
    fn add_account(&mut self, id: &str) -> Result<(), TomahawkError>;

    /// Remove an id. Removing an absent id is a no-op.
    fn remove_account(&mut self, id: &str) -> Result<(), TomahawkError>;
}

/// In-memory store, used by tests and one-shot commands.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    ids: Vec<String>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl AccountStore for MemoryAccountStore {
    fn accounts(&self) -> Vec<String> {
        self.ids.clone()
    }

    fn add_account(&mut self, id: &str) -> Result<(), TomahawkError> {
        if !self.ids.iter().any(|existing| existing == id) {
            self.ids.push(id.to_string());
        }
        Ok(())
    }

    fn remove_account(&mut self, id: &str) -> Result<(), TomahawkError> {
        self.ids.retain(|existing| existing != id);
        Ok(())
    }
}

/// On-disk layout of `accounts.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<String>,
}

/// TOML-file backed store. The file is rewritten after every change.
#[derive(Debug)]
pub struct TomlAccountStore {
    path: PathBuf,
    ids: Vec<String>,
}

impl TomlAccountStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TomahawkError> {
        let path = path.into();
        let ids = match std::fs::read_to_string(&path) {
            Ok(content) => {
                let file: AccountsFile = toml::from_str(&content)
                    .map_err(|e| TomahawkError::Settings { source: e.into() })?;
                file.accounts
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(TomahawkError::Settings { source: e.into() }),
        };
        debug!(path = %path.display(), count = ids.len(), "account store opened");
        Ok(Self { path, ids })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), TomahawkError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| TomahawkError::Settings { source: e.into() })?;
        }

        let content = toml::to_string(&AccountsFile {
            accounts: self.ids.clone(),
        })
        .map_err(|e| TomahawkError::Settings { source: e.into() })?;

        // Write-then-rename.
        let tmp = self.path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).map_err(|e| TomahawkError::Settings { source: e.into() })?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| TomahawkError::Settings { source: e.into() })?;
        Ok(())
    }
}

impl AccountStore for TomlAccountStore {
    fn accounts(&self) -> Vec<String> {
        self.ids.clone()
    }

    fn add_account(&mut self, id: &str) -> Result<(), TomahawkError> {
        if self.ids.iter().any(|existing| existing == id) {
            return Ok(());
        }
        self.ids.push(id.to_string());
        self.save()
    }

    fn remove_account(&mut self, id: &str) -> Result<(), TomahawkError> {
        let before = self.ids.len();
        self.ids.retain(|existing| existing != id);
        if self.ids.len() == before {
            return Ok(());
        }
        self.save()
    }
}
