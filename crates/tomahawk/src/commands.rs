// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! One-shot commands: `plugins`, `accounts`, `add`, and `remove`.
//!
//! Each command discovers plugins and opens the account store, does its
//! work, and exits without connecting anything.

use serde::Serialize;
use tomahawk_accounts::{AccountManager, FactoryRegistry, LoadReport};
use tomahawk_config::{AccountStore, TomahawkConfig, TomlAccountStore};
use tomahawk_core::{AccountId, TomahawkError};

use crate::setup::{discover_plugins, open_session};

/// A loadable plugin factory.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PluginInfo {
    pub factory_id: String,
    pub pretty_name: String,
    pub path: Option<String>,
}

/// A candidate library that could not be loaded.
#[derive(Debug, Serialize)]
pub struct PluginFailure {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
struct PluginsOutput {
    plugins: Vec<PluginInfo>,
    failures: Vec<PluginFailure>,
}

/// A persisted account, whether or not its plugin is available.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AccountInfo {
    pub id: String,
    pub factory_id: String,
    /// False when no loaded factory matches the id prefix.
    pub loaded: bool,
    pub name: Option<String>,
    pub types: Option<String>,
    pub enabled: Option<bool>,
    pub auto_connect: Option<bool>,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, TomahawkError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| TomahawkError::Internal(format!("failed to serialize output: {e}")))
}

pub fn plugin_rows(factories: &FactoryRegistry) -> Vec<PluginInfo> {
    factories
        .iter()
        .map(|entry| PluginInfo {
            factory_id: entry.factory().factory_id().to_string(),
            pretty_name: entry.factory().pretty_name().to_string(),
            path: entry.path().map(|p| p.display().to_string()),
        })
        .collect()
}

fn failure_rows(report: &LoadReport) -> Vec<PluginFailure> {
    report
        .failures
        .iter()
        .map(|(path, error)| PluginFailure {
            path: path.display().to_string(),
            error: error.to_string(),
        })
        .collect()
}

/// Run `tomahawk plugins`.
pub fn list_plugins(config: &TomahawkConfig, json: bool) -> Result<(), TomahawkError> {
    let (factories, report) = discover_plugins(config);
    let output = PluginsOutput {
        plugins: plugin_rows(&factories),
        failures: failure_rows(&report),
    };

    if json {
        println!("{}", to_json(&output)?);
        return Ok(());
    }

    if output.plugins.is_empty() {
        println!("no account plugins found");
    }
    for plugin in &output.plugins {
        println!(
            "{:<16} {:<24} {}",
            plugin.factory_id,
            plugin.pretty_name,
            plugin.path.as_deref().unwrap_or("(built-in)")
        );
    }
    for failure in &output.failures {
        eprintln!("failed: {} ({})", failure.path, failure.error);
    }
    Ok(())
}

/// Persisted accounts in store order, merged with what the manager loaded.
pub fn account_rows(manager: &AccountManager) -> Vec<AccountInfo> {
    manager
        .store()
        .accounts()
        .into_iter()
        .map(|raw| {
            let id = AccountId::from(raw);
            let factory_id = id.factory_id().to_string();
            match manager.account(&id) {
                Some(account) => AccountInfo {
                    id: id.to_string(),
                    factory_id,
                    loaded: true,
                    name: Some(account.friendly_name().to_string()),
                    types: Some(account.types().to_string()),
                    enabled: Some(account.enabled()),
                    auto_connect: Some(account.auto_connect()),
                },
                None => AccountInfo {
                    id: id.to_string(),
                    factory_id,
                    loaded: false,
                    name: None,
                    types: None,
                    enabled: None,
                    auto_connect: None,
                },
            }
        })
        .collect()
}

/// Run `tomahawk accounts`.
pub fn list_accounts(config: &TomahawkConfig, json: bool) -> Result<(), TomahawkError> {
    let mut session = open_session(config)?;
    session.manager.load_from_config();
    let rows = account_rows(&session.manager);

    if json {
        println!("{}", to_json(&rows)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("no accounts configured");
    }
    for row in &rows {
        if row.loaded {
            println!(
                "{:<40} {:<24} {:<12} {}",
                row.id,
                row.types.as_deref().unwrap_or_default(),
                if row.enabled == Some(true) { "enabled" } else { "disabled" },
                row.name.as_deref().unwrap_or_default()
            );
        } else {
            println!("{:<40} (no plugin for `{}`)", row.id, row.factory_id);
        }
    }
    Ok(())
}

/// Run `tomahawk add <factory>`.
pub fn add_account(config: &TomahawkConfig, factory_id: &str) -> Result<(), TomahawkError> {
    let mut session = open_session(config)?;
    session.manager.load_from_config();
    let account_id = session.manager.create_account(factory_id)?;
    println!("{account_id}");
    Ok(())
}

/// Run `tomahawk remove <account id>`.
///
/// Accounts whose plugin is missing can still be dropped from the store.
pub fn remove_account(config: &TomahawkConfig, account_id: &str) -> Result<(), TomahawkError> {
    let id = AccountId::from(account_id);
    let mut session = open_session(config)?;
    session.manager.load_from_config();

    if session.manager.account(&id).is_some() {
        session.manager.remove_account(&id)?;
        println!("removed {id}");
        return Ok(());
    }

    let persisted = session
        .manager
        .store()
        .accounts()
        .iter()
        .any(|existing| existing == account_id);
    drop(session);
    if !persisted {
        return Err(TomahawkError::AccountNotFound(account_id.to_string()));
    }

    let mut store = TomlAccountStore::open(config.account_store_path())?;
    store.remove_account(account_id)?;
    println!("removed {id} (plugin not loaded)");
    Ok(())
}
