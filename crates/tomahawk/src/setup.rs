// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Wiring shared by every command: plugin discovery and the account manager.

use std::path::{Path, PathBuf};

use tomahawk_accounts::{
    AccountManager, DynamicLoader, FactoryRegistry, LifecycleConfig, LoadReport, PluginLocator,
    SipHandler, discover,
};
use tomahawk_config::{TomahawkConfig, TomlAccountStore};
use tomahawk_core::{AccountSignalReceiver, TomahawkError, signal_channel};
use tracing::debug;

/// An account manager ready to load accounts, with its signal receiver.
pub struct Session {
    pub manager: AccountManager,
    pub signals: AccountSignalReceiver,
    pub report: LoadReport,
}

/// Directory holding the running executable.
pub fn app_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn discover_plugins(config: &TomahawkConfig) -> (FactoryRegistry, LoadReport) {
    let locator = PluginLocator::from_config(app_dir(), &config.plugins);
    debug!(dirs = ?locator.search_dirs(), "plugin search path");
    discover(&locator, &DynamicLoader::new())
}

/// Discover plugins and open the persisted account store.
pub fn open_session(config: &TomahawkConfig) -> Result<Session, TomahawkError> {
    let (factories, report) = discover_plugins(config);
    let store = TomlAccountStore::open(config.account_store_path())?;
    let (tx, rx) = signal_channel();

    let manager = AccountManager::new(
        factories,
        Box::new(store),
        Box::new(SipHandler::new()),
        tx,
        LifecycleConfig::from(&config.accounts),
    );
    Ok(Session {
        manager,
        signals: rx,
        report,
    })
}
