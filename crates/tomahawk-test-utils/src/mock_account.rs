// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock account and connectivity plugin.
//!
//! `MockAccount` counts every call the manager makes on it. The counters live
//! behind an `Arc`, so a [`MockAccountProbe`] can read them after the account
//! has been boxed and handed to the manager, or even after it was dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tomahawk_core::{
    Account, AccountError, AccountId, AccountSignals, AccountTypes, ConnectionState,
    ConnectivityPlugin, ErrorCode, TomahawkError,
};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    authenticate: AtomicUsize,
    deauthenticate: AtomicUsize,
    connect: AtomicUsize,
    disconnect: AtomicUsize,
    check_settings: AtomicUsize,
    remove_from_config: AtomicUsize,
    dropped: AtomicBool,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Connectivity plugin that only counts calls.
#[derive(Debug)]
pub struct MockConnectivityPlugin {
    name: String,
    counters: Arc<Counters>,
}

impl ConnectivityPlugin for MockConnectivityPlugin {
    fn friendly_name(&self) -> &str {
        &self.name
    }

    fn connect_plugin(&mut self) {
        bump(&self.counters.connect);
    }

    fn disconnect_plugin(&mut self) {
        bump(&self.counters.disconnect);
    }

    fn check_settings(&mut self) {
        bump(&self.counters.check_settings);
    }
}

/// Behaviour of a mock account, chosen by its factory.
#[derive(Debug, Clone)]
pub(crate) struct AccountTemplate {
    pub types: AccountTypes,
    pub enabled: bool,
    pub auto_connect: bool,
    pub with_plugin: bool,
    pub fail_remove_from_config: bool,
}

pub struct MockAccount {
    id: AccountId,
    name: String,
    template: AccountTemplate,
    state: ConnectionState,
    plugin: Option<MockConnectivityPlugin>,
    counters: Arc<Counters>,
}

impl MockAccount {
    pub(crate) fn new(
        id: AccountId,
        signals: AccountSignals,
        template: AccountTemplate,
    ) -> (Self, MockAccountProbe) {
        let counters = Arc::new(Counters::default());
        let name = format!("mock {id}");
        let plugin = template.with_plugin.then(|| MockConnectivityPlugin {
            name: format!("{name} plugin"),
            counters: Arc::clone(&counters),
        });
        let probe = MockAccountProbe {
            id: id.clone(),
            counters: Arc::clone(&counters),
            signals,
        };
        let account = Self {
            id,
            name,
            template,
            state: ConnectionState::Disconnected,
            plugin,
            counters,
        };
        (account, probe)
    }
}

impl Account for MockAccount {
    fn id(&self) -> &AccountId {
        &self.id
    }

    fn friendly_name(&self) -> &str {
        &self.name
    }

    fn types(&self) -> AccountTypes {
        self.template.types
    }

    fn enabled(&self) -> bool {
        self.template.enabled
    }

    fn auto_connect(&self) -> bool {
        self.template.auto_connect
    }

    fn connection_state(&self) -> ConnectionState {
        self.state
    }

    fn authenticate(&mut self) {
        bump(&self.counters.authenticate);
        self.state = ConnectionState::Connecting;
    }

    fn deauthenticate(&mut self) {
        bump(&self.counters.deauthenticate);
        self.state = ConnectionState::Disconnected;
    }

    fn connectivity_plugin(&self) -> Option<&dyn ConnectivityPlugin> {
        self.plugin.as_ref().map(|p| p as &dyn ConnectivityPlugin)
    }

    fn connectivity_plugin_mut(&mut self) -> Option<&mut (dyn ConnectivityPlugin + 'static)> {
        self.plugin
            .as_mut()
            .map(|p| p as &mut (dyn ConnectivityPlugin + 'static))
    }

    fn remove_from_config(&mut self) -> Result<(), TomahawkError> {
        bump(&self.counters.remove_from_config);
        if self.template.fail_remove_from_config {
            return Err(TomahawkError::Internal(format!(
                "cannot purge settings of {}",
                self.id
            )));
        }
        Ok(())
    }
}

impl Drop for MockAccount {
    fn drop(&mut self) {
        self.counters.dropped.store(true, Ordering::SeqCst);
    }
}

/// Observation and signalling handle for one [`MockAccount`].
#[derive(Debug, Clone)]
pub struct MockAccountProbe {
    id: AccountId,
    counters: Arc<Counters>,
    signals: AccountSignals,
}

impl MockAccountProbe {
    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn authenticate_calls(&self) -> usize {
        self.counters.authenticate.load(Ordering::SeqCst)
    }

    pub fn deauthenticate_calls(&self) -> usize {
        self.counters.deauthenticate.load(Ordering::SeqCst)
    }

    pub fn connect_calls(&self) -> usize {
        self.counters.connect.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.counters.disconnect.load(Ordering::SeqCst)
    }

    pub fn check_settings_calls(&self) -> usize {
        self.counters.check_settings.load(Ordering::SeqCst)
    }

    pub fn remove_from_config_calls(&self) -> usize {
        self.counters.remove_from_config.load(Ordering::SeqCst)
    }

    /// True once the manager has dropped the account.
    pub fn is_dropped(&self) -> bool {
        self.counters.dropped.load(Ordering::SeqCst)
    }

    /// Raise a connection state change, as the real plugin would.
    pub fn emit_state(&self, state: ConnectionState) {
        self.signals.state_changed(state);
    }

    /// Raise an error with the given code.
    pub fn emit_error(&self, code: ErrorCode, message: &str) {
        self.signals.error(AccountError::new(code, message));
    }
}
