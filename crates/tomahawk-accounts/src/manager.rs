// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account lifecycle controller.
//!
//! [`AccountManager`] owns the loaded factories and the account registry. It
//! instantiates accounts from persisted ids, hooks connectivity plugins into
//! the peer network, reacts to account signals, and notifies observers.
//!
//! Everything runs on the caller's thread. Timers are not spawned: error
//! retries are recorded in a [`RetrySchedule`] and the control loop asks for
//! [`AccountManager::next_retry_deadline`] and calls
//! [`AccountManager::fire_due_retries`] when it passes.

use std::time::{Duration, Instant};

use tomahawk_config::AccountStore;
use tomahawk_config::model::AccountsConfig;
use tomahawk_core::{
    Account, AccountFactory, AccountId, AccountSignal, AccountSignalReceiver, AccountSignalSender,
    AccountSignals, AccountType, ConnectionState, SignalKind, TomahawkError,
};
use tracing::{debug, info, warn};

use crate::events::{AccountEvent, AccountObserver, ObserverList};
use crate::peer::PeerNetwork;
use crate::registry::{AccountRegistry, FactoryRegistry};
use crate::retry::RetrySchedule;

/// Default delay before re-authenticating after a non-auth error.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Tunables for the lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleConfig {
    pub retry_delay: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl From<&AccountsConfig> for LifecycleConfig {
    fn from(config: &AccountsConfig) -> Self {
        Self {
            retry_delay: config.retry_delay(),
        }
    }
}

/// Result of [`AccountManager::load_from_config`].
#[derive(Debug, Default)]
pub struct ConfigLoadSummary {
    /// Accounts instantiated and added, in persisted order.
    pub loaded: Vec<AccountId>,
    /// Persisted ids whose factory is not loaded.
    pub unknown_factory: Vec<AccountId>,
    /// Persisted ids the registry refused, e.g. duplicates.
    pub rejected: Vec<(AccountId, TomahawkError)>,
}

impl ConfigLoadSummary {
    pub fn skipped(&self) -> usize {
        self.unknown_factory.len() + self.rejected.len()
    }
}

pub struct AccountManager {
    // Accounts run code from the plugin libraries held by `factories`, so the
    // registry is declared (and dropped) first.
    registry: AccountRegistry,
    factories: FactoryRegistry,
    observers: ObserverList,
    retries: RetrySchedule,
    store: Box<dyn AccountStore>,
    peers: Box<dyn PeerNetwork>,
    signals: AccountSignalSender,
    connected: bool,
}

impl AccountManager {
    pub fn new(
        factories: FactoryRegistry,
        store: Box<dyn AccountStore>,
        peers: Box<dyn PeerNetwork>,
        signals: AccountSignalSender,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            registry: AccountRegistry::new(),
            factories,
            observers: ObserverList::new(),
            retries: RetrySchedule::new(config.retry_delay),
            store,
            peers,
            signals,
            connected: false,
        }
    }

    /// The factory prefix of an account id.
    pub fn factory_from_id(account_id: &str) -> &str {
        tomahawk_core::factory_from_id(account_id)
    }

    pub fn factory_for_account(&self, account_id: &AccountId) -> Option<&dyn AccountFactory> {
        self.factories.get(account_id.factory_id())
    }

    /// Returns true if any registered account was created by `factory_id`.
    pub fn has_plugin_with_factory(&self, factory_id: &str) -> bool {
        self.registry.iter().any(|a| a.id().factory_id() == factory_id)
    }

    /// Instantiate the account for `account_id` and wire its signals to this manager.
    ///
    /// The account is not added to the registry.
    pub fn load_plugin(&self, account_id: &AccountId) -> Result<Box<dyn Account>, TomahawkError> {
        let factory_id = account_id.factory_id();
        let factory = self
            .factories
            .get(factory_id)
            .ok_or_else(|| TomahawkError::UnknownFactory {
                account_id: account_id.to_string(),
                factory_id: factory_id.to_string(),
            })?;

        let signals = AccountSignals::new(account_id.clone(), self.signals.clone());
        let account = factory.create_account(account_id.clone(), signals);
        debug!(account_id = %account_id, factory_id, "account instantiated");
        Ok(account)
    }

    /// Instantiate every persisted account whose factory is loaded.
    pub fn load_from_config(&mut self) -> ConfigLoadSummary {
        let mut summary = ConfigLoadSummary::default();

        for raw in self.store.accounts() {
            let account_id = AccountId::from(raw);
            if !self.factories.contains(account_id.factory_id()) {
                warn!(
                    account_id = %account_id,
                    factory_id = account_id.factory_id(),
                    "no plugin factory for persisted account, skipping"
                );
                summary.unknown_factory.push(account_id);
                continue;
            }

            let result = self
                .load_plugin(&account_id)
                .and_then(|account| self.add_account(account));
            match result {
                Ok(()) => summary.loaded.push(account_id),
                Err(error) => {
                    warn!(account_id = %account_id, %error, "failed to load persisted account");
                    summary.rejected.push((account_id, error));
                }
            }
        }

        info!(
            loaded = summary.loaded.len(),
            skipped = summary.skipped(),
            "accounts loaded from settings"
        );
        summary
    }

    /// Register an account and emit `Added`.
    pub fn add_account(&mut self, account: Box<dyn Account>) -> Result<(), TomahawkError> {
        let account_id = account.id().clone();
        let types = account.types();
        self.registry.insert(account)?;
        debug!(account_id = %account_id, types = %types, "account added");
        self.emit(AccountEvent::Added(account_id));
        Ok(())
    }

    /// Create, persist, and register a brand-new account for `factory_id`.
    pub fn create_account(&mut self, factory_id: &str) -> Result<AccountId, TomahawkError> {
        let account_id = AccountId::generate(factory_id);
        let account = self.load_plugin(&account_id)?;
        self.store.add_account(account_id.as_str())?;
        self.add_account(account)?;
        info!(account_id = %account_id, "account created");
        Ok(account_id)
    }

    /// Remove an account everywhere and purge its configuration.
    ///
    /// A connected account is reported `Disconnected` first. Observers then
    /// see `Removed` while the account is still listed. Any pending
    /// retry is cancelled, so a removed account is never re-authenticated.
    pub fn remove_account(&mut self, account_id: &AccountId) -> Result<(), TomahawkError> {
        let account = self
            .registry
            .get_mut(account_id)
            .ok_or_else(|| TomahawkError::AccountNotFound(account_id.to_string()))?;
        account.deauthenticate();

        // The account's own Disconnected signal arrives after it is gone.
        if self.registry.is_connected(account_id) {
            self.registry.mark_disconnected(account_id);
            self.emit(AccountEvent::Disconnected(account_id.clone()));
            self.emit(AccountEvent::StateChanged(
                account_id.clone(),
                ConnectionState::Disconnected,
            ));
        }

        self.emit(AccountEvent::Removed(account_id.clone()));

        let mut account = self
            .registry
            .remove(account_id)
            .ok_or_else(|| TomahawkError::AccountNotFound(account_id.to_string()))?;
        if self.retries.cancel(account_id) {
            debug!(account_id = %account_id, "pending retry cancelled");
        }
        self.peers.unhook_plugin(account_id);

        let stored = self.store.remove_account(account_id.as_str());
        if let Err(error) = account.remove_from_config() {
            warn!(account_id = %account_id, %error, "failed to purge account configuration");
        }
        drop(account);

        info!(account_id = %account_id, "account removed");
        stored
    }

    /// Ask every connectivity plugin to connect.
    pub fn connect_all(&mut self) {
        for account in self.registry.iter_mut() {
            if !account.types().contains(AccountType::Connectivity) {
                continue;
            }
            let account_id = account.id().clone();
            if let Some(plugin) = account.connectivity_plugin_mut() {
                debug!(account_id = %account_id, plugin = plugin.friendly_name(), "connecting");
                plugin.connect_plugin();
            }
        }
        self.connected = true;
    }

    /// Disconnect every connected account and drop all remote sources.
    pub fn disconnect_all(&mut self) {
        let connected = self.registry.connected().to_vec();
        for account_id in &connected {
            if let Some(account) = self.registry.get_mut(account_id)
                && let Some(plugin) = account.connectivity_plugin_mut()
            {
                debug!(account_id = %account_id, plugin = plugin.friendly_name(), "disconnecting");
                plugin.disconnect_plugin();
            }
        }
        self.peers.remove_all_remote();
        self.connected = false;
    }

    pub fn toggle_accounts_connected(&mut self) {
        if self.connected {
            self.disconnect_all();
        } else {
            self.connect_all();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Startup pass: hook up every connectivity account and authenticate
    /// the enabled ones that auto-connect.
    pub fn init_sip(&mut self) {
        let ids = self.registry.of_type(AccountType::Connectivity).to_vec();
        debug!(count = ids.len(), "initialising connectivity accounts");
        for account_id in &ids {
            self.hookup_and_enable(account_id, true);
        }
    }

    /// Hook up and authenticate one account on user request.
    pub fn enable_account(&mut self, account_id: &AccountId) -> Result<(), TomahawkError> {
        if !self.registry.contains(account_id) {
            return Err(TomahawkError::AccountNotFound(account_id.to_string()));
        }
        self.hookup_and_enable(account_id, false);
        Ok(())
    }

    fn hookup_and_enable(&mut self, account_id: &AccountId, startup: bool) {
        let Some(account) = self.registry.get_mut(account_id) else {
            return;
        };
        if let Some(plugin) = account.connectivity_plugin() {
            self.peers.hook_up_plugin(account_id, plugin.friendly_name());
        }

        if account.enabled() && (!startup || account.auto_connect()) {
            account.authenticate();
            self.registry.mark_enabled(account_id);
            debug!(account_id = %account_id, startup, "account enabled");
        }
    }

    /// Let connectivity plugins re-read their settings.
    pub fn on_settings_changed(&mut self) {
        for account in self.registry.iter_mut() {
            if account.types().contains(AccountType::Connectivity)
                && let Some(plugin) = account.connectivity_plugin_mut()
            {
                plugin.check_settings();
            }
        }
    }

    pub fn handle_signal(&mut self, signal: AccountSignal) {
        self.handle_signal_at(signal, Instant::now());
    }

    /// Apply an account signal, using `now` as the base for retry deadlines.
    pub fn handle_signal_at(&mut self, signal: AccountSignal, now: Instant) {
        let AccountSignal { account_id, kind } = signal;
        let Some(account) = self.registry.get(&account_id) else {
            debug!(account_id = %account_id, "signal from unknown account ignored");
            return;
        };

        match kind {
            SignalKind::Error(error) => {
                warn!(
                    account_id = %account_id,
                    name = account.friendly_name(),
                    code = %error.code,
                    message = %error.message,
                    "failed to connect account"
                );
                if error.code.is_auth() {
                    self.emit(AccountEvent::AuthError(account_id, error));
                } else {
                    self.retries.schedule(&account_id, now);
                    debug!(
                        account_id = %account_id,
                        delay_secs = self.retries.delay().as_secs(),
                        "reconnect scheduled"
                    );
                }
            }
            SignalKind::StateChanged(state) => {
                match state {
                    ConnectionState::Connected => {
                        self.registry.mark_connected(&account_id);
                        self.retries.cancel(&account_id);
                        self.emit(AccountEvent::Connected(account_id.clone()));
                    }
                    ConnectionState::Disconnected => {
                        self.registry.mark_disconnected(&account_id);
                        self.emit(AccountEvent::Disconnected(account_id.clone()));
                    }
                    ConnectionState::Connecting | ConnectionState::Disconnecting => {}
                }
                self.emit(AccountEvent::StateChanged(account_id, state));
            }
        }
    }

    /// Feed every queued signal to [`handle_signal`](Self::handle_signal).
    pub fn drain_signals(&mut self, receiver: &mut AccountSignalReceiver) -> usize {
        let mut handled = 0;
        while let Ok(signal) = receiver.try_recv() {
            self.handle_signal(signal);
            handled += 1;
        }
        handled
    }

    pub fn next_retry_deadline(&self) -> Option<Instant> {
        self.retries.next_deadline()
    }

    pub fn is_retry_pending(&self, account_id: &AccountId) -> bool {
        self.retries.is_pending(account_id)
    }

    /// Re-authenticate every account whose retry is due. Returns the ids retried.
    pub fn fire_due_retries(&mut self, now: Instant) -> Vec<AccountId> {
        let mut fired = Vec::new();
        for account_id in self.retries.take_due(now) {
            if let Some(account) = self.registry.get_mut(&account_id) {
                info!(account_id = %account_id, "retrying authentication");
                account.authenticate();
                fired.push(account_id);
            }
        }
        fired
    }

    pub fn subscribe(&mut self, observer: impl AccountObserver + 'static) {
        self.observers.subscribe(Box::new(observer));
    }

    fn emit(&mut self, event: AccountEvent) {
        debug!(event = event.name(), account_id = %event.account_id(), "account event");
        self.observers.notify(&event, &self.registry);
    }

    /// Disconnect if needed and drop every account. Factories stay loaded
    /// until the manager itself is dropped.
    pub fn shutdown(&mut self) {
        if self.connected {
            self.disconnect_all();
        }
        self.retries.clear();
        self.registry.clear();
        info!("account manager shut down");
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    pub fn accounts(&self) -> impl Iterator<Item = &dyn Account> {
        self.registry.iter()
    }

    pub fn account_ids(&self) -> Vec<AccountId> {
        self.registry.ids()
    }

    pub fn accounts_of_type(&self, ty: AccountType) -> &[AccountId] {
        self.registry.of_type(ty)
    }

    pub fn enabled_accounts(&self) -> &[AccountId] {
        self.registry.enabled()
    }

    pub fn connected_accounts(&self) -> &[AccountId] {
        self.registry.connected()
    }

    pub fn account(&self, account_id: &AccountId) -> Option<&dyn Account> {
        self.registry.get(account_id)
    }

    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    pub fn store(&self) -> &dyn AccountStore {
        self.store.as_ref()
    }
}

impl Drop for AccountManager {
    fn drop(&mut self) {
        if self.connected {
            self.disconnect_all();
        }
    }
}

impl std::fmt::Debug for AccountManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountManager")
            .field("registry", &self.registry)
            .field("factories", &self.factories.ids())
            .field("pending_retries", &self.retries.len())
            .field("connected", &self.connected)
            .finish()
    }
}
