// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Observer and peer network that record what they are told.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tomahawk_accounts::{AccountEvent, AccountObserver, AccountRegistry, PeerNetwork};
use tomahawk_core::AccountId;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An event plus what the registry looked like when it was delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedEvent {
    pub event: AccountEvent,
    /// Position of the account in the master list, if it was listed.
    pub index: Option<usize>,
    pub enabled: bool,
    pub connected: bool,
}

/// Captures every event for assertion in tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    records: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RecordedEvent> {
        lock(&self.records).clone()
    }

    pub fn events(&self) -> Vec<AccountEvent> {
        lock(&self.records).iter().map(|r| r.event.clone()).collect()
    }

    pub fn clear(&self) {
        lock(&self.records).clear();
    }
}

impl AccountObserver for RecordingObserver {
    fn on_event(&mut self, event: &AccountEvent, registry: &AccountRegistry) {
        let id = event.account_id();
        lock(&self.records).push(RecordedEvent {
            event: event.clone(),
            index: registry.index_of(id),
            enabled: registry.is_enabled(id),
            connected: registry.is_connected(id),
        });
    }
}

#[derive(Debug, Default)]
struct PeerLog {
    hooked: Vec<(AccountId, String)>,
    unhooked: Vec<AccountId>,
    remove_all_remote: usize,
}

/// Peer network that records hook-ups and purges.
#[derive(Debug, Clone, Default)]
pub struct RecordingPeerNetwork {
    log: Arc<Mutex<PeerLog>>,
}

impl RecordingPeerNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(account id, plugin name)` for every hook-up, in call order.
    pub fn hooked(&self) -> Vec<(AccountId, String)> {
        lock(&self.log).hooked.clone()
    }

    pub fn unhooked(&self) -> Vec<AccountId> {
        lock(&self.log).unhooked.clone()
    }

    pub fn remove_all_remote_calls(&self) -> usize {
        lock(&self.log).remove_all_remote
    }
}

impl PeerNetwork for RecordingPeerNetwork {
    fn hook_up_plugin(&mut self, account_id: &AccountId, plugin_name: &str) {
        lock(&self.log)
            .hooked
            .push((account_id.clone(), plugin_name.to_string()));
    }

    fn unhook_plugin(&mut self, account_id: &AccountId) {
        lock(&self.log).unhooked.push(account_id.clone());
    }

    fn remove_all_remote(&mut self) {
        lock(&self.log).remove_all_remote += 1;
    }
}
