// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Lifecycle notifications for account observers.

use tomahawk_core::{AccountError, AccountId, ConnectionState};

use crate::registry::AccountRegistry;

/// A change in the set of accounts or in an account's connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountEvent {
    Added(AccountId),
    /// Emitted while the account is still listed in the registry.
    Removed(AccountId),
    Connected(AccountId),
    Disconnected(AccountId),
    StateChanged(AccountId, ConnectionState),
    /// Credentials were rejected; the account needs user attention.
    AuthError(AccountId, AccountError),
}

impl AccountEvent {
    pub fn account_id(&self) -> &AccountId {
        match self {
            AccountEvent::Added(id)
            | AccountEvent::Removed(id)
            | AccountEvent::Connected(id)
            | AccountEvent::Disconnected(id)
            | AccountEvent::StateChanged(id, _)
            | AccountEvent::AuthError(id, _) => id,
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            AccountEvent::Added(_) => "added",
            AccountEvent::Removed(_) => "removed",
            AccountEvent::Connected(_) => "connected",
            AccountEvent::Disconnected(_) => "disconnected",
            AccountEvent::StateChanged(..) => "state-changed",
            AccountEvent::AuthError(..) => "auth-error",
        }
    }
}

/// Receives account events.
///
/// The registry is passed as it stands at the moment of the event, so an
/// observer can look up the account's position or list membership.
pub trait AccountObserver {
    fn on_event(&mut self, event: &AccountEvent, registry: &AccountRegistry);
}

impl<F> AccountObserver for F
where
    F: FnMut(&AccountEvent, &AccountRegistry),
{
    fn on_event(&mut self, event: &AccountEvent, registry: &AccountRegistry) {
        self(event, registry)
    }
}

/// Observers in registration order.
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Box<dyn AccountObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: Box<dyn AccountObserver>) {
        self.observers.push(observer);
    }

    /// Deliver `event` to every observer before returning.
    pub fn notify(&mut self, event: &AccountEvent, registry: &AccountRegistry) {
        for observer in &mut self.observers {
            observer.on_event(event, registry);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.observers.len())
            .finish()
    }
}
