// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Test harness for account lifecycle integration tests.
//!
//! `TestHarness` assembles an `AccountManager` with mock factories, an
//! in-memory account store, a recording peer network, and a recording
//! observer. Signals raised by mock accounts queue up in the harness and are
//! applied with [`TestHarness::pump`].

use std::time::Duration;

use tomahawk_accounts::{AccountManager, FactoryRegistry, LifecycleConfig};
use tomahawk_config::MemoryAccountStore;
use tomahawk_core::{AccountId, AccountSignalReceiver, signal_channel};

use crate::mock_account::MockAccountProbe;
use crate::mock_factory::MockAccountFactory;
use crate::recording::{RecordingObserver, RecordingPeerNetwork};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    factories: Vec<MockAccountFactory>,
    persisted: Vec<String>,
    retry_delay: Duration,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            factories: Vec::new(),
            persisted: Vec::new(),
            retry_delay: LifecycleConfig::default().retry_delay,
        }
    }

    /// Register a built-in factory.
    pub fn with_factory(mut self, factory: MockAccountFactory) -> Self {
        self.factories.push(factory);
        self
    }

    /// Seed the account store with persisted ids.
    pub fn with_persisted<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.persisted.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Build the manager. Accounts are not loaded yet.
    pub fn build(self) -> TestHarness {
        let mut registry = FactoryRegistry::new();
        for factory in &self.factories {
            registry.register_builtin(Box::new(factory.clone()));
        }

        let (tx, rx) = signal_channel();
        let peers = RecordingPeerNetwork::new();
        let observer = RecordingObserver::new();

        let mut manager = AccountManager::new(
            registry,
            Box::new(MemoryAccountStore::with_accounts(self.persisted)),
            Box::new(peers.clone()),
            tx,
            LifecycleConfig {
                retry_delay: self.retry_delay,
            },
        );
        manager.subscribe(observer.clone());

        TestHarness {
            manager,
            signals: rx,
            factories: self.factories,
            peers,
            observer,
        }
    }
}

/// A complete account manager stack for end-to-end testing.
pub struct TestHarness {
    pub manager: AccountManager,
    pub signals: AccountSignalReceiver,
    pub factories: Vec<MockAccountFactory>,
    pub peers: RecordingPeerNetwork,
    pub observer: RecordingObserver,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Apply every queued account signal. Returns how many were handled.
    pub fn pump(&mut self) -> usize {
        self.manager.drain_signals(&mut self.signals)
    }

    /// Probe for an account created by any of the harness factories.
    pub fn probe(&self, id: &AccountId) -> Option<MockAccountProbe> {
        self.factories.iter().find_map(|f| f.probe(id))
    }

    /// Ids currently persisted in the account store.
    pub fn persisted(&self) -> Vec<String> {
        self.manager.store().accounts()
    }
}
