// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mock account factory for deterministic testing.

use std::sync::{Arc, Mutex, PoisonError};

use tomahawk_core::{
    Account, AccountFactory, AccountId, AccountSignals, AccountType, AccountTypes,
};

use crate::mock_account::{AccountTemplate, MockAccount, MockAccountProbe};

/// A built-in factory producing [`MockAccount`]s.
///
/// Clones share the record of created accounts, so a test can keep one clone
/// and hand the other to the factory registry.
#[derive(Debug, Clone)]
pub struct MockAccountFactory {
    factory_id: String,
    pretty_name: String,
    template: AccountTemplate,
    created: Arc<Mutex<Vec<MockAccountProbe>>>,
}

impl MockAccountFactory {
    /// A factory for enabled, auto-connecting connectivity accounts with a plugin.
    pub fn new(factory_id: &str) -> Self {
        Self {
            factory_id: factory_id.to_string(),
            pretty_name: format!("Mock {factory_id}"),
            template: AccountTemplate {
                types: AccountType::Connectivity.into(),
                enabled: true,
                auto_connect: true,
                with_plugin: true,
                fail_remove_from_config: false,
            },
            created: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_types(mut self, types: impl Into<AccountTypes>) -> Self {
        self.template.types = types.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.template.enabled = false;
        self
    }

    pub fn without_auto_connect(mut self) -> Self {
        self.template.auto_connect = false;
        self
    }

    pub fn without_plugin(mut self) -> Self {
        self.template.with_plugin = false;
        self
    }

    /// Accounts fail in `remove_from_config`.
    pub fn failing_remove_from_config(mut self) -> Self {
        self.template.fail_remove_from_config = true;
        self
    }

    /// Ids passed to `create_account`, in call order.
    pub fn created_ids(&self) -> Vec<AccountId> {
        self.lock().iter().map(|p| p.id().clone()).collect()
    }

    pub fn created_count(&self) -> usize {
        self.lock().len()
    }

    /// Probe for the most recent account created with `id`.
    pub fn probe(&self, id: &AccountId) -> Option<MockAccountProbe> {
        self.lock().iter().rev().find(|p| p.id() == id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MockAccountProbe>> {
        self.created.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AccountFactory for MockAccountFactory {
    fn factory_id(&self) -> &str {
        &self.factory_id
    }

    fn pretty_name(&self) -> &str {
        &self.pretty_name
    }

    fn create_account(&self, id: AccountId, signals: AccountSignals) -> Box<dyn Account> {
        let (account, probe) = MockAccount::new(id, signals, self.template.clone());
        self.lock().push(probe);
        Box::new(account)
    }
}
