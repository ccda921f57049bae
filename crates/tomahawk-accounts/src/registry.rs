// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Factory and account registries.
//!
//! The `FactoryRegistry` maps a factory id to its loaded factory and keeps
//! the backing library mapped for as long as the entry lives. The
//! `AccountRegistry` owns instantiated accounts: a master list in insertion
//! order, one id list per capability type, and the enabled and connected
//! sets. The registries only store state; ordering of notifications
//! relative to mutations is the account manager's job.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use libloading::Library;
use tomahawk_core::{Account, AccountFactory, AccountId, AccountType, TomahawkError};

use crate::loader::LoadedFactory;

/// A registered factory.
pub struct FactoryEntry {
    // Declared before `library` so the factory is dropped first.
    factory: Box<dyn AccountFactory>,
    path: Option<PathBuf>,
    _library: Option<Library>,
}

impl FactoryEntry {
    pub fn factory(&self) -> &dyn AccountFactory {
        self.factory.as_ref()
    }

    /// Library the factory came from. `None` for built-in factories.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl std::fmt::Debug for FactoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryEntry")
            .field("factory_id", &self.factory.factory_id())
            .field("pretty_name", &self.factory.pretty_name())
            .field("path", &self.path)
            .finish()
    }
}

/// Loaded account factories keyed by factory id.
#[derive(Debug, Default)]
pub struct FactoryRegistry {
    entries: BTreeMap<String, FactoryEntry>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loaded factory under its self-reported id.
    ///
    /// Returns the entry it replaced, if any. Last registration wins.
    pub fn register(&mut self, loaded: LoadedFactory, path: Option<PathBuf>) -> Option<FactoryEntry> {
        let id = loaded.factory.factory_id().to_string();
        self.entries.insert(
            id,
            FactoryEntry {
                factory: loaded.factory,
                path,
                _library: loaded.library,
            },
        )
    }

    /// Register a factory compiled into the application.
    pub fn register_builtin(&mut self, factory: Box<dyn AccountFactory>) -> Option<FactoryEntry> {
        self.register(
            LoadedFactory {
                factory,
                library: None,
            },
            None,
        )
    }

    pub fn get(&self, factory_id: &str) -> Option<&dyn AccountFactory> {
        self.entries.get(factory_id).map(FactoryEntry::factory)
    }

    pub fn entry(&self, factory_id: &str) -> Option<&FactoryEntry> {
        self.entries.get(factory_id)
    }

    pub fn contains(&self, factory_id: &str) -> bool {
        self.entries.contains_key(factory_id)
    }

    /// Factory ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries sorted by factory id.
    pub fn iter(&self) -> impl Iterator<Item = &FactoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Instantiated accounts and their secondary indexes.
///
/// Invariants: ids are unique; each per-type list holds an id at most once;
/// connected ⊆ enabled ⊆ all accounts.
#[derive(Default)]
pub struct AccountRegistry {
    accounts: Vec<Box<dyn Account>>,
    by_type: HashMap<AccountType, Vec<AccountId>>,
    enabled: Vec<AccountId>,
    connected: Vec<AccountId>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an account to the master list and to each type list it declares.
    pub fn insert(&mut self, account: Box<dyn Account>) -> Result<(), TomahawkError> {
        let id = account.id().clone();
        if self.contains(&id) {
            return Err(TomahawkError::DuplicateAccount(id.to_string()));
        }

        for ty in account.types().iter() {
            self.by_type.entry(ty).or_default().push(id.clone());
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Take an account out of every list and set.
    pub fn remove(&mut self, id: &AccountId) -> Option<Box<dyn Account>> {
        let index = self.accounts.iter().position(|a| a.id() == id)?;
        let account = self.accounts.remove(index);

        self.enabled.retain(|other| other != id);
        self.connected.retain(|other| other != id);
        for ids in self.by_type.values_mut() {
            ids.retain(|other| other != id);
        }
        Some(account)
    }

    /// Drop every account.
    pub fn clear(&mut self) {
        self.connected.clear();
        self.enabled.clear();
        self.by_type.clear();
        self.accounts.clear();
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.accounts.iter().any(|a| a.id() == id)
    }

    pub fn get(&self, id: &AccountId) -> Option<&dyn Account> {
        self.accounts.iter().find(|a| a.id() == id).map(|a| a.as_ref())
    }

    pub fn get_mut(&mut self, id: &AccountId) -> Option<&mut (dyn Account + 'static)> {
        self.accounts
            .iter_mut()
            .find(|a| a.id() == id)
            .map(|a| a.as_mut())
    }

    /// Position of an account in the master list.
    pub fn index_of(&self, id: &AccountId) -> Option<usize> {
        self.accounts.iter().position(|a| a.id() == id)
    }

    /// All accounts, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Account> {
        self.accounts.iter().map(|a| a.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Account>> {
        self.accounts.iter_mut()
    }

    /// All account ids, in insertion order.
    pub fn ids(&self) -> Vec<AccountId> {
        self.accounts.iter().map(|a| a.id().clone()).collect()
    }

    /// Ids of accounts declaring `ty`, in insertion order.
    pub fn of_type(&self, ty: AccountType) -> &[AccountId] {
        self.by_type.get(&ty).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn enabled(&self) -> &[AccountId] {
        &self.enabled
    }

    pub fn connected(&self) -> &[AccountId] {
        &self.connected
    }

    pub fn is_enabled(&self, id: &AccountId) -> bool {
        self.enabled.contains(id)
    }

    pub fn is_connected(&self, id: &AccountId) -> bool {
        self.connected.contains(id)
    }

    /// Add to the enabled set. Unknown ids are ignored.
    pub fn mark_enabled(&mut self, id: &AccountId) {
        if self.contains(id) && !self.enabled.contains(id) {
            self.enabled.push(id.clone());
        }
    }

    /// Add to the connected set, and to the enabled set to keep connected ⊆ enabled.
    pub fn mark_connected(&mut self, id: &AccountId) {
        self.mark_enabled(id);
        if self.contains(id) && !self.connected.contains(id) {
            self.connected.push(id.clone());
        }
    }

    pub fn mark_disconnected(&mut self, id: &AccountId) {
        self.connected.retain(|other| other != id);
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl std::fmt::Debug for AccountRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountRegistry")
            .field("accounts", &self.ids())
            .field("enabled", &self.enabled)
            .field("connected", &self.connected)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tomahawk_core::{
        AccountSignals, AccountTypes, ConnectionState, ConnectivityPlugin, signal_channel,
    };

    struct StubAccount {
        id: AccountId,
        types: AccountTypes,
    }

    impl Account for StubAccount {
        fn id(&self) -> &AccountId {
            &self.id
        }
        fn friendly_name(&self) -> &str {
            self.id.as_str()
        }
        fn types(&self) -> AccountTypes {
            self.types
        }
        fn enabled(&self) -> bool {
            true
        }
        fn auto_connect(&self) -> bool {
            true
        }
        fn connection_state(&self) -> ConnectionState {
            ConnectionState::Disconnected
        }
        fn authenticate(&mut self) {}
        fn deauthenticate(&mut self) {}
        fn connectivity_plugin(&self) -> Option<&dyn ConnectivityPlugin> {
            None
        }
        fn connectivity_plugin_mut(&mut self) -> Option<&mut (dyn ConnectivityPlugin + 'static)> {
            None
        }
        fn remove_from_config(&mut self) -> Result<(), TomahawkError> {
            Ok(())
        }
    }

    struct StubFactory(&'static str);

    impl AccountFactory for StubFactory {
        fn factory_id(&self) -> &str {
            self.0
        }
        fn pretty_name(&self) -> &str {
            "Stub"
        }
        fn create_account(&self, id: AccountId, _signals: AccountSignals) -> Box<dyn Account> {
            Box::new(StubAccount {
                id,
                types: AccountType::Connectivity.into(),
            })
        }
    }

    fn stub(id: &str, types: AccountTypes) -> Box<dyn Account> {
        Box::new(StubAccount {
            id: AccountId::from(id),
            types,
        })
    }

    #[test]
    fn factory_register_and_lookup() {
        let mut registry = FactoryRegistry::new();
        assert!(registry.register_builtin(Box::new(StubFactory("xmpp"))).is_none());
        assert!(registry.register_builtin(Box::new(StubFactory("google"))).is_none());

        assert!(registry.contains("xmpp"));
        assert_eq!(registry.get("xmpp").unwrap().pretty_name(), "Stub");
        assert!(registry.entry("xmpp").unwrap().path().is_none());
        assert_eq!(registry.ids(), vec!["google", "xmpp"]);
        assert_eq!(registry.len(), 2);
        assert!(registry.get("twitter").is_none());
    }

    #[test]
    fn factory_collision_returns_previous_entry() {
        let mut registry = FactoryRegistry::new();
        registry.register(
            LoadedFactory {
                factory: Box::new(StubFactory("xmpp")),
                library: None,
            },
            Some(PathBuf::from("/a/libtomahawk_account_xmpp.so")),
        );
        let previous = registry
            .register(
                LoadedFactory {
                    factory: Box::new(StubFactory("xmpp")),
                    library: None,
                },
                Some(PathBuf::from("/b/libtomahawk_account_xmpp.so")),
            )
            .expect("collision should return the replaced entry");

        assert_eq!(previous.path(), Some(Path::new("/a/libtomahawk_account_xmpp.so")));
        assert_eq!(
            registry.entry("xmpp").unwrap().path(),
            Some(Path::new("/b/libtomahawk_account_xmpp.so"))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn factory_creates_accounts() {
        let mut registry = FactoryRegistry::new();
        registry.register_builtin(Box::new(StubFactory("xmpp")));
        let (tx, _rx) = signal_channel();
        let id = AccountId::from("xmpp_alice");
        let account = registry
            .get("xmpp")
            .unwrap()
            .create_account(id.clone(), AccountSignals::new(id.clone(), tx));
        assert_eq!(account.id(), &id);
    }

    #[test]
    fn insert_indexes_every_declared_type() {
        let mut registry = AccountRegistry::new();
        registry
            .insert(stub("xmpp_a", AccountType::Connectivity | AccountType::Resolver))
            .unwrap();
        registry
            .insert(stub("lastfm_b", AccountType::Metadata.into()))
            .unwrap();

        assert_eq!(registry.ids(), vec![AccountId::from("xmpp_a"), AccountId::from("lastfm_b")]);
        assert_eq!(registry.of_type(AccountType::Connectivity), &[AccountId::from("xmpp_a")]);
        assert_eq!(registry.of_type(AccountType::Resolver), &[AccountId::from("xmpp_a")]);
        assert_eq!(registry.of_type(AccountType::Metadata), &[AccountId::from("lastfm_b")]);
        assert_eq!(registry.index_of(&AccountId::from("lastfm_b")), Some(1));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut registry = AccountRegistry::new();
        registry.insert(stub("xmpp_a", AccountType::Connectivity.into())).unwrap();
        let err = registry
            .insert(stub("xmpp_a", AccountType::Connectivity.into()))
            .unwrap_err();
        assert!(matches!(err, TomahawkError::DuplicateAccount(id) if id == "xmpp_a"));
        assert_eq!(registry.of_type(AccountType::Connectivity).len(), 1);
    }

    #[test]
    fn connected_implies_enabled() {
        let mut registry = AccountRegistry::new();
        let id = AccountId::from("xmpp_a");
        registry.insert(stub("xmpp_a", AccountType::Connectivity.into())).unwrap();

        registry.mark_connected(&id);
        assert!(registry.is_connected(&id));
        assert!(registry.is_enabled(&id));

        registry.mark_connected(&id);
        assert_eq!(registry.connected().len(), 1);

        registry.mark_disconnected(&id);
        assert!(!registry.is_connected(&id));
        assert!(registry.is_enabled(&id));
    }

    #[test]
    fn unknown_ids_are_never_marked() {
        let mut registry = AccountRegistry::new();
        let ghost = AccountId::from("xmpp_ghost");
        registry.mark_enabled(&ghost);
        registry.mark_connected(&ghost);
        assert!(registry.enabled().is_empty());
        assert!(registry.connected().is_empty());
    }

    #[test]
    fn remove_purges_all_lists() {
        let mut registry = AccountRegistry::new();
        let id = AccountId::from("xmpp_a");
        registry
            .insert(stub("xmpp_a", AccountType::Connectivity | AccountType::Metadata))
            .unwrap();
        registry.mark_connected(&id);

        let removed = registry.remove(&id).expect("account should be present");
        assert_eq!(removed.id(), &id);
        assert!(registry.is_empty());
        assert!(registry.enabled().is_empty());
        assert!(registry.connected().is_empty());
        assert!(registry.of_type(AccountType::Connectivity).is_empty());
        assert!(registry.of_type(AccountType::Metadata).is_empty());
        assert!(registry.remove(&id).is_none());
    }
}
