// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account plugin discovery, loading, and lifecycle management.
//!
//! Startup flows one way: the [`PluginLocator`] finds candidate libraries,
//! the [`PluginLoader`] turns them into factories in a [`FactoryRegistry`],
//! and the [`AccountManager`] instantiates persisted accounts from those
//! factories. From then on the manager reacts to account signals, settings
//! changes, and user actions, and reports every change to its observers.

pub mod events;
pub mod loader;
pub mod locator;
pub mod manager;
pub mod peer;
pub mod registry;
pub mod retry;

pub use events::{AccountEvent, AccountObserver, ObserverList};
pub use loader::{
    DynamicLoader, FactoryCollision, LoadReport, LoadedFactory, PluginLoader, is_library,
    load_plugin_factories,
};
pub use locator::{PluginLocator, is_plugin_file_name};
pub use manager::{AccountManager, ConfigLoadSummary, DEFAULT_RETRY_DELAY, LifecycleConfig};
pub use peer::{PeerNetwork, SipHandler};
pub use registry::{AccountRegistry, FactoryEntry, FactoryRegistry};
pub use retry::RetrySchedule;

use tracing::info;

/// Locate and load every account plugin visible to `locator`.
pub fn discover(locator: &PluginLocator, loader: &dyn PluginLoader) -> (FactoryRegistry, LoadReport) {
    let candidates = locator.find_plugin_factories();
    let mut registry = FactoryRegistry::new();
    let report = load_plugin_factories(&candidates, loader, &mut registry);
    info!(
        candidates = candidates.len(),
        loaded = registry.len(),
        failed = report.failures.len(),
        "account plugin discovery finished"
    );
    (registry, report)
}
