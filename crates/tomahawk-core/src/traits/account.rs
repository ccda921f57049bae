// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account and connectivity plugin traits.

use crate::error::TomahawkError;
use crate::types::{AccountId, AccountTypes, ConnectionState};

/// Session/connectivity plugin (SIP) attached to an account.
///
/// Responsible for peer discovery and signalling. Not related to the
/// telephony protocol of the same name.
pub trait ConnectivityPlugin: Send {
    /// Human-readable name used in logs.
    fn friendly_name(&self) -> &str;

    /// Start connecting to the peer network.
    fn connect_plugin(&mut self);

    /// Disconnect from the peer network.
    fn disconnect_plugin(&mut self);

    /// Re-read settings after the application configuration changed.
    fn check_settings(&mut self);
}

/// A configured, persisted instance of a plugin family.
///
/// Accounts report errors and connection state changes through the
/// `AccountSignals` handle they receive from their factory.
pub trait Account: Send {
    fn id(&self) -> &AccountId;

    /// Name shown to the user, e.g. the login of the configured credential.
    fn friendly_name(&self) -> &str;

    /// Capabilities this account contributes.
    fn types(&self) -> AccountTypes;

    fn enabled(&self) -> bool;

    fn auto_connect(&self) -> bool;

    fn connection_state(&self) -> ConnectionState;

    /// Begin authenticating. Progress is reported through signals.
    fn authenticate(&mut self);

    /// Drop credentials and disconnect cleanly.
    fn deauthenticate(&mut self);

    fn connectivity_plugin(&self) -> Option<&dyn ConnectivityPlugin>;

    fn connectivity_plugin_mut(&mut self) -> Option<&mut (dyn ConnectivityPlugin + 'static)>;

    /// Purge any per-account configuration the plugin persisted.
    fn remove_from_config(&mut self) -> Result<(), TomahawkError>;
}
