// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! The peer network that connectivity plugins are hooked into.

use std::collections::BTreeSet;

use tomahawk_core::AccountId;
use tracing::{debug, info};

/// Receives connectivity plugins and owns the remote sources they produce.
pub trait PeerNetwork {
    /// Start routing peer traffic through the account's connectivity plugin.
    fn hook_up_plugin(&mut self, account_id: &AccountId, plugin_name: &str);

    /// Stop routing through the account's plugin. No-op if it was never hooked up.
    fn unhook_plugin(&mut self, account_id: &AccountId);

    /// Drop every source that came from a remote peer.
    fn remove_all_remote(&mut self);
}

/// In-process peer network used by the binary.
///
/// Tracks which accounts are hooked up and which remote sources are known.
#[derive(Debug, Default)]
pub struct SipHandler {
    hooked: BTreeSet<AccountId>,
    remote_sources: BTreeSet<String>,
}

impl SipHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hooked_up(&self, account_id: &AccountId) -> bool {
        self.hooked.contains(account_id)
    }

    pub fn hooked_up(&self) -> impl Iterator<Item = &AccountId> {
        self.hooked.iter()
    }

    pub fn add_remote_source(&mut self, name: impl Into<String>) {
        self.remote_sources.insert(name.into());
    }

    pub fn remote_sources(&self) -> impl Iterator<Item = &str> {
        self.remote_sources.iter().map(String::as_str)
    }
}

impl PeerNetwork for SipHandler {
    fn hook_up_plugin(&mut self, account_id: &AccountId, plugin_name: &str) {
        if self.hooked.insert(account_id.clone()) {
            info!(account_id = %account_id, plugin = plugin_name, "connectivity plugin hooked up");
        }
    }

    fn unhook_plugin(&mut self, account_id: &AccountId) {
        if self.hooked.remove(account_id) {
            debug!(account_id = %account_id, "connectivity plugin unhooked");
        }
    }

    fn remove_all_remote(&mut self) {
        debug!(count = self.remote_sources.len(), "removing all remote sources");
        self.remote_sources.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_up_is_idempotent() {
        let mut sip = SipHandler::new();
        let id = AccountId::from("xmpp_a");
        sip.hook_up_plugin(&id, "Jabber");
        sip.hook_up_plugin(&id, "Jabber");
        assert_eq!(sip.hooked_up().count(), 1);

        sip.unhook_plugin(&id);
        sip.unhook_plugin(&id);
        assert!(!sip.is_hooked_up(&id));
    }

    #[test]
    fn remove_all_remote_clears_sources() {
        let mut sip = SipHandler::new();
        sip.add_remote_source("alice@jabber.org");
        sip.add_remote_source("bob@gmail.com");
        assert_eq!(sip.remote_sources().count(), 2);

        sip.remove_all_remote();
        assert_eq!(sip.remote_sources().count(), 0);
    }
}
