// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Signals raised by accounts and consumed by the account manager.
//!
//! Accounts never call back into the manager directly. Each account is handed
//! an [`AccountSignals`] handle when it is created and reports errors and
//! connection state changes through it. The control loop drains the receiving
//! end and feeds each [`AccountSignal`] to the manager on the same thread.

use tokio::sync::mpsc;
use tracing::debug;

use crate::types::{AccountError, AccountId, ConnectionState};

/// What happened to an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalKind {
    Error(AccountError),
    StateChanged(ConnectionState),
}

/// A signal tagged with the account that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSignal {
    pub account_id: AccountId,
    pub kind: SignalKind,
}

pub type AccountSignalSender = mpsc::UnboundedSender<AccountSignal>;
pub type AccountSignalReceiver = mpsc::UnboundedReceiver<AccountSignal>;

/// Create the channel that carries account signals to the control loop.
pub fn signal_channel() -> (AccountSignalSender, AccountSignalReceiver) {
    mpsc::unbounded_channel()
}

/// Per-account handle for raising signals.
#[derive(Debug, Clone)]
pub struct AccountSignals {
    account_id: AccountId,
    sender: AccountSignalSender,
}

impl AccountSignals {
    pub fn new(account_id: AccountId, sender: AccountSignalSender) -> Self {
        Self { account_id, sender }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn error(&self, error: AccountError) {
        self.send(SignalKind::Error(error));
    }

    pub fn state_changed(&self, state: ConnectionState) {
        self.send(SignalKind::StateChanged(state));
    }

    fn send(&self, kind: SignalKind) {
        let signal = AccountSignal {
            account_id: self.account_id.clone(),
            kind,
        };
        // The manager may already be gone during shutdown.
        if self.sender.send(signal).is_err() {
            debug!(account_id = %self.account_id, "signal dropped, control loop closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorCode;

    #[test]
    fn signals_are_tagged_with_account_id() {
        let (tx, mut rx) = signal_channel();
        let signals = AccountSignals::new(AccountId::from("xmpp_alice"), tx);

        signals.state_changed(ConnectionState::Connecting);
        signals.error(AccountError::new(ErrorCode::ConnectionError, "timeout"));

        let first = rx.try_recv().unwrap();
        assert_eq!(first.account_id.as_str(), "xmpp_alice");
        assert_eq!(first.kind, SignalKind::StateChanged(ConnectionState::Connecting));

        let second = rx.try_recv().unwrap();
        assert!(matches!(second.kind, SignalKind::Error(ref e) if e.message == "timeout"));
    }

    #[test]
    fn sending_after_receiver_dropped_does_not_panic() {
        let (tx, rx) = signal_channel();
        drop(rx);
        let signals = AccountSignals::new(AccountId::from("xmpp_bob"), tx);
        signals.state_changed(ConnectionState::Disconnected);
    }
}
