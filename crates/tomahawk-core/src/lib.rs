// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core library for Tomahawk account plugins.
//!
//! This crate provides the trait definitions, error types, and common types
//! shared by the account manager and by plugin libraries. Plugin crates
//! depend on this crate only.

pub mod error;
pub mod signal;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TomahawkError;
pub use signal::{
    AccountSignal, AccountSignalReceiver, AccountSignalSender, AccountSignals, SignalKind,
    signal_channel,
};
pub use types::{
    AccountError, AccountId, AccountType, AccountTypes, ConnectionState, ErrorCode, factory_from_id,
};

pub use traits::{
    ACCOUNT_PLUGIN_ABI_VERSION, Account, AccountFactory, ConnectivityPlugin, PLUGIN_ABI_SYMBOL,
    PLUGIN_ENTRY_SYMBOL,
};
