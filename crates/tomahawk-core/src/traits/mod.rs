// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Trait definitions for the account plugin architecture.
//!
//! A plugin library exports one [`AccountFactory`]; the factory manufactures
//! [`Account`]s, and accounts with connectivity capability expose a
//! [`ConnectivityPlugin`].

pub mod account;
pub mod factory;

pub use account::{Account, ConnectivityPlugin};
pub use factory::{
    ACCOUNT_PLUGIN_ABI_VERSION, AbiVersionFn, AccountFactory, FactoryEntryFn, PLUGIN_ABI_SYMBOL,
    PLUGIN_ENTRY_SYMBOL,
};
