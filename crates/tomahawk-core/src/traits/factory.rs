// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Account factory trait and the dynamic-loading entry points.
//!
//! # Exporting a plugin
//!
//! ```rust,ignore
//! #[unsafe(no_mangle)]
//! pub extern "C" fn tomahawk_account_abi_version() -> u32 {
//!     tomahawk_core::ACCOUNT_PLUGIN_ABI_VERSION
//! }
//!
//! #[unsafe(no_mangle)]
//! pub extern "C" fn tomahawk_account_factory_entry() -> Box<dyn AccountFactory> {
//!     Box::new(XmppAccountFactory::default())
//! }
//! ```

use crate::signal::AccountSignals;
use crate::traits::account::Account;
use crate::types::AccountId;

/// Version of the plugin ABI. Bumped whenever [`AccountFactory`] or
/// [`Account`] change shape.
pub const ACCOUNT_PLUGIN_ABI_VERSION: u32 = 1;

/// Symbol returning the ABI version the plugin was built against.
pub const PLUGIN_ABI_SYMBOL: &str = "tomahawk_account_abi_version";

/// Symbol returning the plugin's factory.
pub const PLUGIN_ENTRY_SYMBOL: &str = "tomahawk_account_factory_entry";

pub type AbiVersionFn = unsafe extern "C" fn() -> u32;

#[allow(improper_ctypes_definitions)]
pub type FactoryEntryFn = unsafe extern "C" fn() -> Box<dyn AccountFactory>;

/// Manufactures accounts for one plugin family.
pub trait AccountFactory: Send + Sync {
    /// Identifier of the plugin family, used as the account id prefix.
    fn factory_id(&self) -> &str;

    fn pretty_name(&self) -> &str;

    /// Create an account for a persisted (or freshly generated) id.
    fn create_account(&self, id: AccountId, signals: AccountSignals) -> Box<dyn Account>;
}
