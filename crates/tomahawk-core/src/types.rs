// SPDX-FileCopyrightText: 2026 Tomahawk Contributors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Common types shared by account plugins and the account manager.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Separator between the factory id and the per-account suffix.
pub const ACCOUNT_ID_SEPARATOR: char = '_';

/// The factory prefix of an account id: everything before the first `_`.
///
/// An id without a separator is its own factory id.
pub fn factory_from_id(account_id: &str) -> &str {
    account_id
        .split_once(ACCOUNT_ID_SEPARATOR)
        .map_or(account_id, |(prefix, _)| prefix)
}

/// Identifier of a configured account, formatted as `<factoryId>_<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id for an account of the given factory.
    pub fn generate(factory_id: &str) -> Self {
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        Self(format!("{factory_id}{ACCOUNT_ID_SEPARATOR}{suffix}"))
    }

    /// The factory prefix of this id. See [`factory_from_id`].
    pub fn factory_id(&self) -> &str {
        factory_from_id(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for AccountId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// What an account contributes to the player.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
pub enum AccountType {
    /// Peer discovery and signalling (SIP).
    Connectivity,
    /// Track and artist metadata (Info).
    Metadata,
    /// Remote content resolution.
    Resolver,
}

impl AccountType {
    const fn bit(self) -> u8 {
        match self {
            AccountType::Connectivity => 1 << 0,
            AccountType::Metadata => 1 << 1,
            AccountType::Resolver => 1 << 2,
        }
    }
}

/// A set of [`AccountType`]s. An account may declare any combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AccountTypes(u8);

impl AccountTypes {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, ty: AccountType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub fn insert(&mut self, ty: AccountType) {
        self.0 |= ty.bit();
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate the contained types in declaration order.
    pub fn iter(self) -> impl Iterator<Item = AccountType> {
        AccountType::iter().filter(move |ty| self.contains(*ty))
    }
}

impl From<AccountType> for AccountTypes {
    fn from(ty: AccountType) -> Self {
        Self(ty.bit())
    }
}

impl FromIterator<AccountType> for AccountTypes {
    fn from_iter<I: IntoIterator<Item = AccountType>>(iter: I) -> Self {
        let mut types = Self::empty();
        for ty in iter {
            types.insert(ty);
        }
        types
    }
}

impl BitOr for AccountType {
    type Output = AccountTypes;

    fn bitor(self, rhs: Self) -> AccountTypes {
        AccountTypes(self.bit() | rhs.bit())
    }
}

impl BitOr<AccountType> for AccountTypes {
    type Output = AccountTypes;

    fn bitor(self, rhs: AccountType) -> AccountTypes {
        AccountTypes(self.0 | rhs.bit())
    }
}

impl BitOrAssign<AccountType> for AccountTypes {
    fn bitor_assign(&mut self, rhs: AccountType) {
        self.insert(rhs);
    }
}

impl fmt::Display for AccountTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|ty| ty.to_string()).collect();
        f.write_str(&names.join("|"))
    }
}

/// Connection state of an account's connectivity plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Error classification reported by an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Credentials were rejected. Needs user intervention.
    AuthError,
    /// Network-level failure. Retried automatically.
    ConnectionError,
    /// Plugin-specific code.
    Other(i32),
}

impl ErrorCode {
    pub fn is_auth(self) -> bool {
        matches!(self, ErrorCode::AuthError)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::AuthError => write!(f, "auth-error"),
            ErrorCode::ConnectionError => write!(f, "connection-error"),
            ErrorCode::Other(code) => write!(f, "error-{code}"),
        }
    }
}

/// An error reported by an account at runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountError {
    pub code: ErrorCode,
    pub message: String,
}

impl AccountError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.code)
    }
}
