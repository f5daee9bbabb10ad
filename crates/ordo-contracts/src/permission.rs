//! Permission and surface types.
//!
//! A surface is an external channel the assistant can read from. Every
//! surface is gated by a permission the caller grants per request; grants are
//! never elevated by the pipeline itself.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OrdoError;

/// A capability flag gating access to one surface or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Permission {
    ReadGmail,
    ReadSocialX,
    ReadSocialTelegram,
    ReadWallet,
    SignTransactions,
}

impl Permission {
    /// Every permission, in declaration order.
    pub const ALL: [Permission; 5] = [
        Permission::ReadGmail,
        Permission::ReadSocialX,
        Permission::ReadSocialTelegram,
        Permission::ReadWallet,
        Permission::SignTransactions,
    ];

    /// The wire identifier, e.g. `READ_GMAIL`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ReadGmail => "READ_GMAIL",
            Permission::ReadSocialX => "READ_SOCIAL_X",
            Permission::ReadSocialTelegram => "READ_SOCIAL_TELEGRAM",
            Permission::ReadWallet => "READ_WALLET",
            Permission::SignTransactions => "SIGN_TRANSACTIONS",
        }
    }

    /// What granting this permission lets the assistant do, for permission prompts.
    pub fn description(&self) -> &'static str {
        match self {
            Permission::ReadGmail => "Read Gmail messages (verification and OTP emails stay hidden)",
            Permission::ReadSocialX => "Read X direct messages and mentions",
            Permission::ReadSocialTelegram => "Read Telegram messages",
            Permission::ReadWallet => "View wallet portfolio, balances, and transaction history",
            Permission::SignTransactions => "Prepare transactions for you to sign in Seed Vault",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = OrdoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OrdoError::ConfigError {
                reason: format!("unknown permission '{}'", s),
            })
    }
}

/// The permission grants a caller supplies with a query.
///
/// Keys are wire identifiers (`READ_WALLET`, ...). A permission counts as
/// granted only when its key is present AND mapped to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionGrants {
    inner: BTreeMap<String, bool>,
}

impl PermissionGrants {
    /// Record a grant (or explicit refusal) for `permission`.
    pub fn set(&mut self, permission: Permission, granted: bool) {
        self.inner.insert(permission.as_str().to_string(), granted);
    }

    /// Grant `permission`.
    pub fn grant(&mut self, permission: Permission) {
        self.set(permission, true);
    }

    /// Return true if `permission` is present and granted.
    pub fn has(&self, permission: Permission) -> bool {
        self.inner.get(permission.as_str()).copied().unwrap_or(false)
    }

    /// Iterate over every granted permission key.
    pub fn granted(&self) -> impl Iterator<Item = &str> {
        self.inner
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.as_str())
    }
}

impl From<BTreeMap<String, bool>> for PermissionGrants {
    fn from(inner: BTreeMap<String, bool>) -> Self {
        Self { inner }
    }
}

impl FromIterator<Permission> for PermissionGrants {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut grants = Self::default();
        for permission in iter {
            grants.grant(permission);
        }
        grants
    }
}

/// An external data channel: where a piece of tool output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Surface {
    Gmail,
    X,
    Telegram,
    Wallet,
    Web,
}

impl Surface {
    /// The wire identifier, e.g. `GMAIL`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Surface::Gmail => "GMAIL",
            Surface::X => "X",
            Surface::Telegram => "TELEGRAM",
            Surface::Wallet => "WALLET",
            Surface::Web => "WEB",
        }
    }

    /// Classify a tool name into the surface it reads from.
    ///
    /// Total: names that match no keyword land on `Web`.
    pub fn from_tool(tool_name: &str) -> Self {
        let tool = tool_name.to_lowercase();
        if tool.contains("email") || tool.contains("gmail") {
            Surface::Gmail
        } else if tool.contains("x_") || tool.contains("twitter") {
            Surface::X
        } else if tool.contains("telegram") {
            Surface::Telegram
        } else if tool.contains("wallet") || tool.contains("token") || tool.contains("transaction") {
            Surface::Wallet
        } else {
            Surface::Web
        }
    }
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Surface {
    type Err = OrdoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GMAIL" => Ok(Surface::Gmail),
            "X" => Ok(Surface::X),
            "TELEGRAM" => Ok(Surface::Telegram),
            "WALLET" => Ok(Surface::Wallet),
            "WEB" => Ok(Surface::Web),
            other => Err(OrdoError::ConfigError {
                reason: format!("unknown surface '{}'", other),
            }),
        }
    }
}
