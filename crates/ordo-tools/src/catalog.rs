//! The fixed tool vocabulary.

use serde::Serialize;

use ordo_contracts::{
    permission::{Permission, Surface},
    tool::names,
};

/// Static description of one tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub surface: Surface,
    /// Permission the user must grant before the tool may run. Web search
    /// needs none.
    pub permission: Option<Permission>,
    pub description: &'static str,
}

const CATALOG: [ToolSpec; 10] = [
    ToolSpec {
        name: names::GET_EMAIL_CONTENT,
        surface: Surface::Gmail,
        permission: Some(Permission::ReadGmail),
        description: "Read the content of recent or specific Gmail messages",
    },
    ToolSpec {
        name: names::SEARCH_EMAIL_THREADS,
        surface: Surface::Gmail,
        permission: Some(Permission::ReadGmail),
        description: "Search Gmail threads by keyword, sender or date",
    },
    ToolSpec {
        name: names::GET_X_DMS,
        surface: Surface::X,
        permission: Some(Permission::ReadSocialX),
        description: "Read X (Twitter) direct messages",
    },
    ToolSpec {
        name: names::GET_X_MENTIONS,
        surface: Surface::X,
        permission: Some(Permission::ReadSocialX),
        description: "Read recent X (Twitter) mentions",
    },
    ToolSpec {
        name: names::GET_TELEGRAM_MESSAGES,
        surface: Surface::Telegram,
        permission: Some(Permission::ReadSocialTelegram),
        description: "Read Telegram chat messages",
    },
    ToolSpec {
        name: names::GET_WALLET_PORTFOLIO,
        surface: Surface::Wallet,
        permission: Some(Permission::ReadWallet),
        description: "Summarize the Solana wallet portfolio and its value",
    },
    ToolSpec {
        name: names::GET_TOKEN_BALANCES,
        surface: Surface::Wallet,
        permission: Some(Permission::ReadWallet),
        description: "List SPL token balances held by the wallet",
    },
    ToolSpec {
        name: names::GET_TRANSACTION_HISTORY,
        surface: Surface::Wallet,
        permission: Some(Permission::ReadWallet),
        description: "List recent wallet transactions",
    },
    ToolSpec {
        name: names::BUILD_TRANSFER_TRANSACTION,
        surface: Surface::Wallet,
        permission: Some(Permission::SignTransactions),
        description: "Build an unsigned transfer for the user to sign in Seed Vault",
    },
    ToolSpec {
        name: names::SEARCH_WEB,
        surface: Surface::Web,
        permission: None,
        description: "Search the web and Solana ecosystem documentation",
    },
];

/// Every known tool.
pub fn catalog() -> &'static [ToolSpec] {
    &CATALOG
}

pub fn lookup(name: &str) -> Option<&'static ToolSpec> {
    CATALOG.iter().find(|spec| spec.name == name)
}

/// Tools that read from `surface`.
pub fn tools_for_surface(surface: Surface) -> impl Iterator<Item = &'static ToolSpec> {
    CATALOG.iter().filter(move |spec| spec.surface == surface)
}
