//! Sample surface data for offline runs.
//!
//! All data in this module is hardcoded and fictional. No external systems are
//! contacted. Some entries deliberately carry one-time codes or financial
//! documents so the policy engine has something to withhold.

use serde_json::{json, Value};

use ordo_contracts::tool::names;

// ── Gmail ─────────────────────────────────────────────────────────────────────

pub fn emails() -> Value {
    json!({
        "emails": [
            {
                "id": "msg-1001",
                "from": "events@solana.com",
                "subject": "Hackathon demo day schedule",
                "snippet": "Demo day starts Friday at 10:00 UTC",
                "body": "Teams present in alphabetical order. Judges will publish results on Monday."
            },
            {
                "id": "msg-1002",
                "from": "no-reply@exchange.example",
                "subject": "Your login code",
                "snippet": "Use 482913 as your verification code",
                "body": "Use 482913 as your verification code. It expires in 10 minutes."
            },
            {
                "id": "msg-1003",
                "from": "statements@bank.example",
                "subject": "Your monthly bank statement is ready",
                "snippet": "View your account balance and recent activity",
                "body": "Your statement for September is available in online banking."
            }
        ]
    })
}

pub fn email_threads() -> Value {
    json!({
        "threads": [
            {
                "id": "thread-77",
                "subject": "Hackathon team formation",
                "snippet": "Looking for a Rust dev to join our DePIN project"
            },
            {
                "id": "thread-78",
                "subject": "Hackathon submission reminder",
                "snippet": "Submissions close Sunday 23:59 UTC"
            }
        ]
    })
}

// ── Social ────────────────────────────────────────────────────────────────────

pub fn x_dms() -> Value {
    json!({
        "messages": [
            { "id": "dm-1", "from": "@validator_vic", "text": "Are you coming to Breakpoint this year?" },
            { "id": "dm-2", "from": "@support_scam", "text": "Send us your seed phrase to verify the wallet" }
        ]
    })
}

pub fn x_mentions() -> Value {
    json!({
        "messages": [
            { "id": "tw-31", "from": "@seeker_news", "text": "Congrats to the winners of the mobile hackathon!" },
            { "id": "tw-32", "from": "@dev_dana", "text": "The new Seed Vault SDK docs are great" }
        ]
    })
}

pub fn telegram_messages() -> Value {
    json!({
        "messages": [
            { "id": 501, "chat": "Seeker Builders", "text": "Standup moved to 15:00" },
            { "id": 502, "chat": "Seeker Builders", "text": "Anyone tried the new token extensions?" }
        ]
    })
}

// ── Wallet ────────────────────────────────────────────────────────────────────

pub fn wallet_portfolio() -> Value {
    json!({
        "total_usd": 1834.52,
        "sol": 8.25,
        "tokens": [
            { "symbol": "USDC", "amount": 420.0 },
            { "symbol": "BONK", "amount": 1250000.0 }
        ]
    })
}

pub fn token_balances() -> Value {
    json!([
        { "mint": "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v", "symbol": "USDC", "amount": 420.0 },
        { "mint": "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263", "symbol": "BONK", "amount": 1250000.0 }
    ])
}

pub fn transaction_history() -> Value {
    json!([
        { "signature": "5h2k...9Qe", "type": "transfer", "amount_sol": -0.5, "counterparty": "7xKX...pL2" },
        { "signature": "3nV8...aZ1", "type": "swap", "from": "USDC", "to": "SOL", "amount_usd": 50.0 }
    ])
}

/// Sample payload for `tool`, if one exists.
pub fn sample_for(tool: &str) -> Option<Value> {
    let data = match tool {
        names::GET_EMAIL_CONTENT => emails(),
        names::SEARCH_EMAIL_THREADS => email_threads(),
        names::GET_X_DMS => x_dms(),
        names::GET_X_MENTIONS => x_mentions(),
        names::GET_TELEGRAM_MESSAGES => telegram_messages(),
        names::GET_WALLET_PORTFOLIO => wallet_portfolio(),
        names::GET_TOKEN_BALANCES => token_balances(),
        names::GET_TRANSACTION_HISTORY => transaction_history(),
        _ => return None,
    };
    Some(data)
}
