//! Keyword-driven intent classification.
//!
//! `KeywordClassifier` is a heuristic: it looks for surface keywords in the
//! model's intent summary. It sits behind `IntentClassifier` so a
//! function-calling classifier can replace it without touching the pipeline.

use serde::{Deserialize, Serialize};

use ordo_contracts::{permission::Permission, tool::names};

use crate::traits::IntentClassifier;

/// What an intent needs: the permissions to check and the tools to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub permissions: Vec<Permission>,
    pub tools: Vec<String>,
}

/// Maps intent keywords to permissions and tools.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Permissions implied by a lower-cased intent, in `Permission::ALL` order.
    pub fn required_permissions(&self, intent: &str) -> Vec<Permission> {
        let mut required = Vec::new();

        if intent.contains("gmail") || intent.contains("email") {
            required.push(Permission::ReadGmail);
        }
        // A bare "x" is only meaningful as a word; as a substring it would
        // match "explain", "tax", "next", ...
        if has_word(intent, "x") || intent.contains("twitter") {
            required.push(Permission::ReadSocialX);
        }
        if intent.contains("telegram") {
            required.push(Permission::ReadSocialTelegram);
        }
        if intent.contains("wallet") || intent.contains("portfolio") || intent.contains("balance") {
            required.push(Permission::ReadWallet);
        }
        if intent.contains("send") || intent.contains("transfer") || intent.contains("sign") {
            required.push(Permission::SignTransactions);
        }

        required
    }

    /// Tools implied by a lower-cased intent, in keyword-check order.
    pub fn select_tools(&self, intent: &str) -> Vec<String> {
        let mut tools = Vec::new();

        if intent.contains("gmail") || intent.contains("email") {
            if intent.contains("search") {
                tools.push(names::SEARCH_EMAIL_THREADS.to_string());
            } else {
                tools.push(names::GET_EMAIL_CONTENT.to_string());
            }
        }
        if intent.contains("wallet") || intent.contains("portfolio") {
            tools.push(names::GET_WALLET_PORTFOLIO.to_string());
        }
        if intent.contains("balance") {
            tools.push(names::GET_TOKEN_BALANCES.to_string());
        }
        if intent.contains("transaction") && intent.contains("history") {
            tools.push(names::GET_TRANSACTION_HISTORY.to_string());
        }

        tools
    }
}

impl IntentClassifier for KeywordClassifier {
    fn classify(&self, intent: &str) -> Classification {
        let intent = intent.to_lowercase();
        Classification {
            permissions: self.required_permissions(&intent),
            tools: self.select_tools(&intent),
        }
    }
}

fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric()).any(|w| w == word)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(intent: &str) -> Classification {
        KeywordClassifier.classify(intent)
    }

    #[test]
    fn wallet_intent_needs_read_wallet() {
        let c = classify("User wants to check their wallet balance");
        assert_eq!(c.permissions, vec![Permission::ReadWallet]);
        assert_eq!(
            c.tools,
            vec!["get_wallet_portfolio".to_string(), "get_token_balances".to_string()]
        );
    }

    #[test]
    fn x_mentions_need_read_social_x() {
        let c = classify("User wants to check their X mentions");
        assert!(c.permissions.contains(&Permission::ReadSocialX));
    }

    #[test]
    fn x_inside_other_words_is_ignored() {
        let c = classify("Explain the next tax deadline");
        assert!(!c.permissions.contains(&Permission::ReadSocialX));
    }

    #[test]
    fn gmail_search_selects_thread_search() {
        let c = classify("User wants to search their Gmail for hackathon emails");
        assert_eq!(c.tools, vec!["search_email_threads".to_string()]);
        assert_eq!(c.permissions, vec![Permission::ReadGmail]);
    }

    #[test]
    fn gmail_without_search_reads_content() {
        let c = classify("Summarize my latest email");
        assert_eq!(c.tools, vec!["get_email_content".to_string()]);
    }

    #[test]
    fn transaction_history_needs_both_keywords() {
        assert!(classify("show my transaction").tools.is_empty());
        assert_eq!(
            classify("show my transaction history").tools,
            vec!["get_transaction_history".to_string()]
        );
    }

    #[test]
    fn transfer_requires_signing() {
        let c = classify("Transfer 2 SOL from my wallet");
        assert!(c.permissions.contains(&Permission::SignTransactions));
        assert!(c.permissions.contains(&Permission::ReadWallet));
    }

    #[test]
    fn unknown_intent_needs_nothing() {
        assert_eq!(classify("unknown"), Classification::default());
    }

    #[test]
    fn classification_is_deterministic() {
        let intent = "Check my emails, telegram and wallet portfolio";
        assert_eq!(classify(intent), classify(intent));
    }
}
