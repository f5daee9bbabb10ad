//! # ordo-policy
//!
//! The sensitive-content policy engine for the Ordo assistant.
//!
//! ## Overview
//!
//! This crate provides [`PolicyEngine`], which implements the
//! [`ContentFilter`](ordo_core::traits::ContentFilter) trait. It recognizes
//! one-time codes, recovery phrases, password resets, bank and tax documents,
//! SSNs and card numbers, and removes matching entries from tool output
//! before the output reaches the language model.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use ordo_policy::PolicyEngine;
//!
//! let engine = PolicyEngine::from_settings(&config.policy)?;
//! // Pass `Arc::new(engine)` to `ordo_core::OrdoAgent::new(...)`.
//! ```
//!
//! ## Extra categories
//!
//! Deployments add categories with `[[policy.patterns]]` tables holding a
//! `name` and a `regex`. Extra patterns are evaluated after the built-ins and
//! are always case-insensitive.

pub mod engine;
pub mod pattern;

pub use engine::{BlockedEntry, PolicyEngine};
pub use pattern::SensitivePattern;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use ordo_contracts::{
        audit::AuditEntry,
        error::{OrdoError, OrdoResult},
        permission::Surface,
        tool::ToolResult,
    };
    use ordo_core::traits::{AuditSink, ContentFilter};

    use crate::PolicyEngine;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn engine() -> PolicyEngine {
        PolicyEngine::new().unwrap()
    }

    #[derive(Default)]
    struct RecordingAudit {
        entries: Mutex<Vec<AuditEntry>>,
    }

    impl AuditSink for RecordingAudit {
        fn record(&self, entry: &AuditEntry) -> OrdoResult<()> {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    struct BrokenAudit;

    impl AuditSink for BrokenAudit {
        fn record(&self, _entry: &AuditEntry) -> OrdoResult<()> {
            Err(OrdoError::AuditWriteFailed { reason: "disk full".to_string() })
        }
    }

    // ── 1. scanning ───────────────────────────────────────────────────────────

    #[test]
    fn test_ssn_is_sensitive() {
        let (sensitive, patterns) = engine().is_sensitive("My SSN is 123-45-6789");
        assert!(sensitive);
        assert!(patterns.contains(&"SSN".to_string()), "got {patterns:?}");
    }

    #[test]
    fn test_empty_text_is_not_sensitive() {
        assert_eq!(engine().is_sensitive(""), (false, Vec::new()));
    }

    #[test]
    fn test_plain_text_is_not_sensitive() {
        let (sensitive, patterns) = engine().is_sensitive("Lunch at noon tomorrow?");
        assert!(!sensitive);
        assert!(patterns.is_empty());
    }

    #[test]
    fn test_otp_code_is_case_insensitive() {
        let (sensitive, patterns) = engine().is_sensitive("483920 is your OTP");
        assert!(sensitive);
        assert!(patterns.contains(&"OTP_CODE".to_string()));
    }

    /// Every matching category is reported, not only the first.
    #[test]
    fn test_all_matching_categories_reported() {
        let text = "123456 is your verification code. Card 4111 1111 1111 1111, SSN 123-45-6789";
        let (_, patterns) = engine().is_sensitive(text);

        for expected in ["OTP_CODE", "VERIFICATION_CODE", "SSN", "CREDIT_CARD"] {
            assert!(patterns.contains(&expected.to_string()), "missing {expected} in {patterns:?}");
        }
    }

    #[test]
    fn test_recovery_and_financial_documents() {
        let e = engine();
        assert!(e.is_sensitive("Write down your seed phrase").1.contains(&"RECOVERY_PHRASE".to_string()));
        assert!(e.is_sensitive("Click here to reset your password").1.contains(&"PASSWORD_RESET".to_string()));
        assert!(e.is_sensitive("Your bank statement is ready").1.contains(&"BANK_STATEMENT".to_string()));
        assert!(e.is_sensitive("Your W-2 is attached").1.contains(&"TAX_DOCUMENT".to_string()));
    }

    #[test]
    fn test_scan_content_attributes_surface() {
        let scan = engine().scan_content("routing number 021000021", Surface::Gmail);
        assert!(scan.is_sensitive);
        assert_eq!(scan.patterns, vec!["BANK_STATEMENT".to_string()]);
        assert_eq!(scan.surface, Surface::Gmail);
    }

    // ── 2. configured patterns ────────────────────────────────────────────────

    #[test]
    fn test_custom_pattern_from_toml() {
        let toml = r#"
            [[patterns]]
            name = "INTERNAL_TICKET"
            regex = "ticket-\\d+"
        "#;

        let engine = PolicyEngine::from_toml_str(toml).unwrap();

        assert_eq!(engine.categories().last(), Some(&"INTERNAL_TICKET"));
        let (sensitive, patterns) = engine.is_sensitive("see TICKET-42");
        assert!(sensitive);
        assert_eq!(patterns, vec!["INTERNAL_TICKET".to_string()]);
    }

    #[test]
    fn test_invalid_custom_regex_is_config_error() {
        let toml = r#"
            [[patterns]]
            name = "BROKEN"
            regex = "(unclosed"
        "#;

        match PolicyEngine::from_toml_str(toml) {
            Err(OrdoError::ConfigError { reason }) => {
                assert!(reason.contains("BROKEN"), "unexpected reason: {reason}");
            }
            Err(other) => panic!("expected ConfigError, got {other:?}"),
            Ok(_) => panic!("expected ConfigError, got an engine"),
        }
    }

    #[test]
    fn test_toml_parse_error() {
        match PolicyEngine::from_toml_str("this is not valid toml ][[[") {
            Err(OrdoError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse policy TOML"), "got: {reason}");
            }
            _ => panic!("expected ConfigError"),
        }
    }

    // ── 3. list filters ───────────────────────────────────────────────────────

    #[test]
    fn test_filter_emails_drops_sensitive_entries() {
        let emails = vec![
            json!({"id": "m1", "subject": "Hackathon schedule", "body": "Demo day is Friday"}),
            json!({"id": "m2", "subject": "Your login code", "body": "Use 482913 as your verification code"}),
            json!({"id": "m3", "subject": "Statement", "snippet": "Your bank statement is available"}),
        ];

        let kept = engine().filter_emails(emails);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0]["id"], "m1");
    }

    #[test]
    fn test_filter_messages_scans_text() {
        let messages = vec![
            json!({"message_id": 7, "text": "gm"}),
            json!({"message_id": 8, "text": "my ssn is 123-45-6789"}),
        ];

        let kept = engine().filter_messages(messages);

        assert_eq!(kept, vec![json!({"message_id": 7, "text": "gm"})]);
    }

    // ── 4. filter_content ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_filter_content_nested_emails_and_audit() {
        let audit = Arc::new(RecordingAudit::default());
        let engine = engine().with_audit(audit.clone());
        let result = ToolResult::ok(json!({
            "emails": [
                {"id": "a", "subject": "Team sync", "body": "Agenda attached"},
                {"id": "b", "subject": "Reset", "body": "Reset your password here"}
            ],
            "total": 2
        }));

        let filtered = engine.filter_content(result, Surface::Gmail, "user-1").await.unwrap();

        let data = filtered.data.unwrap();
        assert_eq!(data["emails"].as_array().unwrap().len(), 1);
        assert_eq!(data["total"], 2);

        let entries = audit.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "filter_content");
        assert!(entries[0].policy_violation);
        assert_eq!(entries[0].blocked_pattern.as_deref(), Some("PASSWORD_RESET"));
        assert_eq!(entries[0].user_id, "user-1");
        assert_eq!(entries[0].details["entry_id"], "b");
    }

    #[tokio::test]
    async fn test_filter_content_withholds_sensitive_text() {
        let result = ToolResult::ok("Your code 123456 is your OTP");

        let filtered = engine().filter_content(result, Surface::Telegram, "u").await.unwrap();

        let text = filtered.data_text();
        assert!(text.starts_with("[withheld"), "got: {text}");
        assert!(!text.contains("123456"));
        assert!(filtered.success);
    }

    #[tokio::test]
    async fn test_filter_content_passes_clean_and_failed_results() {
        let e = engine();

        let clean = ToolResult::ok("Mock data from get_wallet_portfolio");
        assert_eq!(e.filter_content(clean.clone(), Surface::Wallet, "u").await.unwrap(), clean);

        let failed = ToolResult::failed("rpc timeout");
        assert_eq!(e.filter_content(failed.clone(), Surface::Wallet, "u").await.unwrap(), failed);

        let portfolio = ToolResult::ok(json!({"sol": 2.5, "tokens": ["BONK"]}));
        assert_eq!(e.filter_content(portfolio.clone(), Surface::Wallet, "u").await.unwrap(), portfolio);
    }

    #[tokio::test]
    async fn test_audit_failure_keeps_filtered_content() {
        let engine = engine().with_audit(Arc::new(BrokenAudit));
        let result = ToolResult::ok(json!([
            {"id": 1, "text": "gm"},
            {"id": 2, "text": "seed phrase: word 1 apple"}
        ]));

        let filtered = engine.filter_content(result, Surface::X, "u").await.unwrap();

        assert_eq!(filtered.data, Some(json!([{"id": 1, "text": "gm"}])));
    }

    // ── 5. single entries and nested text ─────────────────────────────────────

    #[tokio::test]
    async fn test_single_email_object_is_withheld() {
        let audit = Arc::new(RecordingAudit::default());
        let engine = engine().with_audit(audit.clone());
        let result = ToolResult::ok(json!({
            "id": "m2",
            "subject": "Your login code",
            "body": "Use 482913 as your verification code"
        }));

        let filtered = engine.filter_content(result, Surface::Gmail, "u").await.unwrap();

        let text = filtered.data_text();
        assert!(text.starts_with("[withheld"), "got: {text}");
        assert!(!text.contains("482913"));

        let entries = audit.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].details["entry_id"], "m2");
    }

    #[tokio::test]
    async fn test_sensitive_field_under_unlisted_key_is_withheld() {
        let result = ToolResult::ok(json!({
            "sol": 2.5,
            "memo": "seed phrase: word 1 apple, SSN 123-45-6789"
        }));

        let filtered = engine().filter_content(result, Surface::Wallet, "u").await.unwrap();

        let data = filtered.data.unwrap();
        assert_eq!(data["sol"], 2.5);
        let memo = data["memo"].as_str().unwrap();
        assert!(memo.starts_with("[withheld"), "got: {memo}");
        assert!(memo.contains("SSN"));
        assert!(!memo.contains("apple"));
    }

    #[test]
    fn test_nested_lists_and_side_fields_are_scanned() {
        let data = json!({
            "account": {
                "history": [
                    {"id": "t1", "text": "swap USDC to SOL"},
                    {"id": "t2", "text": "Your bank statement is ready"}
                ]
            },
            "emails": [
                {"id": "a", "subject": "Agenda", "from": "ops@example.com"},
                {"id": "b", "subject": "Notes", "attachment": "tax return 2023.pdf"}
            ]
        });

        let (clean, blocked) = engine().filter_value(data, Surface::Telegram);

        assert_eq!(clean["account"]["history"].as_array().unwrap().len(), 1);
        assert_eq!(clean["emails"].as_array().unwrap().len(), 2);
        assert!(clean["emails"][1]["attachment"].as_str().unwrap().starts_with("[withheld"));
        assert_eq!(clean["emails"][0], json!({"id": "a", "subject": "Agenda", "from": "ops@example.com"}));

        let ids: Vec<&str> = blocked.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "attachment"]);
    }
}
