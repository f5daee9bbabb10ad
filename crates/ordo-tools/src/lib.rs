//! # ordo-tools
//!
//! The Ordo tool vocabulary and a mock tool invoker.
//!
//! Each tool reads one surface (Gmail, X, Telegram, wallet, web) and is gated
//! by one permission. Real deployments talk to per-surface tool servers; this
//! crate provides `MockToolInvoker`, which implements
//! [`ToolInvoker`](ordo_core::traits::ToolInvoker) with canned, fictional
//! data so the pipeline can run without network access.

pub mod catalog;
pub mod invoker;
pub mod mock_data;

pub use catalog::{catalog, lookup, ToolSpec};
pub use invoker::MockToolInvoker;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use ordo_contracts::{
        error::OrdoError,
        permission::{Permission, Surface},
    };
    use ordo_core::{
        traits::{IntentClassifier, ToolInvoker},
        KeywordClassifier,
    };

    use super::*;

    #[test]
    fn catalog_surfaces_agree_with_tool_names() {
        for spec in catalog() {
            assert_eq!(Surface::from_tool(spec.name), spec.surface, "surface mismatch for {}", spec.name);
        }
    }

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<&str> = catalog().iter().map(|s| s.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), catalog().len());
    }

    #[test]
    fn lookup_finds_permissions() {
        assert_eq!(lookup("get_x_dms").unwrap().permission, Some(Permission::ReadSocialX));
        assert_eq!(lookup("search_web").unwrap().permission, None);
        assert!(lookup("delete_everything").is_none());
    }

    #[test]
    fn classifier_only_selects_catalog_tools() {
        let intent = "search my email, check wallet portfolio balance and transaction history";
        for tool in KeywordClassifier.classify(intent).tools {
            assert!(lookup(&tool).is_some(), "{tool} is not in the catalog");
        }
    }

    #[test]
    fn tools_for_surface_filters() {
        let wallet: Vec<&str> = catalog::tools_for_surface(Surface::Wallet).map(|s| s.name).collect();
        assert_eq!(
            wallet,
            vec![
                "get_wallet_portfolio",
                "get_token_balances",
                "get_transaction_history",
                "build_transfer_transaction"
            ]
        );
    }

    #[tokio::test]
    async fn mock_returns_placeholder_data() {
        let result = MockToolInvoker::new()
            .invoke("get_wallet_portfolio", &json!({}), &BTreeMap::new())
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(result.data, Some(json!("Mock data from get_wallet_portfolio")));
    }

    #[tokio::test]
    async fn fixtures_override_placeholder() {
        let invoker = MockToolInvoker::new().with_fixture("get_token_balances", json!([{"symbol": "SOL"}]));

        let result = invoker.invoke("get_token_balances", &json!({}), &BTreeMap::new()).await.unwrap();

        assert_eq!(result.data, Some(json!([{"symbol": "SOL"}])));
    }

    #[tokio::test]
    async fn sample_data_covers_read_tools() {
        let invoker = MockToolInvoker::with_sample_data();

        let result = invoker.invoke("get_email_content", &json!({}), &BTreeMap::new()).await.unwrap();

        let emails = result.data.unwrap();
        assert_eq!(emails["emails"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn injected_failure_is_tool_failed() {
        let invoker = MockToolInvoker::new().with_failure("get_x_mentions", "rate limited");

        let err = invoker.invoke("get_x_mentions", &json!({}), &BTreeMap::new()).await.unwrap_err();

        match err {
            OrdoError::ToolFailed { tool, reason } => {
                assert_eq!(tool, "get_x_mentions");
                assert_eq!(reason, "rate limited");
            }
            other => panic!("expected ToolFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_tool_is_rejected() {
        let err = MockToolInvoker::new()
            .invoke("delete_everything", &json!({}), &BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, OrdoError::UnknownTool { tool } if tool == "delete_everything"));
    }

    // ── Full pipeline over the sample data ───────────────────────────────────

    mod pipeline {
        use std::sync::{Arc, Mutex};

        use async_trait::async_trait;

        use ordo_audit::InMemoryAuditTrail;
        use ordo_contracts::{
            agent::{ChatMessage, QueryContext},
            audit::AuditEntry,
            error::{OrdoError, OrdoResult},
            permission::Permission,
        };
        use ordo_core::{
            traits::{AuditSink, LanguageModel},
            OrdoAgent,
        };
        use ordo_llm::OfflineModel;
        use ordo_policy::PolicyEngine;
        use serde_json::json;

        use crate::MockToolInvoker;

        const OTP: &str = "482913";

        /// Offline model that keeps every prompt it was sent.
        #[derive(Default)]
        struct RecordingModel {
            prompts: Mutex<Vec<String>>,
        }

        #[async_trait]
        impl LanguageModel for RecordingModel {
            async fn send(&self, system_prompt: &str, messages: &[ChatMessage]) -> OrdoResult<String> {
                self.prompts
                    .lock()
                    .unwrap()
                    .extend(messages.iter().map(|m| m.content.clone()));
                OfflineModel.send(system_prompt, messages).await
            }
        }

        struct BrokenAudit;

        impl AuditSink for BrokenAudit {
            fn record(&self, _entry: &AuditEntry) -> OrdoResult<()> {
                Err(OrdoError::AuditWriteFailed { reason: "disk full".to_string() })
            }
        }

        fn gmail_user() -> QueryContext {
            QueryContext::for_user("user-7").with_permission(Permission::ReadGmail, true)
        }

        #[tokio::test]
        async fn blocked_emails_never_reach_model_or_sources() {
            let trail = Arc::new(InMemoryAuditTrail::new());
            let policy = PolicyEngine::new().unwrap().with_audit(trail.clone());
            let model = Arc::new(RecordingModel::default());
            let agent = OrdoAgent::new(Arc::new(policy), Arc::new(MockToolInvoker::with_sample_data()))
                .with_model(model.clone());

            let result = agent.process_query("Summarize my emails", gmail_user()).await;

            assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
            assert!(!result.response.contains(OTP));

            let prompts = model.prompts.lock().unwrap();
            let context = prompts.last().unwrap();
            assert!(context.contains("msg-1001"), "clean email missing from context: {context}");
            for blocked in ["msg-1002", "msg-1003", OTP] {
                assert!(!context.contains(blocked), "{blocked} reached the model");
            }

            assert_eq!(result.sources.len(), 1);
            for blocked in ["msg-1002", "msg-1003", OTP] {
                assert!(!result.sources[0].preview.contains(blocked));
            }

            let violations = trail.violations();
            let ids: Vec<&str> = violations.iter().filter_map(|v| v.details["entry_id"].as_str()).collect();
            assert_eq!(ids, vec!["msg-1002", "msg-1003"]);
            assert!(violations.iter().all(|v| v.user_id == "user-7"));
        }

        #[tokio::test]
        async fn broken_audit_sink_does_not_undo_filtering() {
            let policy = PolicyEngine::new().unwrap().with_audit(Arc::new(BrokenAudit));
            let model = Arc::new(RecordingModel::default());
            let agent = OrdoAgent::new(Arc::new(policy), Arc::new(MockToolInvoker::with_sample_data()))
                .with_model(model.clone());

            let result = agent.process_query("Summarize my emails", gmail_user()).await;

            assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
            assert!(!result.response.contains(OTP), "OTP leaked: {}", result.response);
            assert!(model.prompts.lock().unwrap().iter().all(|p| !p.contains(OTP)));
        }

        #[tokio::test]
        async fn wallet_memo_is_withheld_before_the_model() {
            let tools = MockToolInvoker::new().with_fixture(
                "get_wallet_portfolio",
                json!({"sol": 2.5, "memo": "seed phrase: word 1 apple, SSN 123-45-6789"}),
            );
            let model = Arc::new(RecordingModel::default());
            let agent = OrdoAgent::new(Arc::new(PolicyEngine::new().unwrap()), Arc::new(tools))
                .with_model(model.clone());
            let context = QueryContext::for_user("user-7").with_permission(Permission::ReadWallet, true);

            let result = agent.process_query("What is my wallet balance?", context).await;

            assert!(result.errors.is_empty(), "unexpected errors: {:?}", result.errors);
            for leaked in ["apple", "123-45-6789"] {
                assert!(!result.response.contains(leaked));
                assert!(model.prompts.lock().unwrap().iter().all(|p| !p.contains(leaked)));
            }
            assert!(result.response.contains("[withheld"));
        }
    }
}
