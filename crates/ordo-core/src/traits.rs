//! Trait seams of the Ordo pipeline.
//!
//! - `LanguageModel`   : external text generation, may fail
//! - `ToolInvoker`     : per-surface tool execution (MCP in production)
//! - `ContentFilter`   : trusted policy gate applied to every tool result
//! - `AuditSink`       : append-only record of invocations and violations
//! - `IntentClassifier`: maps an intent summary to permissions and tools
//!
//! `OrdoAgent` wires them together. None of them is allowed to abort the
//! pipeline: the agent converts every error into a state entry.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use ordo_contracts::{
    agent::ChatMessage,
    audit::AuditEntry,
    error::OrdoResult,
    permission::Surface,
    tool::ToolResult,
};

use crate::classifier::Classification;

/// A text-generation client.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `system_prompt` followed by `messages` and return the reply text.
    async fn send(&self, system_prompt: &str, messages: &[ChatMessage]) -> OrdoResult<String>;
}

/// Executes named tools on behalf of a user.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Run `tool_name` with `params`. `tokens` maps surface names to the
    /// user's credentials; implementations pick the one they need.
    ///
    /// Returning `Err` and returning a `ToolResult` with `success = false`
    /// are treated the same by the pipeline.
    async fn invoke(
        &self,
        tool_name: &str,
        params: &Value,
        tokens: &BTreeMap<String, String>,
    ) -> OrdoResult<ToolResult>;
}

/// The policy gate every tool result passes through before it reaches the
/// model or the user.
#[async_trait]
pub trait ContentFilter: Send + Sync {
    /// Return `content` with sensitive items withheld. Violations are
    /// attributed to `user_id` on `surface`.
    async fn filter_content(
        &self,
        content: ToolResult,
        surface: Surface,
        user_id: &str,
    ) -> OrdoResult<ToolResult>;
}

/// Receives one entry per tool invocation and per policy violation.
pub trait AuditSink: Send + Sync {
    /// Append `entry`. Entries are never modified once recorded.
    fn record(&self, entry: &AuditEntry) -> OrdoResult<()>;
}

/// Turns a free-text intent into the permissions and tools it needs.
///
/// Must be deterministic: the same intent always yields the same result.
pub trait IntentClassifier: Send + Sync {
    fn classify(&self, intent: &str) -> Classification;
}
