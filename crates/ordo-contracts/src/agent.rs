//! Agent state and request/response types.
//!
//! `AgentState` is the single record threaded through the pipeline. Each
//! stage takes it by value and hands back the next version; nothing outlives
//! one `process_query` call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    permission::{Permission, PermissionGrants},
    tool::{Source, ToolResults},
};

/// Unique identifier for one query's trip through the pipeline.
///
/// Appears in every log event emitted while the query is processed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub uuid::Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

/// Who authored a conversational turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Human,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self { role: Role::Human, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// What the caller knows about the user making a query.
///
/// Every field is optional on the wire; missing values default to an
/// `"unknown"` user with no grants and no credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryContext {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub permissions: PermissionGrants,
    /// Surface name (`GMAIL`, `WALLET`, ...) → credential.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
}

impl QueryContext {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with_permission(mut self, permission: Permission, granted: bool) -> Self {
        self.permissions.set(permission, granted);
        self
    }

    pub fn with_token(mut self, surface: impl Into<String>, token: impl Into<String>) -> Self {
        self.tokens.insert(surface.into(), token.into());
        self
    }
}

/// The answer returned to the caller of `process_query`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub sources: Vec<Source>,
    pub errors: Vec<String>,
}

/// The record threaded through every pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub request_id: RequestId,
    /// The user's text, as received.
    pub query: String,
    /// Conversational turns exchanged with the model. Append-only.
    pub messages: Vec<ChatMessage>,
    /// Model-produced intent summary; `None` until the parse stage runs.
    pub intent: Option<String>,
    pub required_permissions: Vec<Permission>,
    pub required_tools: Vec<String>,
    pub tool_results: ToolResults,
    pub filtered_results: ToolResults,
    pub sources: Vec<Source>,
    /// Human-readable problems. Append-only; any entry diverts the pipeline
    /// to error reporting at the permission branch and in the final stage.
    pub errors: Vec<String>,
    pub response: Option<String>,
    pub user_id: String,
    pub permissions: PermissionGrants,
    pub tokens: BTreeMap<String, String>,
}

impl AgentState {
    /// Build the initial state for `query`, filling context defaults.
    pub fn new(query: impl Into<String>, context: QueryContext) -> Self {
        Self {
            request_id: RequestId::new(),
            query: query.into(),
            messages: Vec::new(),
            intent: None,
            required_permissions: Vec::new(),
            required_tools: Vec::new(),
            tool_results: ToolResults::new(),
            filtered_results: ToolResults::new(),
            sources: Vec::new(),
            errors: Vec::new(),
            response: None,
            user_id: context.user_id.unwrap_or_else(|| "unknown".to_string()),
            permissions: context.permissions,
            tokens: context.tokens,
        }
    }

    /// The intent text lower-cased, or empty when no intent was recorded.
    pub fn intent_lower(&self) -> String {
        self.intent.as_deref().unwrap_or_default().to_lowercase()
    }

    /// Project the final state onto the caller-facing response.
    pub fn into_response(self) -> QueryResponse {
        QueryResponse {
            response: self.response.unwrap_or_default(),
            sources: self.sources,
            errors: self.errors,
        }
    }
}
