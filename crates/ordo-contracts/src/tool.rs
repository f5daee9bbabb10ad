//! Tool results and source citations.
//!
//! `ToolResult` is what a tool invocation hands back to the pipeline.
//! `Source` is what the final answer cites, one per successful result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::permission::Surface;

/// Fixed tool vocabulary understood by the classifier and the tool catalog.
pub mod names {
    pub const GET_EMAIL_CONTENT: &str = "get_email_content";
    pub const SEARCH_EMAIL_THREADS: &str = "search_email_threads";
    pub const GET_X_DMS: &str = "get_x_dms";
    pub const GET_X_MENTIONS: &str = "get_x_mentions";
    pub const GET_TELEGRAM_MESSAGES: &str = "get_telegram_messages";
    pub const GET_WALLET_PORTFOLIO: &str = "get_wallet_portfolio";
    pub const GET_TOKEN_BALANCES: &str = "get_token_balances";
    pub const GET_TRANSACTION_HISTORY: &str = "get_transaction_history";
    pub const BUILD_TRANSFER_TRANSACTION: &str = "build_transfer_transaction";
    pub const SEARCH_WEB: &str = "search_web";
}

/// The outcome of one tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result carrying `data`.
    pub fn ok(data: impl Into<Value>) -> Self {
        Self {
            success: true,
            data: Some(data.into()),
            error: None,
        }
    }

    /// A failed result carrying an error message.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// The data rendered as plain text: strings verbatim, other JSON compactly,
    /// absent data as the empty string.
    pub fn data_text(&self) -> String {
        match &self.data {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

/// Tool results keyed by tool name, in the order the tools were selected.
///
/// Inserting a name that is already present replaces its result in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolResults(Vec<(String, ToolResult)>);

impl ToolResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tool: impl Into<String>, result: ToolResult) {
        let tool = tool.into();
        match self.0.iter_mut().find(|(name, _)| *name == tool) {
            Some(entry) => entry.1 = result,
            None => self.0.push((tool, result)),
        }
    }

    pub fn get(&self, tool: &str) -> Option<&ToolResult> {
        self.0.iter().find(|(name, _)| name == tool).map(|(_, r)| r)
    }

    pub fn contains(&self, tool: &str) -> bool {
        self.get(tool).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolResult)> {
        self.0.iter().map(|(name, r)| (name.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl IntoIterator for ToolResults {
    type Item = (String, ToolResult);
    type IntoIter = std::vec::IntoIter<(String, ToolResult)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, ToolResult)> for ToolResults {
    fn from_iter<I: IntoIterator<Item = (String, ToolResult)>>(iter: I) -> Self {
        let mut results = Self::new();
        for (tool, result) in iter {
            results.insert(tool, result);
        }
        results
    }
}

/// A citation attributing part of the answer to one tool on one surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub surface: Surface,
    pub tool: String,
    /// Leading characters of the tool's data, for display next to the citation.
    pub preview: String,
}
