//! Audit entries.
//!
//! One `AuditEntry` is produced per tool invocation and per policy violation.
//! The sink that stores them decides retention and integrity guarantees.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::permission::Surface;

/// Action label for an entry written after a tool invocation.
pub const ACTION_EXECUTE_TOOL: &str = "execute_tool";

/// Action label for an entry written when content is blocked by policy.
pub const ACTION_FILTER_CONTENT: &str = "filter_content";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub user_id: String,
    pub surface: Surface,
    pub action: String,
    pub success: bool,
    /// Free-form context, e.g. the tool name or the blocked item's identifier.
    pub details: Value,
    pub policy_violation: bool,
    /// Comma-joined category names that triggered a block, if any.
    pub blocked_pattern: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// An entry recording a tool invocation.
    pub fn tool_invocation(
        user_id: impl Into<String>,
        surface: Surface,
        success: bool,
        details: Value,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            surface,
            action: ACTION_EXECUTE_TOOL.to_string(),
            success,
            details,
            policy_violation: false,
            blocked_pattern: None,
            timestamp: Utc::now(),
        }
    }

    /// An entry recording content withheld by the policy engine.
    pub fn policy_violation(
        user_id: impl Into<String>,
        surface: Surface,
        patterns: &[String],
        details: Value,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            surface,
            action: ACTION_FILTER_CONTENT.to_string(),
            success: false,
            details,
            policy_violation: true,
            blocked_pattern: Some(patterns.join(",")),
            timestamp: Utc::now(),
        }
    }
}
