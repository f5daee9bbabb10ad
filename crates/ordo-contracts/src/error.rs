//! Error types for the Ordo assistant core.
//!
//! Pipeline stages never surface these to the caller directly: they convert
//! them into entries of `AgentState::errors`. Only `process_query` decides
//! the final shape of a failed request.

use thiserror::Error;

/// The unified error type for the Ordo crates.
#[derive(Debug, Error)]
pub enum OrdoError {
    /// No language-model client is configured.
    #[error("language model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// The language model could not be reached or returned an unusable reply.
    #[error("language model call failed: {reason}")]
    ModelCall { reason: String },

    /// A tool ran and reported failure.
    #[error("tool '{tool}' failed: {reason}")]
    ToolFailed { tool: String, reason: String },

    /// The tool invoker does not know the requested tool.
    #[error("unknown tool '{tool}'")]
    UnknownTool { tool: String },

    /// The content filter could not process a tool result.
    #[error("content filtering failed for '{tool}': {reason}")]
    FilterFailed { tool: String, reason: String },

    /// The audit sink could not persist an entry.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The workflow graph is malformed or did not terminate.
    #[error("workflow error: {reason}")]
    WorkflowError { reason: String },

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias used throughout the Ordo crates.
pub type OrdoResult<T> = Result<T, OrdoError>;
