//! Regex policy engine implementation.
//!
//! `PolicyEngine` scans text against its compiled patterns and implements the
//! `ContentFilter` trait from ordo-core.
//!
//! Filtering by content shape:
//!
//! 1. A list of entries → each entry's text fields are scanned; matching
//!    entries are dropped. Gmail results are treated as emails
//!    (`subject`, `body`, `snippet`), everything else as messages (`text`,
//!    `message`, `content`, `body`).
//! 2. An object holding `emails`, `threads` or `messages` → that list is
//!    filtered as in (1).
//! 3. Any other object is a single entry: if its text fields match, the
//!    whole object is replaced by a placeholder.
//! 4. Every remaining string, at any depth, is scanned on its own and
//!    replaced by a placeholder naming the matched categories. Nested lists
//!    are filtered as in (1).
//!
//! Every dropped entry becomes one policy-violation audit entry.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use ordo_contracts::{
    audit::AuditEntry,
    error::{OrdoError, OrdoResult},
    permission::Surface,
    policy::ScanResult,
    tool::ToolResult,
};
use ordo_core::{
    config::PolicySettings,
    traits::{AuditSink, ContentFilter},
};

use crate::pattern::{builtin_patterns, custom_patterns, SensitivePattern};

const EMAIL_FIELDS: [&str; 3] = ["subject", "body", "snippet"];
const MESSAGE_FIELDS: [&str; 4] = ["text", "message", "content", "body"];
const EMAIL_KEYS: [&str; 2] = ["emails", "threads"];
const MESSAGE_KEYS: [&str; 1] = ["messages"];

/// An entry removed by filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedEntry {
    /// The entry's `id` / `message_id`, or `#<index>` when it has neither.
    pub id: String,
    pub patterns: Vec<String>,
}

/// A stateless sensitive-content scanner.
///
/// Patterns are compiled once at construction; the engine is `Send + Sync`
/// and meant to be shared across requests.
///
/// ```rust,ignore
/// use ordo_policy::PolicyEngine;
///
/// let engine = PolicyEngine::new()?.with_audit(audit);
/// let (sensitive, categories) = engine.is_sensitive("SSN 123-45-6789");
/// ```
pub struct PolicyEngine {
    patterns: Vec<SensitivePattern>,
    audit: Option<Arc<dyn AuditSink>>,
}

impl PolicyEngine {
    /// An engine with only the built-in categories.
    pub fn new() -> OrdoResult<Self> {
        Ok(Self {
            patterns: builtin_patterns()?,
            audit: None,
        })
    }

    /// Built-in categories followed by the configured extra patterns.
    ///
    /// Returns `OrdoError::ConfigError` if any configured regex is invalid.
    pub fn from_settings(settings: &PolicySettings) -> OrdoResult<Self> {
        let mut engine = Self::new()?;
        engine.patterns.extend(custom_patterns(&settings.patterns)?);
        Ok(engine)
    }

    /// Parse a `PolicySettings` TOML document (`[[patterns]]` tables).
    pub fn from_toml_str(s: &str) -> OrdoResult<Self> {
        let settings: PolicySettings = toml::from_str(s).map_err(|e| OrdoError::ConfigError {
            reason: format!("failed to parse policy TOML: {}", e),
        })?;
        Self::from_settings(&settings)
    }

    /// Read the file at `path` and parse it as policy patterns.
    pub fn from_file(path: &Path) -> OrdoResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| OrdoError::ConfigError {
            reason: format!("failed to read policy file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Write policy violations to `audit`.
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Names of the active categories, in evaluation order.
    pub fn categories(&self) -> Vec<&str> {
        self.patterns.iter().map(|p| p.name()).collect()
    }

    // ── Scanning ─────────────────────────────────────────────────────────────

    /// Whether `text` matches any pattern, and every category that matched.
    ///
    /// All patterns are evaluated so callers can report every category, not
    /// only the first. Empty text is never sensitive.
    pub fn is_sensitive(&self, text: &str) -> (bool, Vec<String>) {
        if text.is_empty() {
            return (false, Vec::new());
        }

        let matched: Vec<String> = self
            .patterns
            .iter()
            .filter(|p| p.is_match(text))
            .map(|p| p.name().to_string())
            .collect();

        (!matched.is_empty(), matched)
    }

    /// `is_sensitive` attributed to `surface`.
    pub fn scan_content(&self, content: &str, surface: Surface) -> ScanResult {
        let (is_sensitive, patterns) = self.is_sensitive(content);
        ScanResult {
            is_sensitive,
            patterns,
            surface,
        }
    }

    // ── List filters ─────────────────────────────────────────────────────────

    /// Drop every email whose subject, body or snippet is sensitive.
    pub fn filter_emails(&self, emails: Vec<Value>) -> Vec<Value> {
        self.partition(emails, &EMAIL_FIELDS).0
    }

    /// Drop every message whose text is sensitive.
    pub fn filter_messages(&self, messages: Vec<Value>) -> Vec<Value> {
        self.partition(messages, &MESSAGE_FIELDS).0
    }

    /// Split `entries` into kept entries and the blocked ones.
    fn partition(&self, entries: Vec<Value>, fields: &[&str]) -> (Vec<Value>, Vec<BlockedEntry>) {
        let mut kept = Vec::with_capacity(entries.len());
        let mut blocked = Vec::new();

        for (idx, entry) in entries.into_iter().enumerate() {
            let (sensitive, patterns) = self.is_sensitive(&entry_text(&entry, fields));
            if sensitive {
                let id = entry_id(&entry, idx);
                warn!(entry_id = %id, patterns = ?patterns, "blocked sensitive entry");
                blocked.push(BlockedEntry { id, patterns });
            } else {
                kept.push(entry);
            }
        }

        (kept, blocked)
    }

    // ── Shape dispatch ───────────────────────────────────────────────────────

    /// Filter one tool payload, returning the clean payload and what was blocked.
    pub fn filter_value(&self, data: Value, surface: Surface) -> (Value, Vec<BlockedEntry>) {
        let fields: &[&str] = if surface == Surface::Gmail {
            &EMAIL_FIELDS
        } else {
            &MESSAGE_FIELDS
        };

        if let Value::Object(map) = &data {
            if !has_list_key(map) {
                let (sensitive, patterns) = self.is_sensitive(&entry_text(&data, fields));
                if sensitive {
                    let id = entry_id(&data, 0);
                    warn!(surface = %surface, entry_id = %id, patterns = ?patterns, "withheld sensitive entry");
                    return (withheld(&patterns), vec![BlockedEntry { id, patterns }]);
                }
            }
        }

        let mut blocked = Vec::new();
        let data = self.scrub(data, fields, "text", &mut blocked);
        (data, blocked)
    }

    /// Withhold sensitive text anywhere inside `value`.
    ///
    /// Lists drop matching entries, judged by `fields` (or by the fields of
    /// the list key they sit under). Strings outside a dropped entry become
    /// placeholders attributed to `key`.
    fn scrub(&self, value: Value, fields: &[&str], key: &str, blocked: &mut Vec<BlockedEntry>) -> Value {
        match value {
            Value::Array(items) => {
                let (kept, dropped) = self.partition(items, fields);
                blocked.extend(dropped);
                kept.into_iter()
                    .map(|item| self.scrub(item, fields, key, blocked))
                    .collect()
            }
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| {
                    let v = self.scrub(v, list_fields(&k).unwrap_or(fields), &k, blocked);
                    (k, v)
                })
                .collect::<Map<String, Value>>()
                .into(),
            Value::String(text) => {
                let (sensitive, patterns) = self.is_sensitive(&text);
                if sensitive {
                    warn!(field = %key, patterns = ?patterns, "withheld sensitive text");
                    let placeholder = withheld(&patterns);
                    blocked.push(BlockedEntry { id: key.to_string(), patterns });
                    placeholder
                } else {
                    Value::String(text)
                }
            }
            other => other,
        }
    }
}

#[async_trait]
impl ContentFilter for PolicyEngine {
    /// Filter a tool result and audit each blocked entry against `user_id`.
    ///
    /// Failed results and results without data pass through unchanged. An
    /// audit write failure is logged; the filtered result is still returned.
    async fn filter_content(
        &self,
        content: ToolResult,
        surface: Surface,
        user_id: &str,
    ) -> OrdoResult<ToolResult> {
        let ToolResult { success, data, error } = content;
        let data = match data {
            Some(data) if success => data,
            data => return Ok(ToolResult { success, data, error }),
        };

        let (data, blocked) = self.filter_value(data, surface);

        debug!(surface = %surface, user_id = %user_id, blocked = blocked.len(), "content filtered");

        if let Some(audit) = &self.audit {
            for entry in &blocked {
                let violation = AuditEntry::policy_violation(
                    user_id,
                    surface,
                    &entry.patterns,
                    json!({ "entry_id": entry.id }),
                );
                if let Err(e) = audit.record(&violation) {
                    error!(
                        user_id = %user_id,
                        surface = %surface,
                        entry_id = %entry.id,
                        error = %e,
                        "failed to audit policy violation"
                    );
                }
            }
        }

        Ok(ToolResult { success, data: Some(data), error })
    }
}

/// Concatenated text of the scanned fields of one entry.
fn entry_text(entry: &Value, fields: &[&str]) -> String {
    match entry {
        Value::String(s) => s.clone(),
        Value::Object(map) => fields
            .iter()
            .filter_map(|field| map.get(*field).and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn entry_id(entry: &Value, idx: usize) -> String {
    ["id", "message_id"]
        .iter()
        .find_map(|key| match entry.get(*key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_else(|| format!("#{}", idx))
}

fn withheld(patterns: &[String]) -> Value {
    Value::String(format!("[withheld: sensitive content ({})]", patterns.join(", ")))
}

/// Entry fields scanned for items of the list held under `key`.
fn list_fields(key: &str) -> Option<&'static [&'static str]> {
    if EMAIL_KEYS.contains(&key) {
        Some(&EMAIL_FIELDS)
    } else if MESSAGE_KEYS.contains(&key) {
        Some(&MESSAGE_FIELDS)
    } else {
        None
    }
}

fn has_list_key(map: &Map<String, Value>) -> bool {
    EMAIL_KEYS.iter().chain(MESSAGE_KEYS.iter()).any(|key| map.contains_key(*key))
}
