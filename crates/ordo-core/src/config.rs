//! Runtime configuration.
//!
//! `OrdoConfig` is read from a TOML document and then overlaid with
//! environment variables:
//!
//! | variable          | field            |
//! |-------------------|------------------|
//! | `MISTRAL_API_KEY` | `llm.api_key`    |
//! | `MISTRAL_MODEL`   | `llm.model`      |
//! | `LOG_LEVEL`       | `logging.level`  |
//! | `LOG_FORMAT`      | `logging.format` |
//!
//! Every section and field is optional; the defaults describe a working
//! development setup without a language model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use ordo_contracts::{
    error::{OrdoError, OrdoResult},
    policy::FilterFailureMode,
};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdoConfig {
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub policy: PolicySettings,
    pub logging: LoggingSettings,
}

/// Language-model connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Without a key no model client is built and the pipeline degrades.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "mistral-large-latest".to_string(),
            base_url: "https://api.mistral.ai/v1".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout_seconds: 60,
        }
    }
}

impl LlmSettings {
    /// The API key, if one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Pipeline behaviour knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub filter_failure: FilterFailureMode,
    /// Drop repeated tool names produced by the classifier.
    pub dedupe_tools: bool,
    /// Run the selected tools concurrently instead of one at a time.
    pub concurrent_tools: bool,
    /// Characters of tool data kept in each source preview.
    pub preview_chars: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            filter_failure: FilterFailureMode::FailOpen,
            dedupe_tools: true,
            concurrent_tools: true,
            preview_chars: 100,
        }
    }
}

/// Extra sensitive-content patterns on top of the built-in categories.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub patterns: Vec<PatternSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Category name reported when the pattern matches.
    pub name: String,
    /// Regular expression, matched case-insensitively.
    pub regex: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl OrdoConfig {
    /// Parse `s` as TOML and validate the result.
    pub fn from_toml_str(s: &str) -> OrdoResult<Self> {
        let config: OrdoConfig = toml::from_str(s).map_err(|e| OrdoError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the TOML file at `path`.
    pub fn from_file(path: &Path) -> OrdoResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| OrdoError::ConfigError {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Overlay process environment variables, then re-validate.
    pub fn apply_env(self) -> OrdoResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay variables resolved through `lookup`, then re-validate.
    pub fn apply_env_from<F>(mut self, lookup: F) -> OrdoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("MISTRAL_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(model) = lookup("MISTRAL_MODEL") {
            self.llm.model = model;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level.to_lowercase();
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" | "text" => LogFormat::Compact,
                other => {
                    return Err(OrdoError::ConfigError {
                        reason: format!("LOG_FORMAT must be 'json' or 'compact', got '{}'", other),
                    })
                }
            };
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> OrdoResult<()> {
        let level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(OrdoError::ConfigError {
                reason: format!(
                    "logging.level must be one of {:?}, got '{}'",
                    LOG_LEVELS, self.logging.level
                ),
            });
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(OrdoError::ConfigError {
                reason: format!("llm.temperature must be within 0.0..=2.0, got {}", self.llm.temperature),
            });
        }
        if self.llm.timeout_seconds == 0 {
            return Err(OrdoError::ConfigError {
                reason: "llm.timeout_seconds must be greater than zero".to_string(),
            });
        }
        if self.agent.preview_chars == 0 {
            return Err(OrdoError::ConfigError {
                reason: "agent.preview_chars must be greater than zero".to_string(),
            });
        }
        for pattern in &self.policy.patterns {
            if pattern.name.trim().is_empty() {
                return Err(OrdoError::ConfigError {
                    reason: format!("policy pattern '{}' has an empty name", pattern.regex),
                });
            }
        }
        Ok(())
    }
}
