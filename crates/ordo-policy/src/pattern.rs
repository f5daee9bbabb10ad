//! Sensitive-content patterns.
//!
//! Each category is a single case-insensitive regular expression. The
//! built-in set covers the `SensitiveCategory` enum; deployments may append
//! their own categories through `[[policy.patterns]]` in the config file.

use regex::{Regex, RegexBuilder};

use ordo_contracts::{
    error::{OrdoError, OrdoResult},
    policy::SensitiveCategory,
};
use ordo_core::config::PatternSpec;

/// Regex source for each built-in category.
pub fn builtin_source(category: SensitiveCategory) -> &'static str {
    match category {
        SensitiveCategory::OtpCode => r"\b\d{4,8}\b.*(?:code|otp|verification)",
        SensitiveCategory::VerificationCode => r"(?:verification|confirm|verify).*code.*\d{4,8}",
        SensitiveCategory::RecoveryPhrase => r"\b(?:word\s+\d+|seed phrase|recovery phrase)\b",
        SensitiveCategory::PasswordReset => r"(?:reset|change).*password",
        SensitiveCategory::BankStatement => r"(?:bank statement|account balance|routing number)",
        SensitiveCategory::TaxDocument => r"(?:tax return|1099|W-2|tax document)",
        SensitiveCategory::Ssn => r"\b\d{3}-\d{2}-\d{4}\b",
        SensitiveCategory::CreditCard => r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}[\s-]?\d{4}\b",
    }
}

/// A named, compiled pattern.
#[derive(Debug, Clone)]
pub struct SensitivePattern {
    name: String,
    regex: Regex,
}

impl SensitivePattern {
    /// Compile `source` case-insensitively under `name`.
    ///
    /// Returns `OrdoError::ConfigError` if `source` is not a valid regex.
    pub fn compile(name: impl Into<String>, source: &str) -> OrdoResult<Self> {
        let name = name.into();
        let regex = RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|e| OrdoError::ConfigError {
                reason: format!("invalid regex for sensitive pattern '{}': {}", name, e),
            })?;
        Ok(Self { name, regex })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// The built-in categories, in `SensitiveCategory::ALL` order.
pub fn builtin_patterns() -> OrdoResult<Vec<SensitivePattern>> {
    SensitiveCategory::ALL
        .iter()
        .map(|category| SensitivePattern::compile(category.as_str(), builtin_source(*category)))
        .collect()
}

/// Compile configured extra patterns.
pub fn custom_patterns(specs: &[PatternSpec]) -> OrdoResult<Vec<SensitivePattern>> {
    specs
        .iter()
        .map(|spec| SensitivePattern::compile(spec.name.trim(), &spec.regex))
        .collect()
}
