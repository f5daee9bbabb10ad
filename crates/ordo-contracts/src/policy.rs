//! Content-policy scan results and filtering posture.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::permission::Surface;

/// The built-in sensitive-data categories the policy engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SensitiveCategory {
    OtpCode,
    VerificationCode,
    RecoveryPhrase,
    PasswordReset,
    BankStatement,
    TaxDocument,
    Ssn,
    CreditCard,
}

impl SensitiveCategory {
    /// Every built-in category, in evaluation order.
    pub const ALL: [SensitiveCategory; 8] = [
        SensitiveCategory::OtpCode,
        SensitiveCategory::VerificationCode,
        SensitiveCategory::RecoveryPhrase,
        SensitiveCategory::PasswordReset,
        SensitiveCategory::BankStatement,
        SensitiveCategory::TaxDocument,
        SensitiveCategory::Ssn,
        SensitiveCategory::CreditCard,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveCategory::OtpCode => "OTP_CODE",
            SensitiveCategory::VerificationCode => "VERIFICATION_CODE",
            SensitiveCategory::RecoveryPhrase => "RECOVERY_PHRASE",
            SensitiveCategory::PasswordReset => "PASSWORD_RESET",
            SensitiveCategory::BankStatement => "BANK_STATEMENT",
            SensitiveCategory::TaxDocument => "TAX_DOCUMENT",
            SensitiveCategory::Ssn => "SSN",
            SensitiveCategory::CreditCard => "CREDIT_CARD",
        }
    }
}

impl fmt::Display for SensitiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of scanning one piece of content, attributed to a surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub is_sensitive: bool,
    /// Names of every category that matched, in evaluation order.
    pub patterns: Vec<String>,
    pub surface: Surface,
}

/// What the pipeline does with a tool result whose filtering failed.
///
/// `FailOpen` passes the unfiltered result through (availability first);
/// `FailClosed` withholds it and records an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterFailureMode {
    #[default]
    FailOpen,
    FailClosed,
}
