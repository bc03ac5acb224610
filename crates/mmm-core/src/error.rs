//! Core error types.
//!
//! `ChallengeError` covers generator invariant violations, which are logic
//! errors and not recoverable by the user. `SettingsError` is raised at the
//! preference-input boundary so invalid values never reach a generator.

use thiserror::Error;

/// Errors raised while generating or judging a challenge.
#[derive(Debug, Error)]
pub enum ChallengeError {
    /// The arithmetic expression could not be evaluated.
    #[error("expression evaluation failed: {0}")]
    Evaluation(String),

    /// No quote satisfies the current word limit.
    #[error("no quotes with at most {words_max} words")]
    EmptyQuotePool { words_max: u32 },

    /// An identifier did not name any challenge kind.
    #[error("unknown challenge: {0}")]
    UnknownChallenge(String),
}

/// Errors raised when editing preferences.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The field does not exist for this settings record.
    #[error("unknown field '{field}' for {target}")]
    UnknownField { target: String, field: String },

    /// The value could not be accepted for the field.
    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(field: &str, value: &str, reason: impl Into<String>) -> Self {
        SettingsError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
