//! Core error types.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while turning sessions into a report.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The summary has no rows, so no report date can be derived.
    #[error("attendance summary is empty, no report date to derive")]
    EmptyReport,

    /// The configured report timezone is not a known IANA name.
    #[error("unknown timezone '{name}': {reason}")]
    InvalidTimezone { name: String, reason: String },
}

impl CoreError {
    /// Creates an invalid timezone error.
    pub fn invalid_timezone(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTimezone {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
