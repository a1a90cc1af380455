//! Client error types.
//!
//! Provider errors carry a code but not the stage that raised them. The
//! pipeline wraps each one with [`ReportError::fetch`] or
//! [`ReportError::publish`] so the user sees which step of the run failed.

use thiserror::Error;

use zoomreport_core::CoreError;
use zoomreport_providers::{ProviderError, ProviderErrorCode};

use crate::secret::SecretError;

/// Result type for client operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors that abort a report run.
#[derive(Debug, Error)]
pub enum ReportError {
    /// A bearer token or access token could not be produced.
    #[error("authentication failed: {0}")]
    Auth(#[source] ProviderError),

    /// An HTTP call failed or returned a non-success status.
    #[error("request failed: {0}")]
    Transport(#[source] ProviderError),

    /// A response was missing a field or had a malformed one.
    #[error("unexpected response: {0}")]
    DataShape(#[source] ProviderError),

    /// The meeting report had no participants.
    #[error("meeting {meeting_id} has no participants")]
    EmptyResult { meeting_id: String },

    /// Folder lookup, spreadsheet creation, or row append failed.
    #[error("publishing failed: {0}")]
    Publish(#[source] ProviderError),

    /// Configuration is missing, unreadable, or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ReportError {
    /// Classifies an error raised while fetching from Zoom.
    pub fn fetch(err: ProviderError) -> Self {
        match err.code() {
            ProviderErrorCode::AuthenticationFailed => Self::Auth(err),
            ProviderErrorCode::InvalidResponse => Self::DataShape(err),
            ProviderErrorCode::ConfigurationError => Self::Config(err.to_string()),
            _ => Self::Transport(err),
        }
    }

    /// Classifies an error raised while publishing to Google.
    pub fn publish(err: ProviderError) -> Self {
        match err.code() {
            ProviderErrorCode::AuthenticationFailed => Self::Auth(err),
            ProviderErrorCode::ConfigurationError => Self::Config(err.to_string()),
            _ => Self::Publish(err),
        }
    }

    /// Wraps a core error for the given meeting.
    pub fn core(err: CoreError, meeting_id: &str) -> Self {
        match err {
            CoreError::EmptyReport => Self::EmptyResult {
                meeting_id: meeting_id.to_string(),
            },
            other => Self::Config(other.to_string()),
        }
    }
}

impl From<SecretError> for ReportError {
    fn from(err: SecretError) -> Self {
        Self::Config(err.to_string())
    }
}
