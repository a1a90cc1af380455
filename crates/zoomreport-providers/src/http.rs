//! Shared HTTP plumbing for the Zoom and Google clients.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::{ProviderError, ProviderResult};

/// Settings shared by every HTTP client built for a run.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl HttpSettings {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds a `reqwest` client from these settings.
    pub fn build_client(&self) -> ProviderResult<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()
            .map_err(|e| {
                ProviderError::internal(format!("failed to create HTTP client: {}", e))
                    .with_source(e)
            })
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("zoomreport/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Sends a request and returns the body of a successful response.
///
/// `what` names the operation in error messages.
pub(crate) async fn send(request: RequestBuilder, what: &str) -> ProviderResult<String> {
    let response = request.send().await.map_err(|e| {
        if e.is_timeout() {
            ProviderError::network(format!("{}: request timeout", what))
        } else if e.is_connect() {
            ProviderError::network(format!("{}: connection failed: {}", what, e))
        } else {
            ProviderError::network(format!("{}: request failed: {}", what, e))
        }
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        ProviderError::network(format!("{}: failed to read response: {}", what, e))
    })?;
    trace!("{} returned {} ({} bytes)", what, status, body.len());

    if status.is_success() {
        return Ok(body);
    }

    Err(match status {
        StatusCode::UNAUTHORIZED => {
            ProviderError::authentication(format!("{}: token rejected ({})", what, body))
        }
        StatusCode::FORBIDDEN => {
            ProviderError::authorization(format!("{}: access denied ({})", what, body))
        }
        StatusCode::NOT_FOUND => ProviderError::not_found(format!("{}: not found ({})", what, body)),
        StatusCode::BAD_REQUEST => {
            ProviderError::bad_request(format!("{}: bad request ({})", what, body))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::rate_limited(format!("{}: rate limit exceeded", what))
        }
        _ => ProviderError::server(format!("{}: API error ({}): {}", what, status, body)),
    })
}

/// Parses a JSON body, reporting shape problems as [`ProviderError::invalid_response`].
pub(crate) fn parse_json<T: DeserializeOwned>(body: &str, what: &str) -> ProviderResult<T> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("{}: failed to parse response: {}", what, e))
    })
}

/// Returns `value` or an invalid-response error naming the missing `field`.
pub(crate) fn require<T>(value: Option<T>, field: &str, what: &str) -> ProviderResult<T> {
    value.ok_or_else(|| {
        ProviderError::invalid_response(format!("{}: missing field '{}'", what, field))
    })
}
