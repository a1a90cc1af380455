//! Bearer token generation for the Zoom reporting API.
//!
//! Zoom JWT apps authenticate with an HS256 token whose issuer is the API key,
//! signed with the API secret. The token carries `iat` and `exp` only; no
//! audience claim is set.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// API key/secret pair of a Zoom JWT app.
#[derive(Clone)]
pub struct ZoomCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl ZoomCredentials {
    /// Creates new credentials.
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Checks that neither half is blank.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.api_key.trim().is_empty() {
            return Err("api_key is required");
        }
        if self.api_secret.is_empty() {
            return Err("api_secret is required");
        }
        Ok(())
    }
}

impl fmt::Debug for ZoomCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Claims of a Zoom bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoomClaims {
    /// API key.
    pub iss: String,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Produces signed, time bounded bearer tokens.
#[derive(Debug, Clone)]
pub struct ZoomTokenProvider {
    credentials: ZoomCredentials,
    ttl: Duration,
}

impl ZoomTokenProvider {
    /// Default token lifetime in seconds.
    pub const DEFAULT_TTL_SECS: i64 = 5400;

    /// Creates a provider with the default lifetime.
    pub fn new(credentials: ZoomCredentials) -> Self {
        Self {
            credentials,
            ttl: Duration::seconds(Self::DEFAULT_TTL_SECS),
        }
    }

    /// Sets the token lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Returns the claims of a token issued at `now`.
    pub fn claims_at(&self, now: DateTime<Utc>) -> ZoomClaims {
        let iat = now.timestamp();
        ZoomClaims {
            iss: self.credentials.api_key.clone(),
            iat,
            exp: iat + self.ttl.num_seconds(),
        }
    }

    /// Signs a token issued at `now`. The same `now` always yields the same token.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the key or secret is empty or
    /// signing fails.
    pub fn generate_at(&self, now: DateTime<Utc>) -> ProviderResult<String> {
        self.credentials.validate().map_err(|e| {
            ProviderError::authentication(format!("cannot sign Zoom token: {}", e))
                .with_provider("zoom")
        })?;

        let claims = self.claims_at(now);
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.credentials.api_secret.as_bytes()),
        )
        .map_err(|e| {
            ProviderError::authentication(format!("failed to sign Zoom token: {}", e))
                .with_provider("zoom")
                .with_source(e)
        })?;

        debug!("generated Zoom token valid until {}", claims.exp);
        Ok(token)
    }

    /// Signs a token issued now.
    pub fn generate(&self) -> ProviderResult<String> {
        self.generate_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;

    fn provider() -> ZoomTokenProvider {
        ZoomTokenProvider::new(ZoomCredentials::new("my-key", "my-secret"))
    }

    fn decode_part(token: &str, index: usize) -> serde_json::Value {
        let part = token.split('.').nth(index).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(part).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn claims_bind_issuer_and_window() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let claims = provider().claims_at(now);
        assert_eq!(claims.iss, "my-key");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 5400);
    }

    #[test]
    fn token_is_hs256_without_audience() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let token = provider().generate_at(now).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header = decode_part(&token, 0);
        assert_eq!(header["alg"], "HS256");

        let payload = decode_part(&token, 1);
        assert_eq!(payload["iss"], "my-key");
        assert_eq!(payload["iat"], now.timestamp());
        assert_eq!(payload["exp"], now.timestamp() + 5400);
        assert!(payload.get("aud").is_none());
    }

    #[test]
    fn token_is_deterministic_for_fixed_clock() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let p = provider();
        assert_eq!(p.generate_at(now).unwrap(), p.generate_at(now).unwrap());

        let later = now + Duration::seconds(1);
        assert_ne!(p.generate_at(now).unwrap(), p.generate_at(later).unwrap());
    }

    #[test]
    fn custom_ttl() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let claims = provider().with_ttl(Duration::seconds(60)).claims_at(now);
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn empty_secret_fails() {
        let p = ZoomTokenProvider::new(ZoomCredentials::new("my-key", ""));
        let err = p.generate().unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert!(err.message().contains("api_secret"));
    }

    #[test]
    fn empty_key_fails() {
        let p = ZoomTokenProvider::new(ZoomCredentials::new("  ", "secret"));
        assert!(p.generate().is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", ZoomCredentials::new("my-key", "my-secret"));
        assert!(rendered.contains("my-key"));
        assert!(!rendered.contains("my-secret"));
    }
}
