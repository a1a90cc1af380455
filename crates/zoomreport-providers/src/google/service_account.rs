//! Service account authentication for Google APIs.
//!
//! Implements the OAuth 2.0 JWT bearer grant: an RS256 assertion signed with
//! the service account's private key is exchanged at the token endpoint for a
//! short-lived access token.

use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::http::{self, HttpSettings, require};

/// Default token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Grant type for the JWT bearer flow.
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of an assertion. Google rejects anything above one hour.
const ASSERTION_TTL_SECS: i64 = 3600;

/// The relevant parts of a service account key file.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account email, used as the assertion issuer.
    pub client_email: String,
    /// PEM encoded RSA private key.
    pub private_key: String,
    /// Key id, sent as `kid` when present.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// Token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    GOOGLE_TOKEN_URL.to_string()
}

impl ServiceAccountKey {
    /// Loads a key from a JSON key file.
    pub fn from_file(path: impl AsRef<Path>) -> ProviderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::configuration(format!(
                "failed to read service account file {}: {}",
                path.display(),
                e
            ))
            .with_source(e)
        })?;
        Self::from_json(&content)
    }

    /// Parses a key from its JSON form.
    pub fn from_json(json: &str) -> ProviderResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            ProviderError::configuration(format!("failed to parse service account JSON: {}", e))
        })
    }

    /// Overrides the token endpoint.
    pub fn with_token_uri(mut self, token_uri: impl Into<String>) -> Self {
        self.token_uri = token_uri.into();
        self
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

/// Claims of the JWT bearer assertion.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssertionClaims {
    pub iss: String,
    /// Space separated scopes.
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Exchanges service account assertions for access tokens.
#[derive(Debug)]
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    http_client: Client,
}

impl ServiceAccountAuth {
    /// Creates an authenticator for `key`.
    pub fn new(key: ServiceAccountKey, settings: &HttpSettings) -> ProviderResult<Self> {
        Ok(Self {
            key,
            http_client: settings.build_client()?,
        })
    }

    /// Returns the claims of an assertion issued at `now`.
    pub fn claims_at(&self, scopes: &[String], now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_TTL_SECS,
        }
    }

    /// Signs an assertion issued at `now`.
    pub fn assertion_at(&self, scopes: &[String], now: DateTime<Utc>) -> ProviderResult<String> {
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes()).map_err(|e| {
            ProviderError::authentication(format!("invalid service account private key: {}", e))
                .with_provider("google")
        })?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        jsonwebtoken::encode(&header, &self.claims_at(scopes, now), &key).map_err(|e| {
            ProviderError::authentication(format!("failed to sign assertion: {}", e))
                .with_provider("google")
                .with_source(e)
        })
    }

    /// Obtains an access token for `scopes`.
    ///
    /// # Errors
    ///
    /// Returns an authentication error when the key cannot sign or the token
    /// endpoint rejects the assertion.
    pub async fn access_token(&self, scopes: &[String]) -> ProviderResult<String> {
        if scopes.is_empty() {
            return Err(ProviderError::configuration("at least one OAuth scope is required"));
        }

        let assertion = self.assertion_at(scopes, Utc::now())?;
        debug!(
            "requesting access token for {} with {} scope(s)",
            self.key.client_email,
            scopes.len()
        );

        let request = self
            .http_client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())]);

        let body = http::send(request, "token exchange").await.map_err(|e| {
            // Google answers a bad assertion with 400 invalid_grant
            let e = if e.code().is_transport() && e.message().contains("invalid_grant") {
                ProviderError::authentication(e.message().to_string())
            } else {
                e
            };
            e.with_provider("google")
        })?;

        let response: TokenResponse =
            http::parse_json(&body, "token exchange").map_err(|e| e.with_provider("google"))?;
        let token = require(response.access_token, "access_token", "token exchange")
            .map_err(|e| e.with_provider("google"))?;
        info!("authenticated as {}", self.key.client_email);
        Ok(token)
    }
}

/// Response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderErrorCode;
    use base64::Engine;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::TimeZone;
    use mockito::Matcher;

    const KEY_JSON: &str = include_str!("../../tests/data/service-account.json");

    fn scopes() -> Vec<String> {
        vec![
            "https://www.googleapis.com/auth/drive".to_string(),
            "https://www.googleapis.com/auth/drive.file".to_string(),
        ]
    }

    fn decode_part(token: &str, index: usize) -> serde_json::Value {
        let part = token.split('.').nth(index).unwrap();
        serde_json::from_slice(&URL_SAFE_NO_PAD.decode(part).unwrap()).unwrap()
    }

    #[test]
    fn parses_key_file() {
        let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
        assert_eq!(key.client_email, "reporter@zoomreport-test.iam.gserviceaccount.com");
        assert_eq!(key.token_uri, GOOGLE_TOKEN_URL);
        assert_eq!(key.private_key_id.as_deref(), Some("test-key-1"));
        assert!(!format!("{:?}", key).contains("BEGIN PRIVATE KEY"));
    }

    #[test]
    fn token_uri_defaults_when_absent() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "x"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, GOOGLE_TOKEN_URL);
    }

    #[test]
    fn loads_key_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, KEY_JSON.as_bytes()).unwrap();
        let key = ServiceAccountKey::from_file(file.path()).unwrap();
        assert_eq!(key.client_email, "reporter@zoomreport-test.iam.gserviceaccount.com");
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = ServiceAccountKey::from_file("/nonexistent/zoomreport/key.json").unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }

    #[test]
    fn assertion_is_signed_rs256() {
        let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
        let auth = ServiceAccountAuth::new(key, &HttpSettings::default()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let token = auth.assertion_at(&scopes(), now).unwrap();
        let header = decode_part(&token, 0);
        assert_eq!(header["alg"], "RS256");
        assert_eq!(header["kid"], "test-key-1");

        let claims: AssertionClaims = serde_json::from_value(decode_part(&token, 1)).unwrap();
        assert_eq!(claims, auth.claims_at(&scopes(), now));
        assert_eq!(
            claims.scope,
            "https://www.googleapis.com/auth/drive https://www.googleapis.com/auth/drive.file"
        );
        assert_eq!(claims.aud, GOOGLE_TOKEN_URL);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn bad_pem_is_authentication_error() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email": "a@b.iam.gserviceaccount.com", "private_key": "not a key"}"#,
        )
        .unwrap();
        let auth = ServiceAccountAuth::new(key, &HttpSettings::default()).unwrap();
        let err = auth.assertion_at(&scopes(), Utc::now()).unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
    }

    #[tokio::test]
    async fn exchanges_assertion_for_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), JWT_BEARER_GRANT.into()),
                Matcher::Regex("assertion=".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "ya29.test", "expires_in": 3599, "token_type": "Bearer"}"#)
            .create_async()
            .await;

        let key = ServiceAccountKey::from_json(KEY_JSON)
            .unwrap()
            .with_token_uri(format!("{}/token", server.url()));
        let auth = ServiceAccountAuth::new(key, &HttpSettings::default()).unwrap();

        let token = auth.access_token(&scopes()).await.unwrap();
        assert_eq!(token, "ya29.test");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_assertion_is_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant", "error_description": "Invalid JWT Signature."}"#)
            .create_async()
            .await;

        let key = ServiceAccountKey::from_json(KEY_JSON)
            .unwrap()
            .with_token_uri(format!("{}/token", server.url()));
        let auth = ServiceAccountAuth::new(key, &HttpSettings::default()).unwrap();

        let err = auth.access_token(&scopes()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::AuthenticationFailed);
        assert_eq!(err.provider(), Some("google"));
    }

    #[tokio::test]
    async fn token_response_without_access_token_is_tagged() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"token_type": "Bearer"}"#)
            .create_async()
            .await;

        let key = ServiceAccountKey::from_json(KEY_JSON)
            .unwrap()
            .with_token_uri(format!("{}/token", server.url()));
        let auth = ServiceAccountAuth::new(key, &HttpSettings::default()).unwrap();

        let err = auth.access_token(&scopes()).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
        assert_eq!(err.provider(), Some("google"));
        assert!(err.message().contains("access_token"));
    }

    #[tokio::test]
    async fn no_scopes_is_configuration_error() {
        let key = ServiceAccountKey::from_json(KEY_JSON).unwrap();
        let auth = ServiceAccountAuth::new(key, &HttpSettings::default()).unwrap();
        let err = auth.access_token(&[]).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::ConfigurationError);
    }
}
