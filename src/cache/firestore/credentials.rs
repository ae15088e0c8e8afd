//! Service-account credentials and OAuth2 access tokens for Firestore.

use std::path::Path;

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::cache::{CacheError, StatusCode, StoreError};

/// OAuth2 scope granting Firestore access.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens are refreshed this long before they expire.
const REFRESH_MARGIN: SignedDuration = SignedDuration::from_secs(60);

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The JSON key file downloaded for a Google service account.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub client_email: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, CacheError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CacheError::Connection(format!(
                "failed to read credentials file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CacheError> {
        let key: Self = serde_json::from_str(raw)
            .map_err(|e| CacheError::Connection(format!("invalid credentials file: {e}")))?;
        if key.key_type != "service_account" {
            return Err(CacheError::Connection(format!(
                "unsupported credentials type '{}', expected 'service_account'",
                key.key_type
            )));
        }
        Ok(key)
    }

    /// Sign the JWT assertion exchanged for an access token.
    pub fn assertion(&self, issued_at: Timestamp) -> Result<String, CacheError> {
        let iat = issued_at.as_second();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: DATASTORE_SCOPE,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())
            .map_err(|e| CacheError::Connection(format!("invalid service account key: {e}")))?;

        encode(&header, &claims, &key)
            .map_err(|e| CacheError::Connection(format!("failed to sign token assertion: {e}")))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: Timestamp,
}

impl AccessToken {
    fn is_fresh(&self, now: Timestamp) -> bool {
        now.checked_add(REFRESH_MARGIN)
            .map(|t| t < self.expires_at)
            .unwrap_or(false)
    }
}

/// How requests to the store are authorised.
#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    /// The local emulator accepts the fixed `owner` token.
    Emulator,
}

/// Produces bearer tokens, caching the current one until shortly before expiry.
#[derive(Debug)]
pub struct TokenSource {
    credentials: Credentials,
    http: reqwest::Client,
    current: Mutex<Option<AccessToken>>,
}

impl TokenSource {
    pub fn new(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            current: Mutex::new(None),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Return a valid bearer token, fetching a new one when needed.
    pub async fn bearer(&self) -> Result<String, CacheError> {
        let key = match &self.credentials {
            Credentials::Emulator => return Ok("owner".to_string()),
            Credentials::ServiceAccount(key) => key,
        };

        let mut current = self.current.lock().await;
        let now = Timestamp::now();
        if let Some(token) = current.as_ref()
            && token.is_fresh(now)
        {
            return Ok(token.token.clone());
        }

        let token = self.exchange(key, now).await?;
        let bearer = token.token.clone();
        *current = Some(token);
        Ok(bearer)
    }

    async fn exchange(&self, key: &ServiceAccountKey, now: Timestamp) -> Result<AccessToken, CacheError> {
        let assertion = key.assertion(now)?;
        tracing::debug!(client_email = %key.client_email, "requesting Firestore access token");

        let response = self
            .http
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| CacheError::Connection(format!("token request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CacheError::Connection(format!("token response unreadable: {e}")))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(desc) => format!("{}: {}", err.error, desc),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(StoreError::new(StatusCode::Unauthenticated, message)
                .with_http_status(status.as_u16())
                .into());
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| CacheError::Serialization(format!("malformed token response: {e}")))?;
        let lifetime = SignedDuration::from_secs(parsed.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS));
        let expires_at = now
            .checked_add(lifetime)
            .map_err(|e| CacheError::Serialization(format!("token expiry out of range: {e}")))?;

        Ok(AccessToken {
            token: parsed.access_token,
            expires_at,
        })
    }
}
