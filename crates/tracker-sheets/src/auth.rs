//! Google service-account authentication.
//!
//! A service-account key signs a short-lived RS256 JWT which is exchanged at
//! the key's `token_uri` for an OAuth access token. Tokens are cached and
//! refreshed shortly before they expire.

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use tracker_telemetry::metric_names::AUTH_REFRESH_TOTAL;

use crate::error::SheetsError;

/// OAuth scope for read/write spreadsheet access.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Default Google token endpoint.
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Lifetime requested for the signed assertion (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Longest lifetime trusted from a token response.
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

/// Refresh this long before the access token expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(300);

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Supplies bearer tokens for API requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// A currently valid access token.
    async fn access_token(&self) -> Result<String, SheetsError>;
}

/// A fixed token, e.g. from `gcloud auth print-access-token`.
#[derive(Clone, Debug)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn access_token(&self) -> Result<String, SheetsError> {
        Ok(self.0.clone())
    }
}

/// The fields of a service-account key file this client uses.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account identity (`iss` of the assertion).
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Key ID, sent as the JWT `kid`.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Read and parse a key file.
    pub fn from_file(path: &Path) -> Result<Self, SheetsError> {
        let credentials_error = |reason: String| SheetsError::Credentials {
            path: path.display().to_string(),
            reason,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| credentials_error(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| credentials_error(e.to_string()))
    }
}

/// Assertion claims for the JWT bearer grant.
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Access tokens minted from a service-account key.
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    client: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for ServiceAccountAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountAuth")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountAuth {
    /// Build from a parsed key, sharing `client` for token requests.
    pub fn new(key: ServiceAccountKey, client: reqwest::Client) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SheetsError::Jwt(format!("invalid private key: {e}")))?;
        Ok(Self {
            key,
            encoding_key,
            client,
            cached: Mutex::new(None),
        })
    }

    /// Build from a key file on disk.
    pub fn from_file(path: &Path, client: reqwest::Client) -> Result<Self, SheetsError> {
        Self::new(ServiceAccountKey::from_file(path)?, client)
    }

    fn sign_assertion(&self) -> Result<String, SheetsError> {
        let mut header = Header::new(Algorithm::RS256);
        header.kid.clone_from(&self.key.private_key_id);

        let iat = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: SPREADSHEETS_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SheetsError::Jwt(e.to_string()))
    }

    async fn exchange(&self) -> Result<CachedToken, SheetsError> {
        let assertion = self.sign_assertion()?;
        let resp = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SheetsError::TokenExchange {
                status: status.as_u16(),
                message,
            });
        }

        let data: TokenResponse = resp.json().await?;
        let lifetime = Duration::from_secs(data.expires_in).min(MAX_TOKEN_LIFETIME);
        Ok(CachedToken {
            token: data.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}

#[async_trait]
impl TokenProvider for ServiceAccountAuth {
    async fn access_token(&self) -> Result<String, SheetsError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + REFRESH_MARGIN < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        debug!(client_email = %self.key.client_email, "requesting access token");
        match self.exchange().await {
            Ok(fresh) => {
                metrics::counter!(AUTH_REFRESH_TOTAL, "status" => "success").increment(1);
                let token = fresh.token.clone();
                *cached = Some(fresh);
                Ok(token)
            }
            Err(e) => {
                metrics::counter!(AUTH_REFRESH_TOTAL, "status" => "failure").increment(1);
                warn!(error = %e, "access token exchange failed");
                Err(e)
            }
        }
    }
}
