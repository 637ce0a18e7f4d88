//! OAuth access tokens for a Google service account (JWT bearer grant).

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult};
use crate::config::ServiceAccountKey;

/// Scope granting read and write access to spreadsheets.
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each signed assertion, in seconds (Google's maximum).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// A cached token is replaced this long before it expires.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Mints and caches access tokens for one service account and scope.
pub struct ServiceAccountAuth {
    client_email: String,
    key_id: Option<String>,
    token_uri: String,
    scope: String,
    encoding_key: EncodingKey,
    client: Client,
    cache: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Parses the PEM key up front so a bad key fails at startup.
    pub fn new(key: &ServiceAccountKey, scope: &str, client: Client) -> StoreResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        Ok(Self {
            client_email: key.client_email.clone(),
            key_id: key.private_key_id.clone(),
            token_uri: key.token_uri.clone(),
            scope: scope.to_string(),
            encoding_key,
            client,
            cache: Mutex::new(None),
        })
    }

    /// A token valid for at least [`REFRESH_MARGIN_SECS`] more seconds.
    pub fn access_token(&self) -> StoreResult<String> {
        let now = Utc::now();
        let mut cache = self.cache.lock()?;
        if let Some(cached) = cache.as_ref() {
            if cached.expires_at - Duration::seconds(REFRESH_MARGIN_SECS) > now {
                return Ok(cached.token.clone());
            }
        }

        let response = self.request_token(now)?;
        tracing::debug!(
            account = %self.client_email,
            expires_in = response.expires_in,
            "Minted service-account access token"
        );
        let token = response.access_token;
        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: now + Duration::seconds(response.expires_in),
        });
        Ok(token)
    }

    /// Drop the cached token, e.g. after the API rejects it.
    pub fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            *cache = None;
        }
    }

    fn signed_assertion(&self, now: DateTime<Utc>) -> StoreResult<String> {
        let iat = now.timestamp();
        let claims = Claims {
            iss: &self.client_email,
            scope: &self.scope,
            aud: &self.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let header = Header {
            kid: self.key_id.clone(),
            ..Header::new(Algorithm::RS256)
        };
        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    fn request_token(&self, now: DateTime<Utc>) -> StoreResult<TokenResponse> {
        let assertion = self.signed_assertion(now)?;
        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), account = %self.client_email, "Token request rejected");
            return Err(StoreError::TokenRequest {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json()?)
    }
}
