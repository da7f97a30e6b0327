//! JWT token generation and validation
//!
//! Access tokens carry `{sub: username, id: user id, exp}` and are signed
//! with a shared HMAC secret. Keys are derived once and shared via `Arc`.

use crate::config::JwtConfig;
use crate::error::ApiError;
use anyhow::{bail, Context, Result};
use auth_service_shared::TokenData;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// User ID
    pub id: Uuid,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Derive keys from a shared secret. Call once at startup.
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Cheap to clone; build once and keep it in `AppState`.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    algorithm: Algorithm,
    access_token_ttl: Duration,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Only HMAC algorithms are accepted since keys come from a shared secret.
    pub fn new(secret: &str, algorithm: Algorithm, access_token_ttl: Duration) -> Result<Self> {
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            bail!("Unsupported JWT algorithm: {:?}", algorithm);
        }

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            keys: JwtKeys::new(secret),
            algorithm,
            access_token_ttl,
            validation: Arc::new(validation),
        })
    }

    /// Build the service from the `jwt` configuration section
    pub fn from_config(config: &JwtConfig) -> Result<Self> {
        let ttl = Duration::try_minutes(config.access_token_expire_minutes)
            .context("access token lifetime out of range")?;
        let service = Self::new(config.secret_key.expose_secret(), config.algorithm, ttl)?;
        Ok(service.with_leeway(config.leeway_secs))
    }

    /// Tolerate this much clock skew when checking `exp`
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        let mut validation = (*self.validation).clone();
        validation.leeway = leeway_secs;
        self.validation = Arc::new(validation);
        self
    }

    /// Configured lifetime of tokens minted by [`JwtService::issue_access_token`]
    #[inline]
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    #[inline]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Mint a token valid for the configured lifetime
    #[inline]
    pub fn issue_access_token(&self, username: &str, user_id: Uuid) -> Result<String> {
        self.create_access_token(username, user_id, self.access_token_ttl)
    }

    /// Mint a token that expires `expires_delta` from now
    #[inline]
    pub fn create_access_token(
        &self,
        username: &str,
        user_id: Uuid,
        expires_delta: Duration,
    ) -> Result<String> {
        self.create_access_token_at(username, user_id, expires_delta, Utc::now())
    }

    /// Mint a token as if issued at `issued_at`
    pub fn create_access_token_at(
        &self,
        username: &str,
        user_id: Uuid,
        expires_delta: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String> {
        let expires_at = issued_at
            .checked_add_signed(expires_delta)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: username.to_string(),
            id: user_id,
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(self.algorithm), &claims, self.keys.encoding())
            .context("Failed to generate access token")
    }

    /// Decode a token, checking signature, algorithm and expiry
    pub fn decode_claims(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .context("Invalid token")?;
        Ok(token_data.claims)
    }

    /// Verify a bearer token and extract the caller's identity
    ///
    /// Every failure collapses into the same 401; the cause is only logged.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenData, ApiError> {
        match self.decode_claims(token) {
            Ok(claims) => {
                metrics::counter!("auth_token_verifications_total", "outcome" => "accepted")
                    .increment(1);
                Ok(TokenData { user_id: claims.id })
            }
            Err(e) => {
                metrics::counter!("auth_token_verifications_total", "outcome" => "rejected")
                    .increment(1);
                warn!("Could not validate credentials: {:#}", e);
                Err(ApiError::invalid_token())
            }
        }
    }
}
