// JWT token creation and verification
// Stateless bearer tokens: subject (username) plus absolute expiry

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (username)
/// * `exp` - Expiry time (seconds since epoch)
/// * `iat` - Issue time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token lifetime {0} overflows the expiry timestamp")]
    ExpiryOverflow(Duration),

    #[error(transparent)]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies access tokens with a shared HMAC secret
///
/// There is no revocation: a token stays valid until its expiry.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    default_ttl: Duration,
}

impl TokenService {
    /// Creates a token service
    ///
    /// # Arguments
    /// * `secret` - HMAC secret
    /// * `algorithm` - HS256, HS384 or HS512
    /// * `default_ttl` - lifetime used by `issue_default`
    pub fn new(secret: &str, algorithm: Algorithm, default_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Creates a token for `subject` that expires `ttl` from now
    ///
    /// # Example
    /// ```
    /// use chrono::Duration;
    /// use jsonwebtoken::Algorithm;
    /// use keystone_api::auth::jwt::TokenService;
    ///
    /// let tokens = TokenService::new("your-secret-key", Algorithm::HS256, Duration::days(30));
    /// let token = tokens.issue("johndoe", Duration::hours(1)).expect("valid token");
    /// assert_eq!(tokens.verify(&token).as_deref(), Some("johndoe"));
    /// ```
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOverflow(ttl))?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Creates a token with the configured default lifetime
    pub fn issue_default(&self, subject: &str) -> Result<String, TokenError> {
        self.issue(subject, self.default_ttl)
    }

    /// Verifies a token and returns its subject
    ///
    /// Expired, malformed, tampered and wrongly-signed tokens all yield
    /// `None`; callers cannot tell the cases apart.
    pub fn verify(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = match decode::<Claims>(token, &self.decoding_key, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!(error = %e, "rejected access token");
                return None;
            }
        };

        // Expiry must lie strictly in the future
        if claims.exp <= Utc::now().timestamp() || claims.sub.is_empty() {
            return None;
        }

        Some(claims.sub)
    }
}
