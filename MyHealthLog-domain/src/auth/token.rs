use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::Claims;
use crate::config::JwtConfig;

/// Security errors for token operations
#[derive(Debug, Error)]
pub enum SecurityError {
    /// Expired token
    #[error("Token has expired")]
    TokenExpired,

    /// Signature, issuer or structure rejected
    #[error("Invalid token")]
    InvalidToken,

    /// Subject is not a user id
    #[error("Malformed token subject")]
    MalformedSubject,

    /// Encoding failed
    #[error("Token generation error: {0}")]
    Generation(String),
}

/// Issues and verifies HS256 session tokens
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.config.issuer)
            .field("expiration", &self.config.expiration)
            .finish()
    }
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a token whose subject is the user id
    pub fn generate(&self, user_id: i64) -> Result<String, SecurityError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.config.expiration).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            error!("Failed to generate token: {}", e);
            SecurityError::Generation(e.to_string())
        })
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.issuer]);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("Token validation failed: {}", e);
            match e.kind() {
                ErrorKind::ExpiredSignature => SecurityError::TokenExpired,
                _ => SecurityError::InvalidToken,
            }
        })?;

        Ok(data.claims)
    }

    /// Validate a token and return the user id it was issued for
    pub fn user_id(&self, token: &str) -> Result<i64, SecurityError> {
        let claims = self.validate(token)?;
        claims.sub.parse().map_err(|_| SecurityError::MalformedSubject)
    }
}
