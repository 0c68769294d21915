//! JWT token management
//!
//! Handles creation and validation of the bearer tokens handed out on login
//! and checked by the authentication middleware.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ApiError;
use crate::user::error::UserError;

/// Token returned to the client on successful login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub token: String,
    pub created: DateTime<Utc>,
    /// Lifetime in seconds
    pub expiry: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates opaque authentication tokens
pub trait TokenProvider: Send + Sync {
    fn issue(&self, user_id: Uuid) -> Result<Token, UserError>;

    fn validate(&self, token: &str) -> Result<Claims, ApiError>;
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_seconds: i64,
}

// Custom Debug implementation to hide sensitive keys
impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("encoding_key", &"<hidden>")
            .field("decoding_key", &"<hidden>")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl JwtService {
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

impl TokenProvider for JwtService {
    fn issue(&self, user_id: Uuid) -> Result<Token, UserError> {
        let now = Utc::now();
        let expires_at = Duration::try_seconds(self.ttl_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                UserError::Token(format!("Token lifetime out of range: {}s", self.ttl_seconds))
            })?;
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| UserError::Token(format!("Failed to generate an access token: {}", e)))?;

        Ok(Token {
            token,
            created: now,
            expiry: self.ttl_seconds,
        })
    }

    fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid access token: {}", e)))
    }
}
