use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use models::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::domain::{AuthUser, Identity};
use super::errors::AuthError;

/// Session token capability: mint on login, verify on every guarded request.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &AuthUser) -> Result<String, AuthError>;
    fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 JWTs signed with a shared secret.
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtIssuer {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Hour counts beyond what `Duration` can hold are kept as `Duration::MAX`;
    /// `issue` then fails instead of minting a token.
    pub fn with_ttl_hours(secret: &str, hours: u64) -> Self {
        let ttl = i64::try_from(hours)
            .ok()
            .and_then(Duration::try_hours)
            .unwrap_or(Duration::MAX);
        Self::new(secret, ttl)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, user: &AuthUser) -> Result<String, AuthError> {
        let now = Utc::now();
        let expires = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AuthError::TokenError("token expiry out of range".into()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iat: now.timestamp() as usize,
            exp: expires.timestamp() as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AuthError::Unauthorized(e.to_string()))?;
        let user_id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AuthError::Unauthorized("malformed subject".into()))?;
        Ok(Identity { user_id, role: data.claims.role })
    }
}
