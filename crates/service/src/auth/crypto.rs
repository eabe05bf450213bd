use argon2::{
    password_hash::{PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use super::errors::AuthError;

/// One-way password hashing capability.
pub trait PasswordHasher: Send + Sync {
    /// Hash `password` with a fresh salt, returning a self-describing string.
    fn hash(&self, password: &str) -> Result<String, AuthError>;
    /// Whether `password` matches `hash`. Unparseable hashes never match.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with the crate's default cost parameters, PHC string output.
#[derive(Default, Clone)]
pub struct Argon2Hasher {
    argon: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
                return false;
            }
        };
        self.argon.verify_password(password.as_bytes(), &parsed).is_ok()
    }
}
