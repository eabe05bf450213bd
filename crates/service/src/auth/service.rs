use std::sync::Arc;

use chrono::Utc;
use models::{user, User};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::crypto::PasswordHasher;
use super::domain::{AuthSession, AuthUser, Identity, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::token::TokenIssuer;
use crate::storage::Collection;

/// Auth business service independent of web framework
pub struct AuthService<C: Collection<User>> {
    users: Arc<C>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
}

impl<C: Collection<User>> AuthService<C> {
    pub fn new(users: Arc<C>, hasher: Arc<dyn PasswordHasher>, tokens: Arc<dyn TokenIssuer>) -> Self {
        Self { users, hasher, tokens }
    }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::auth::{AuthService, Argon2Hasher, JwtIssuer, RegisterInput};
    /// use service::storage::MemoryCollection;
    ///
    /// let svc = AuthService::new(
    ///     Arc::new(MemoryCollection::new("users")),
    ///     Arc::new(Argon2Hasher::new()),
    ///     Arc::new(JwtIssuer::with_ttl_hours("secret", 1)),
    /// );
    /// let input = RegisterInput {
    ///     name: "Alice".into(),
    ///     email: "a@x.com".into(),
    ///     password: "secret1".into(),
    ///     confirm_password: "secret1".into(),
    /// };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "a@x.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        validate_registration(&input)?;
        let email = user::normalize_email(&input.email);

        // hash outside the collection lock; it is the slow part
        let password_hash = self.hasher.hash(&input.password)?;

        let created = self
            .users
            .update(|users| {
                if users.iter().any(|u| user::normalize_email(&u.email) == email) {
                    debug!(%email, "email already registered");
                    return Err(AuthError::Conflict);
                }
                let record = User {
                    id: Uuid::new_v4(),
                    name: input.name.trim().to_string(),
                    email: email.clone(),
                    password_hash,
                    role: Default::default(),
                    created_at: Some(Utc::now()),
                };
                let view = AuthUser::from(&record);
                users.push(record);
                Ok(view)
            })
            .await?;

        info!(user_id = %created.id, email = %created.email, "user_registered");
        Ok(created)
    }

    /// Authenticate a user and issue a session token.
    ///
    /// Unknown email and wrong password produce the same error.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("email and password are required".into()));
        }
        let email = user::normalize_email(&input.email);

        let users = self.users.load().await?;
        let Some(found) = users.iter().find(|u| user::normalize_email(&u.email) == email) else {
            warn!("login failed");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.hasher.verify(&input.password, &found.password_hash) {
            warn!(user_id = %found.id, "login failed");
            return Err(AuthError::InvalidCredentials);
        }

        let user = AuthUser::from(found);
        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    /// Verify a bearer token and return the identity it asserts.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        self.tokens.verify(token)
    }

    /// Look up the record behind a verified identity.
    pub async fn current_user(&self, identity: &Identity) -> Result<AuthUser, AuthError> {
        let users = self.users.load().await?;
        users
            .iter()
            .find(|u| u.id == identity.user_id)
            .map(AuthUser::from)
            .ok_or(AuthError::NotFound)
    }
}

/// Field checks in the order clients see them reported.
pub fn validate_registration(input: &RegisterInput) -> Result<(), AuthError> {
    let blank = |s: &str| s.trim().is_empty();
    if blank(&input.name) || blank(&input.email) || input.password.is_empty() || input.confirm_password.is_empty() {
        return Err(AuthError::Validation("all fields are required".into()));
    }
    if input.password != input.confirm_password {
        return Err(AuthError::Validation("passwords do not match".into()));
    }
    user::validate_email(input.email.trim())?;
    user::validate_password(&input.password)?;
    Ok(())
}
