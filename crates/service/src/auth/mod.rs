//! Auth module: domain types, hashing/token capabilities, and the service.
//!
//! Password hashing and token signing sit behind `PasswordHasher` and
//! `TokenIssuer` so either can be swapped without touching `AuthService`.

pub mod crypto;
pub mod domain;
pub mod errors;
pub mod service;
pub mod token;

pub use crypto::{Argon2Hasher, PasswordHasher};
pub use domain::{AuthSession, AuthUser, Identity, LoginInput, RegisterInput};
pub use errors::AuthError;
pub use service::AuthService;
pub use token::{Claims, JwtIssuer, TokenIssuer};
