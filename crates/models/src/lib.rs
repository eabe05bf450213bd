//! Entities persisted in the JSON collections, plus field-level validation.

pub mod errors;
pub mod post;
pub mod user;

pub use post::{Comment, Post, Visibility};
pub use user::{Role, User};
