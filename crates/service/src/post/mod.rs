//! Posts: creation, listing, likes, comments and deletion.
//!
//! `rules` holds the pure collection logic; `PostService` runs it inside a
//! storage `update` so every mutation is persisted or not at all.

pub mod errors;
pub mod rules;
pub mod service;

pub use errors::PostError;
pub use service::PostService;
