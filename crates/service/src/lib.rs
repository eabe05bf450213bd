//! Service layer for postboard.
//! - `storage`: JSON collection store with transactional read-modify-write.
//! - `auth`: registration, login, and token verification.
//! - `post`: post creation, listing, likes, comments, deletion.

pub mod errors;
pub mod storage;
pub mod auth;
pub mod post;
pub mod pagination;
pub mod runtime;
