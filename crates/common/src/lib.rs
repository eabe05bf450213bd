//! Shared runtime helpers for the postboard binaries and crates.
//! - Logging initialisation (`utils::logging`)
//! - Startup environment checks (`env`)
//! - Small wire types shared by routes (`types`)

pub mod env;
pub mod types;
pub mod utils;
