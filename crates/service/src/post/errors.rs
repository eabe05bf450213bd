use models::errors::ModelError;
use thiserror::Error;
use uuid::Uuid;

use crate::errors::StorageError;

#[derive(Debug, Error)]
pub enum PostError {
    #[error("{0}")]
    Validation(String),
    #[error("post {0} not found")]
    NotFound(Uuid),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PostError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            PostError::Validation(_) => 2001,
            PostError::NotFound(_) => 2002,
            PostError::Forbidden(_) => 2003,
            PostError::Storage(_) => 2200,
        }
    }
}

impl From<ModelError> for PostError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => PostError::Validation(msg),
        }
    }
}
