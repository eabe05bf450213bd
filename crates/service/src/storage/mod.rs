//! Storage abstractions for the service layer
//!
//! A collection is one entity type persisted as one JSON array. Services
//! never cache records between calls: every operation loads the whole
//! collection, works on it in memory, and hands it back for persistence.

use async_trait::async_trait;

use crate::errors::StorageError;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileCollection;
pub use memory::MemoryCollection;

/// Load/save contract for one collection of records.
#[async_trait]
pub trait Collection<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Collection name, e.g. `users` or `posts`.
    fn name(&self) -> &str;

    /// Read every record in stored order. A collection that was never
    /// written loads as empty; unreadable or malformed storage is an error.
    async fn load(&self) -> Result<Vec<T>, StorageError>;

    /// Replace the collection with `records`.
    async fn save(&self, records: &[T]) -> Result<(), StorageError>;

    /// Read-modify-write under the collection's lock.
    ///
    /// The records are persisted only if `f` returns `Ok`; writers to the
    /// same collection instance never interleave.
    async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E> + Send,
        R: Send,
        E: From<StorageError> + Send;
}
