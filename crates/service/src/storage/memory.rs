use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Collection;
use crate::errors::StorageError;

/// In-memory collection for tests, benches and doc examples.
///
/// Same transactional behaviour as the file store: a failed `update`
/// leaves the records untouched.
pub struct MemoryCollection<T> {
    name: String,
    records: Mutex<Vec<T>>,
}

impl<T> MemoryCollection<T> {
    pub fn new(name: &str) -> Self {
        Self::with_records(name, Vec::new())
    }

    pub fn with_records(name: &str, records: Vec<T>) -> Self {
        Self { name: name.to_string(), records: Mutex::new(records) }
    }
}

#[async_trait]
impl<T> Collection<T> for MemoryCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<T>, StorageError> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        *self.records.lock().await = records.to_vec();
        Ok(())
    }

    async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E> + Send,
        R: Send,
        E: From<StorageError> + Send,
    {
        let mut guard = self.records.lock().await;
        let mut working = guard.clone();
        let out = f(&mut working)?;
        *guard = working;
        Ok(out)
    }
}
