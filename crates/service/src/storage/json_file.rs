use std::{io::ErrorKind, marker::PhantomData, path::{Path, PathBuf}};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

use super::Collection;
use crate::errors::StorageError;

/// JSON file-backed collection.
///
/// Persists a `Vec<T>` as a pretty-printed JSON array at `<dir>/<name>.json`.
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a reader sees either the old or the new array, never a torn one.
pub struct JsonFileCollection<T> {
    name: String,
    file_path: PathBuf,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileCollection<T> {
    /// Open `<dir>/<name>.json`. Nothing is touched on disk until the first save.
    pub fn open(dir: impl AsRef<Path>, name: &str) -> Self {
        Self::at_path(dir.as_ref().join(format!("{name}.json")), name)
    }

    /// Open a collection stored at an explicit file path.
    pub fn at_path(path: impl Into<PathBuf>, name: &str) -> Self {
        Self {
            name: name.to_string(),
            file_path: path.into(),
            write_lock: Mutex::new(()),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| self.name.clone().into());
        name.push(".tmp");
        self.file_path.with_file_name(name)
    }
}

impl<T> JsonFileCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn read_all(&self) -> Result<Vec<T>, StorageError> {
        let bytes = match fs::read(&self.file_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(collection = %self.name, "collection file absent; loading empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StorageError::io(&self.file_path, e)),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
            path: self.file_path.display().to_string(),
            source,
        })
    }

    async fn write_all(&self, records: &[T]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(records)
            .map_err(|source| StorageError::Serialize { name: self.name.clone(), source })?;

        if let Some(parent) = self.file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| StorageError::io(parent, e))?;
        }
        let tmp = self.temp_path();
        fs::write(&tmp, data).await.map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &self.file_path)
            .await
            .map_err(|e| StorageError::io(&self.file_path, e))?;
        debug!(collection = %self.name, count = records.len(), "collection saved");
        Ok(())
    }
}

#[async_trait]
impl<T> Collection<T> for JsonFileCollection<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<T>, StorageError> {
        self.read_all().await.inspect_err(|e| {
            error!(collection = %self.name, error = %e, "collection load failed");
        })
    }

    async fn save(&self, records: &[T]) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        self.write_all(records).await
    }

    async fn update<R, E, F>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, E> + Send,
        R: Send,
        E: From<StorageError> + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let out = f(&mut records)?;
        self.write_all(&records).await.inspect_err(|e| {
            error!(collection = %self.name, error = %e, "collection write failed");
        })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;
    use uuid::Uuid;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rec {
        id: u32,
        label: String,
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("json_collection_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_loads_empty_and_save_round_trips() -> Result<(), anyhow::Error> {
        let dir = temp_dir();
        let coll = JsonFileCollection::<Rec>::open(&dir, "recs");

        // never written: empty, and nothing created on disk
        assert!(coll.load().await?.is_empty());
        assert!(!coll.path().exists());

        let recs = vec![Rec { id: 2, label: "b".into() }, Rec { id: 1, label: "a".into() }];
        coll.save(&recs).await?;
        assert_eq!(coll.load().await?, recs);

        // pretty-printed array on disk
        let raw = tokio::fs::read_to_string(coll.path()).await?;
        assert!(raw.starts_with("[\n"));
        assert!(!dir.join("recs.json.tmp").exists());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error_not_empty() -> Result<(), anyhow::Error> {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("recs.json"), b"{ not json").await?;
        let coll = JsonFileCollection::<Rec>::open(&dir, "recs");

        assert!(matches!(coll.load().await, Err(StorageError::Corrupt { .. })));

        // an update must not clobber the corrupt file
        let res: Result<(), StorageError> = coll.update(|recs| { recs.clear(); Ok(()) }).await;
        assert!(res.is_err());
        assert_eq!(tokio::fs::read(dir.join("recs.json")).await?, b"{ not json");

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn wrong_shape_is_corrupt() -> Result<(), anyhow::Error> {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("recs.json"), b"{\"id\": 1}").await?;
        let coll = JsonFileCollection::<Rec>::open(&dir, "recs");
        assert!(matches!(coll.load().await, Err(StorageError::Corrupt { .. })));
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn whitespace_file_loads_empty() -> Result<(), anyhow::Error> {
        let dir = temp_dir();
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("recs.json"), b"  \n").await?;
        let coll = JsonFileCollection::<Rec>::open(&dir, "recs");
        assert!(coll.load().await?.is_empty());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_closure_does_not_persist() -> Result<(), anyhow::Error> {
        let dir = temp_dir();
        let coll = JsonFileCollection::<Rec>::open(&dir, "recs");
        coll.save(&[Rec { id: 1, label: "a".into() }]).await?;

        #[derive(Debug)]
        enum Failure {
            Rejected,
            Storage,
        }
        impl From<StorageError> for Failure {
            fn from(_: StorageError) -> Self { Failure::Storage }
        }

        let res: Result<(), Failure> = coll
            .update(|recs| {
                recs.push(Rec { id: 2, label: "b".into() });
                Err(Failure::Rejected)
            })
            .await;
        assert!(matches!(res, Err(Failure::Rejected)));
        assert_eq!(coll.load().await?.len(), 1);

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_updates_do_not_lose_writes() -> Result<(), anyhow::Error> {
        let dir = temp_dir();
        let coll = Arc::new(JsonFileCollection::<Rec>::open(&dir, "recs"));

        let mut handles = Vec::new();
        for i in 0..20u32 {
            let coll = Arc::clone(&coll);
            handles.push(tokio::spawn(async move {
                coll.update(|recs| -> Result<(), StorageError> {
                    recs.push(Rec { id: i, label: format!("r{i}") });
                    Ok(())
                })
                .await
            }));
        }
        for h in handles {
            h.await??;
        }

        let mut ids: Vec<u32> = coll.load().await?.into_iter().map(|r| r.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..20).collect::<Vec<_>>());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
