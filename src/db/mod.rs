//! Flat-file record stores.
//!
//! Each entity type lives in a single JSON array file that is read in full
//! on every access and rewritten in full on every mutation. Mutations inside
//! one process are serialized through [`JsonStore::write`]; nothing guards
//! against a second process writing the same file.

mod models;
mod seeders;

pub use models::*;
pub use seeders::seed_default_users;

use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info};

pub const SESSIONS_FILE: &str = "sessions.json";
pub const USERS_FILE: &str = "users.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} is not a valid JSON array: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A JSON array file holding every record of type `T`.
#[derive(Debug)]
pub struct JsonStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned + Record,
{
    /// Open the store at `path`, creating parent directories and an empty
    /// array file if none exists yet.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let store = Self {
            path,
            write_lock: Mutex::new(()),
            _records: PhantomData,
        };

        if !store.exists().await {
            info!(path = %store.path.display(), "Creating empty store file");
            store.save(&[]).await?;
        }

        Ok(store)
    }

    /// Whether the backing file is present on disk.
    pub async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }

    /// Read every record. A missing file reads as an empty store.
    pub async fn load(&self) -> Result<Vec<T>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn find(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.load().await?.into_iter().find(|r| r.id() == id))
    }

    /// Rewrite the whole file. The new content is written to a sibling
    /// temporary file and renamed over the old one.
    async fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(records).map_err(|source| StoreError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| StoreError::io(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        debug!(path = %self.path.display(), records = records.len(), "Store rewritten");
        Ok(())
    }

    /// Load the store for a read-modify-write cycle. Other writers in this
    /// process wait until the returned guard is committed or dropped.
    pub async fn write(&self) -> Result<StoreWriter<'_, T>, StoreError> {
        let guard = self.write_lock.lock().await;
        let records = self.load().await?;
        Ok(StoreWriter {
            store: self,
            records,
            _guard: guard,
        })
    }
}

/// In-memory copy of a store held under its write lock.
pub struct StoreWriter<'a, T>
where
    T: Serialize + DeserializeOwned + Record,
{
    store: &'a JsonStore<T>,
    records: Vec<T>,
    _guard: MutexGuard<'a, ()>,
}

impl<'a, T> StoreWriter<'a, T>
where
    T: Serialize + DeserializeOwned + Record,
{
    pub fn records(&self) -> &[T] {
        &self.records
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    pub fn push(&mut self, record: T) {
        self.records.push(record);
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.position(id).map(|index| self.records.remove(index))
    }

    /// Persist the modified records and release the lock.
    pub async fn commit(self) -> Result<(), StoreError> {
        self.store.save(&self.records).await
    }
}
