//! JSON-file entity store
//!
//! The whole workspace is one JSON [`Dataset`] document. Reads are served
//! from memory. A mutation is applied to a copy of the working set, the copy
//! is written to a sibling temp file and renamed over the original, and only
//! then does it replace the working set. A failed write leaves both the file
//! and the in-memory state untouched.

use crate::error::StoreError;
use crate::filter::Filter;
use crate::memory::MemoryStore;
use crate::store::EntityStore;
use foundry_model::{Dataset, EntityId, EntityKind, Patch, Record};
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// File-backed entity store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    memory: MemoryStore,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open the document at `path`
    ///
    /// A missing file is an empty workspace; it is created on first write.
    ///
    /// # Errors
    /// The file exists but cannot be read or does not hold a valid dataset.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let dataset = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Dataset::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Dataset::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), records = dataset.len(), "opened workspace file");
        Ok(Self {
            memory: MemoryStore::from_dataset(dataset)?,
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of every record
    #[must_use]
    pub fn snapshot(&self) -> Dataset {
        self.memory.snapshot()
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }

    async fn persist(&self, state: &MemoryStore) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(&state.snapshot())?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "persisted workspace");
        Ok(())
    }
}

#[async_trait::async_trait]
impl EntityStore for FileStore {
    async fn find(&self, kind: EntityKind, filter: &Filter) -> Result<Vec<Record>, StoreError> {
        self.memory.select(kind, filter)
    }

    async fn insert(&self, record: Record) -> Result<Record, StoreError> {
        let _guard = self.write_lock.lock().await;
        let next = self.memory.fork();
        let stored = next.put(record)?;
        self.persist(&next).await?;
        self.memory.adopt(next);
        Ok(stored)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: &EntityId,
        patch: Patch,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let next = self.memory.fork();
        if next.patch(kind, id, patch)? {
            self.persist(&next).await?;
            self.memory.adopt(next);
        }
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &EntityId) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let next = self.memory.fork();
        if next.remove(kind, id) {
            self.persist(&next).await?;
            self.memory.adopt(next);
        }
        Ok(())
    }

    async fn load_dataset(&self) -> Result<Dataset, StoreError> {
        Ok(self.memory.snapshot())
    }
}
