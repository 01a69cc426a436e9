//! Durable storage for cache snapshots.
//!
//! A snapshot is one JSON array of [`StoredEntry`] records written under a
//! single path with whole-value overwrite semantics. There is no version
//! field; the store's admission filter tolerates malformed records on the
//! way back in.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tokio::io;

/// Serde form of a cache entry as persisted in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub timestamp: u64,
}

/// A collaborator that can load and overwrite the cache snapshot.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Read the last persisted snapshot. A missing snapshot is an empty one.
    async fn load(&self) -> io::Result<Vec<StoredEntry>>;

    /// Overwrite the snapshot wholesale with the given entries.
    async fn save(&self, entries: &[StoredEntry]) -> io::Result<()>;
}

/// File-backed snapshot storage.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl CacheStorage for FileStorage {
    async fn load(&self) -> io::Result<Vec<StoredEntry>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    async fn save(&self, entries: &[StoredEntry]) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec(entries)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, bytes).await
    }
}

/// In-memory snapshot storage.
///
/// Used as a no-persistence mode and as a deterministic collaborator in
/// tests, where its load/save counters expose how often the store actually
/// touched durable state.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: parking_lot::Mutex<Vec<StoredEntry>>,
    loads: std::sync::atomic::AtomicUsize,
    saves: std::sync::atomic::AtomicUsize,
    fail_loads: std::sync::atomic::AtomicBool,
    fail_saves: std::sync::atomic::AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<StoredEntry>) -> Self {
        let storage = Self::default();
        *storage.entries.lock() = entries;
        storage
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Snapshot as of the last successful save.
    pub fn entries(&self) -> Vec<StoredEntry> {
        self.entries.lock().clone()
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn load(&self) -> io::Result<Vec<StoredEntry>> {
        self.loads.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_loads.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(std::io::Error::other("injected load failure"));
        }
        Ok(self.entries.lock().clone())
    }

    async fn save(&self, entries: &[StoredEntry]) -> io::Result<()> {
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_saves.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(std::io::Error::other("injected save failure"));
        }
        *self.entries.lock() = entries.to_vec();
        Ok(())
    }
}
