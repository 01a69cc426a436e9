//! Persistent TTL cache for media metadata.
//!
//! An in-memory key to entry map, lazily hydrated once per process from a
//! durable snapshot, pruned by TTL on lookup and on demand, and written back
//! through a debounced whole-snapshot persist. Storage I/O failures are
//! logged and absorbed, never surfaced: durable state is allowed to lag and
//! self-heals on the next successful persist.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::cache::storage::{CacheStorage, StoredEntry};
use crate::cache::types::{CacheEntry, CacheHit};
use crate::clock::Clock;
use crate::config::ServiceConfig;

/// Cloneable handle to the process-wide media metadata cache.
#[derive(Clone)]
pub struct MediaCache {
    inner: Arc<CacheInner>,
}

struct CacheInner {
    entries: Mutex<HashMap<String, CacheEntry>>,
    hydrated: OnceCell<()>,
    persist_pending: AtomicBool,
    storage: Arc<dyn CacheStorage>,
    clock: Arc<dyn Clock>,
    ttl_ms: u64,
    debounce: Duration,
}

impl MediaCache {
    pub fn new(
        storage: Arc<dyn CacheStorage>,
        clock: Arc<dyn Clock>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: Mutex::new(HashMap::new()),
                hydrated: OnceCell::new(),
                persist_pending: AtomicBool::new(false),
                storage,
                clock,
                ttl_ms: config.cache_ttl.as_millis() as u64,
                debounce: config.persist_debounce,
            }),
        }
    }

    /// Populate the map from durable storage, at most once per process.
    ///
    /// Concurrent callers join the same in-flight read. Only well-formed
    /// stored entries that are still within TTL are admitted; the rest are
    /// dropped silently. A failed storage read leaves the cache empty.
    pub async fn ensure_hydrated(&self) {
        self.inner
            .hydrated
            .get_or_init(|| async {
                let stored = match self.inner.storage.load().await {
                    Ok(stored) => stored,
                    Err(e) => {
                        warn!(error = %e, "failed to load cache snapshot, starting empty");
                        return;
                    }
                };

                let now = self.inner.clock.now_ms();
                let mut admitted = 0usize;
                let mut dropped = 0usize;
                let mut entries = self.inner.entries.lock();
                for entry in stored {
                    if entry.key.is_empty() || entry.data.is_null() {
                        dropped += 1;
                        continue;
                    }
                    if now.saturating_sub(entry.timestamp) > self.inner.ttl_ms {
                        dropped += 1;
                        continue;
                    }
                    entries.insert(
                        entry.key,
                        CacheEntry {
                            data: entry.data,
                            timestamp_ms: entry.timestamp,
                        },
                    );
                    admitted += 1;
                }
                debug!(admitted, dropped, "cache hydrated from storage");
            })
            .await;
    }

    /// Look up a key, evicting it if it has outlived the TTL.
    pub fn lookup(&self, key: &str) -> Option<CacheHit> {
        if key.is_empty() {
            return None;
        }

        let now = self.inner.clock.now_ms();
        {
            let mut entries = self.inner.entries.lock();
            let entry = entries.get(key)?;
            let age_ms = now.saturating_sub(entry.timestamp_ms);
            if age_ms <= self.inner.ttl_ms {
                return Some(CacheHit {
                    data: entry.data.clone(),
                    age_ms,
                });
            }
            entries.remove(key);
        }

        debug!(key, "cache entry expired on lookup");
        self.schedule_persist();
        None
    }

    /// Insert or replace an entry, stamping it with the current time.
    /// No-op on an empty key or a `null` payload.
    pub fn upsert(&self, key: &str, data: Value) {
        if key.is_empty() || data.is_null() {
            return;
        }

        let timestamp_ms = self.inner.clock.now_ms();
        self.inner.entries.lock().insert(
            key.to_owned(),
            CacheEntry { data, timestamp_ms },
        );
        self.schedule_persist();
    }

    /// Remove every entry older than the TTL.
    pub fn prune_expired(&self) {
        let now = self.inner.clock.now_ms();
        let removed = {
            let mut entries = self.inner.entries.lock();
            let before = entries.len();
            entries.retain(|_, e| now.saturating_sub(e.timestamp_ms) <= self.inner.ttl_ms);
            before - entries.len()
        };

        debug!(removed, "pruned expired cache entries");
        if removed > 0 {
            self.schedule_persist();
        }
    }

    /// Arm a debounced snapshot write unless one is already pending.
    ///
    /// Coalesces bursty mutation into a single durable write per debounce
    /// window; at most one window of mutations can be lost on abrupt
    /// termination.
    pub fn schedule_persist(&self) {
        if self.inner.persist_pending.swap(true, Ordering::AcqRel) {
            return;
        }

        let cache = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(cache.inner.debounce).await;
            cache.inner.persist_pending.store(false, Ordering::Release);
            cache.persist_now().await;
        });
    }

    /// Overwrite the durable snapshot with the full map, immediately.
    pub async fn persist_now(&self) {
        let snapshot: Vec<StoredEntry> = {
            let entries = self.inner.entries.lock();
            entries
                .iter()
                .map(|(key, entry)| StoredEntry {
                    key: key.clone(),
                    data: entry.data.clone(),
                    timestamp: entry.timestamp_ms,
                })
                .collect()
        };

        match self.inner.storage.save(&snapshot).await {
            Ok(()) => debug!(entries = snapshot.len(), "cache snapshot persisted"),
            Err(e) => warn!(error = %e, "failed to persist cache snapshot"),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.lock().is_empty()
    }
}
