//! # Cache System
//!
//! Persistent TTL cache for media metadata: an in-memory map with lazy
//! one-time hydration from a durable snapshot and debounced write-back.

mod store;
pub mod storage;
mod types;

pub use storage::{CacheStorage, FileStorage, MemoryStorage, StoredEntry};
pub use store::MediaCache;
pub use types::{CacheEntry, CacheHit, derive_cache_key};
