//! # Clipfetch
//!
//! Background service core for a short-form-video download tool: resolves a
//! video page URL to downloadable media metadata via a remote JSON API,
//! fronted by a TTL-bounded, persistently-backed cache.
//!
//! ## Features
//!
//! - In-memory cache with 1-hour TTL and lazy one-time hydration from a
//!   durable JSON snapshot
//! - Debounced write-back bounding write amplification under bursty updates
//! - Cache keys derived from the target resource URL, so different API call
//!   shapes for the same resource share one slot
//! - Typed request/response channel for hosting the service

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod service;

pub use cache::{CacheHit, CacheStorage, FileStorage, MediaCache, MemoryStorage, derive_cache_key};
pub use clock::{Clock, SystemClock};
pub use config::ServiceConfig;
pub use error::FetchError;
pub use fetch::{MediaFetcher, MediaResponse};
pub use logging::{LogOptions, OpTimer};
pub use service::{MediaService, ServiceHandle, ServiceRequest, VideoAck};
