//! Clock seam for the cache.
//!
//! Entry timestamps are wall-clock milliseconds since the Unix epoch so they
//! survive a round-trip through the persisted snapshot. Taking the clock as
//! a trait object lets tests drive expiry deterministically.

use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System wall clock, the production implementation.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}
