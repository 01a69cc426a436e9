//! Common types for the media metadata cache.

use serde_json::Value;
use url::Url;

/// A live in-memory cache entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Parsed response body from the metadata API.
    pub data: Value,
    /// Insert/refresh instant, milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

/// Result of a successful cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheHit {
    pub data: Value,
    /// Entry age at lookup time, `now - timestamp`, in milliseconds.
    pub age_ms: u64,
}

/// Derive the cache key for a metadata API request.
///
/// An explicit key always wins. Otherwise the key is the decoded `url`
/// (then `source`) query parameter of the API URL, so distinct API calls
/// that target the same underlying resource collapse to one cache slot.
/// If the URL cannot be parsed or carries neither parameter, the raw URL
/// is used as-is.
pub fn derive_cache_key(api_url: &str, explicit: Option<&str>) -> String {
    if let Some(key) = explicit
        && !key.is_empty()
    {
        return key.to_owned();
    }

    if let Ok(parsed) = Url::parse(api_url) {
        for param in ["url", "source"] {
            if let Some((_, value)) = parsed.query_pairs().find(|(k, _)| k == param) {
                return value.into_owned();
            }
        }
    }

    api_url.to_owned()
}
