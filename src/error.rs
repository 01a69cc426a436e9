use reqwest::StatusCode;

/// Error type for the media metadata fetch path.
///
/// Durable-storage failures are deliberately absent: snapshot write errors
/// are logged and absorbed by the cache, and malformed stored entries are
/// dropped during hydration, so neither ever reaches a caller.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error: {}", .0.as_u16())]
    Status(StatusCode),

    #[error("Invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Service unavailable: {0}")]
    ServiceClosed(String),
}
