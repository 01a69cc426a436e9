use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Configurable options for the media fetch service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum age of a cache entry before it is considered invalid.
    pub cache_ttl: Duration,

    /// Quiet period over which cache mutations are coalesced into a single
    /// durable snapshot write.
    pub persist_debounce: Duration,

    /// Path of the persisted cache snapshot. If `None`, a file under the
    /// system temp dir is used.
    pub cache_file: Option<PathBuf>,

    /// Overall timeout for the entire HTTP request.
    pub timeout: Duration,

    /// Connection timeout (time to establish initial connection).
    pub connect_timeout: Duration,

    /// User agent string sent to the metadata API.
    pub user_agent: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(3600),
            persist_debounce: Duration::from_secs(2),
            cache_file: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        }
    }
}

impl ServiceConfig {
    /// Resolve the snapshot path, falling back to the system temp dir.
    pub fn cache_file_path(&self) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("clipfetch-cache.json"))
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_persist_debounce(mut self, debounce: Duration) -> Self {
        self.persist_debounce = debounce;
        self
    }

    pub fn with_cache_file(mut self, path: PathBuf) -> Self {
        self.cache_file = Some(path);
        self
    }
}
