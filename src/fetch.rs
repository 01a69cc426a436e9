//! Fetch orchestrator for media metadata requests.
//!
//! Coordinates cache hydration, TTL pruning, key derivation, lookup, and
//! the remote API call on a miss. The application-level cache is
//! authoritative, so the HTTP client disables transport-level caching and
//! always hits the origin.

use reqwest::Client;
use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::{MediaCache, derive_cache_key};
use crate::config::ServiceConfig;
use crate::error::FetchError;
use crate::logging::OpTimer;

/// Reply for a single media metadata request.
///
/// Serializes as `{ data, cacheHit, cacheAge }`, the wire form the popup
/// protocol expects.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MediaResponse {
    pub data: Value,
    pub cache_hit: bool,
    /// Age of the returned entry in milliseconds; 0 for a fresh fetch.
    pub cache_age: u64,
}

#[derive(Clone)]
pub struct MediaFetcher {
    client: Client,
    cache: MediaCache,
}

impl MediaFetcher {
    pub fn new(cache: MediaCache, config: &ServiceConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        Ok(Self { client, cache })
    }

    /// Resolve one metadata request: serve from cache within TTL, otherwise
    /// fetch from the remote API and cache the parsed payload.
    ///
    /// A successful fetch upserts exactly once before this future resolves,
    /// so a subsequent lookup for the same key observes the fresh data.
    pub async fn fetch_media_data(
        &self,
        api_url: &str,
        cache_key: Option<&str>,
    ) -> Result<MediaResponse, FetchError> {
        self.cache.ensure_hydrated().await;
        self.cache.prune_expired();

        let key = derive_cache_key(api_url, cache_key);
        if let Some(hit) = self.cache.lookup(&key) {
            debug!(key, age_ms = hit.age_ms, "serving media metadata from cache");
            return Ok(MediaResponse {
                data: hit.data,
                cache_hit: true,
                cache_age: hit.age_ms,
            });
        }

        debug!(key, "cache miss, fetching media metadata from remote");
        let timer = OpTimer::start("media metadata fetch");

        let response = match self.client.get(api_url).send().await {
            Ok(response) => response,
            Err(e) => {
                timer.failure(&e);
                return Err(FetchError::Transport(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let err = FetchError::Status(status);
            timer.failure(&err);
            return Err(err);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                timer.failure(&e);
                return Err(FetchError::Transport(e));
            }
        };

        let data: Value = match serde_json::from_str(&body) {
            Ok(data) => data,
            Err(e) => {
                timer.failure(&e);
                return Err(FetchError::Parse(e));
            }
        };

        timer.success();
        self.cache.upsert(&key, data.clone());

        Ok(MediaResponse {
            data,
            cache_hit: false,
            cache_age: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::clock::SystemClock;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher() -> MediaFetcher {
        let config = ServiceConfig::default();
        let cache = MediaCache::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            &config,
        );
        MediaFetcher::new(cache, &config).unwrap()
    }

    fn api_url(server: &MockServer) -> String {
        format!(
            "{}/api/media?url=https%3A%2F%2Fsite%2Fv%2F1&api_key=Demo",
            server.uri()
        )
    }

    #[tokio::test]
    async fn miss_then_hit_makes_exactly_one_remote_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "v1"})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let url = api_url(&server);

        let first = fetcher.fetch_media_data(&url, None).await.unwrap();
        assert!(!first.cache_hit);
        assert_eq!(first.cache_age, 0);
        assert_eq!(first.data, json!({"title": "v1"}));

        let second = fetcher.fetch_media_data(&url, None).await.unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.data, json!({"title": "v1"}));
    }

    #[tokio::test]
    async fn requests_for_the_same_resource_share_a_cache_slot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "v1"})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher();
        fetcher
            .fetch_media_data(&api_url(&server), None)
            .await
            .unwrap();

        // Different wrapper query, same underlying resource.
        let alternate = format!(
            "{}/api/media?api_key=Other&url=https%3A%2F%2Fsite%2Fv%2F1",
            server.uri()
        );
        let reply = fetcher.fetch_media_data(&alternate, None).await.unwrap();
        assert!(reply.cache_hit);
    }

    #[tokio::test]
    async fn non_success_status_surfaces_and_leaves_cache_unmodified() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/media"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let err = fetcher
            .fetch_media_data(&api_url(&server), None)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "HTTP error: 500");
        assert!(fetcher.cache.lookup("https://site/v/1").is_none());
    }

    #[tokio::test]
    async fn non_json_body_is_a_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/media"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>nope</html>"))
            .mount(&server)
            .await;

        let fetcher = fetcher();
        let err = fetcher
            .fetch_media_data(&api_url(&server), None)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)));
        assert!(fetcher.cache.is_empty());
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_transport_failure() {
        let fetcher = fetcher();
        let err = fetcher
            .fetch_media_data("http://127.0.0.1:1/api/media?url=x", None)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn explicit_cache_key_overrides_derivation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"title": "v1"})))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = fetcher();
        fetcher
            .fetch_media_data(&api_url(&server), Some("override"))
            .await
            .unwrap();

        assert!(fetcher.cache.lookup("override").is_some());
        assert!(fetcher.cache.lookup("https://site/v/1").is_none());
    }

    #[test]
    fn media_response_serializes_in_wire_form() {
        let reply = MediaResponse {
            data: json!({"title": "v1"}),
            cache_hit: true,
            cache_age: 1200,
        };
        let wire = serde_json::to_value(&reply).unwrap();
        assert_eq!(
            wire,
            json!({"data": {"title": "v1"}, "cacheHit": true, "cacheAge": 1200})
        );
    }
}
