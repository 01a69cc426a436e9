//! Typed request/response channel in front of the fetch orchestrator.
//!
//! The host runs one [`MediaService`] loop; callers hold a cheap
//! [`ServiceHandle`]. Fetch requests are answered on oneshot reply senders
//! and each one runs in its own task, so requests are not serialized behind
//! each other. Concurrent misses for the same key may both fetch; the last
//! upsert wins.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::error::FetchError;
use crate::fetch::{MediaFetcher, MediaResponse};

const REQUEST_CHANNEL_SIZE: usize = 32;

/// Acknowledgement for a detected video page notification.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VideoAck {
    pub ack: bool,
    pub url: String,
}

/// Requests the service loop understands.
#[derive(Debug)]
pub enum ServiceRequest {
    /// Resolve media metadata for an API URL, consulting the cache first.
    FetchMediaData {
        api_url: String,
        cache_key: Option<String>,
        reply: oneshot::Sender<Result<MediaResponse, FetchError>>,
    },
    /// Fire-and-forget notification that a video page was detected.
    VideoDetected {
        url: String,
        normalized_url: String,
        reply: oneshot::Sender<VideoAck>,
    },
}

/// Cheap cloneable sender side of the service channel.
#[derive(Clone)]
pub struct ServiceHandle {
    tx: mpsc::Sender<ServiceRequest>,
}

impl ServiceHandle {
    pub async fn fetch_media_data(
        &self,
        api_url: impl Into<String>,
        cache_key: Option<String>,
    ) -> Result<MediaResponse, FetchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ServiceRequest::FetchMediaData {
                api_url: api_url.into(),
                cache_key,
                reply,
            })
            .await
            .map_err(|_| FetchError::ServiceClosed("service loop stopped".to_owned()))?;

        rx.await
            .map_err(|_| FetchError::ServiceClosed("reply channel dropped".to_owned()))?
    }

    pub async fn notify_video_detected(
        &self,
        url: impl Into<String>,
        normalized_url: impl Into<String>,
    ) -> Result<VideoAck, FetchError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(ServiceRequest::VideoDetected {
                url: url.into(),
                normalized_url: normalized_url.into(),
                reply,
            })
            .await
            .map_err(|_| FetchError::ServiceClosed("service loop stopped".to_owned()))?;

        rx.await
            .map_err(|_| FetchError::ServiceClosed("reply channel dropped".to_owned()))
    }
}

/// Owns the receive side of the channel and dispatches requests.
pub struct MediaService {
    fetcher: MediaFetcher,
    rx: mpsc::Receiver<ServiceRequest>,
}

impl MediaService {
    pub fn new(fetcher: MediaFetcher) -> (Self, ServiceHandle) {
        let (tx, rx) = mpsc::channel(REQUEST_CHANNEL_SIZE);
        (Self { fetcher, rx }, ServiceHandle { tx })
    }

    /// Run until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(request) = self.rx.recv().await {
            match request {
                ServiceRequest::FetchMediaData {
                    api_url,
                    cache_key,
                    reply,
                } => {
                    let fetcher = self.fetcher.clone();
                    tokio::spawn(async move {
                        let result = fetcher
                            .fetch_media_data(&api_url, cache_key.as_deref())
                            .await;
                        if let Err(e) = &result {
                            warn!(api_url, error = %e, "media metadata request failed");
                        }
                        let _ = reply.send(result);
                    });
                }
                ServiceRequest::VideoDetected {
                    url,
                    normalized_url,
                    reply,
                } => {
                    info!(url = %normalized_url, "video page detected");
                    let _ = reply.send(VideoAck { ack: true, url });
                }
            }
        }
    }

    /// Spawn the loop onto the runtime and return its handle.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
