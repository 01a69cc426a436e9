use std::sync::Arc;

use clap::Parser;
use tracing::{debug, error};
use url::Url;

use clipfetch::{
    FetchError, FileStorage, LogOptions, MediaCache, MediaFetcher, MediaService, ServiceConfig,
    SystemClock, logging,
};

mod cli;

use cli::CliArgs;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Initialization error: {0}")]
    Initialization(String),
}

fn main() {
    if let Err(e) = bootstrap() {
        eprintln!("Error: {e}");
        error!(error = ?e, "Application failed");
        std::process::exit(1);
    }
}

#[tokio::main]
async fn bootstrap() -> Result<(), AppError> {
    let args = CliArgs::parse();

    logging::init(&LogOptions::verbose(args.verbose)).map_err(AppError::Initialization)?;

    let mut config = ServiceConfig::default();
    if let Some(path) = args.cache_file {
        config = config.with_cache_file(path);
    }

    let storage = Arc::new(FileStorage::new(config.cache_file_path()));
    debug!(path = %storage.path().display(), "using cache snapshot");

    let cache = MediaCache::new(storage, Arc::new(SystemClock), &config);
    let fetcher = MediaFetcher::new(cache.clone(), &config)?;
    let (service, handle) = MediaService::new(fetcher);
    service.spawn();

    let api_url = build_api_url(&args.api, &args.url, args.api_key.as_deref())?;

    match handle.fetch_media_data(api_url.as_str(), args.cache_key).await {
        Ok(reply) => {
            println!("{}", serde_json::to_string_pretty(&reply).unwrap_or_default());
        }
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
        }
    }

    // The process exits well inside the debounce window, so flush explicitly.
    cache.persist_now().await;

    Ok(())
}

fn build_api_url(api: &str, page_url: &str, api_key: Option<&str>) -> Result<Url, AppError> {
    let mut url = Url::parse(api)?;
    url.query_pairs_mut().append_pair("url", page_url);
    if let Some(key) = api_key {
        url.query_pairs_mut().append_pair("api_key", key);
    }
    Ok(url)
}
