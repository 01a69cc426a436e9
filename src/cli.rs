use std::path::PathBuf;

use clap::Parser;

/// Resolve downloadable media metadata for a short-form video page.
#[derive(Parser, Debug)]
#[command(name = "clipfetch", version, about)]
pub struct CliArgs {
    /// Video page URL to resolve
    pub url: String,

    /// Metadata API endpoint
    #[arg(long, value_name = "URL")]
    pub api: String,

    /// Access key appended to the API request as `api_key`
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Explicit cache key, overriding derivation from the URL
    #[arg(long, value_name = "KEY")]
    pub cache_key: Option<String>,

    /// Cache snapshot file (defaults to the system temp dir)
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}
