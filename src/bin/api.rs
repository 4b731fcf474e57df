//! BIT10 API Server
//!
//! Run with: cargo run --bin bit10-api
//!
//! # Configuration
//!
//! Read from `BIT10_CONFIG` if set, otherwise the default locations
//! (`~/.config/bit10/config.toml`, `/etc/bit10/config.toml`,
//! `./config.toml`). Environment variables override file values:
//! - `BIT10_API_HOST`, `BIT10_API_PORT`
//! - `BIT10_UPSTREAM_URL`, `BIT10_CACHE_TTL_SECS`
//! - `BIT10_REFERENCE_URL`
//! - `BIT10_LOG_LEVEL`, `BIT10_LOG_FORMAT`
//! - `RUST_LOG`: Full filter directive (overrides the log level)

use bit10::api::{serve, ApiConfig, AppState};
use bit10::config::Config;
use bit10::logging::init_logging;
use bit10::pricing::HttpUpstream;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match std::env::var("BIT10_CONFIG") {
        Ok(path) => Config::load_with_env(&PathBuf::from(path))?,
        Err(_) => Config::load_default(),
    };
    config.validate()?;

    init_logging(&config.logging)?;

    tracing::info!("Starting BIT10 API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Upstream: {}", config.upstream.base_url);
    tracing::info!("Proxy cache TTL: {}s", config.upstream.cache_ttl_secs);

    let upstream = Arc::new(HttpUpstream::new(Duration::from_millis(
        config.upstream.request_timeout_ms,
    ))?);

    let api_config = ApiConfig::from(&config);
    let state = AppState::new(upstream, api_config.clone());

    tracing::info!("Starting server on {}:{}", api_config.host, api_config.port);
    serve(state, &api_config).await?;

    tracing::info!("BIT10 API server stopped");
    Ok(())
}
