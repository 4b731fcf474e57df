//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::pricing::{PriceClient, PriceClientConfig, Upstream};

use super::cache::ResponseCache;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Transport to the pricing service and reference exchange
    pub upstream: Arc<dyn Upstream>,
    /// Proxied responses
    pub cache: Arc<ResponseCache>,
    /// Reference exchange responses, keyed by URL
    pub reference_cache: Arc<ResponseCache>,
    /// Reference price lookups for quotes
    pub prices: Arc<PriceClient>,
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(upstream: Arc<dyn Upstream>, config: ApiConfig) -> Self {
        let prices = PriceClient::new(
            Arc::clone(&upstream),
            PriceClientConfig {
                upstream_base_url: config.upstream_base_url.clone(),
                reference_url: config.reference_url.clone(),
            },
        );

        Self {
            upstream,
            cache: Arc::new(ResponseCache::new(config.cache_ttl)),
            reference_cache: Arc::new(ResponseCache::new(config.reference_ttl)),
            prices: Arc::new(prices),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    pub upstream_base_url: String,
    pub reference_url: String,
    pub cache_ttl: Duration,
    /// How long a reference price is reused across quote requests
    pub reference_ttl: Duration,
    /// Per-request deadline; slower requests answer 408
    pub request_timeout: Duration,
    pub fee_rate: f64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            cors_origins: Vec::new(),
            upstream_base_url: "https://testnet.bit10.app".to_string(),
            reference_url: "https://api.coinbase.com/v2/prices".to_string(),
            cache_ttl: Duration::from_secs(600),
            reference_ttl: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            fee_rate: crate::market::DEFAULT_FEE_RATE,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&Config> for ApiConfig {
    fn from(config: &Config) -> Self {
        Self {
            host: config.api.host.clone(),
            port: config.api.port,
            cors_origins: config.api.cors_origins.clone(),
            upstream_base_url: config.upstream.base_url.clone(),
            reference_url: config.pricing.reference_url.clone(),
            cache_ttl: Duration::from_secs(config.upstream.cache_ttl_secs),
            reference_ttl: Duration::from_secs(config.pricing.reference_refresh_secs),
            request_timeout: Duration::from_secs(config.api.request_timeout_secs),
            fee_rate: config.trading.fee_rate,
        }
    }
}
