//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ledger::{CanisterIds, DEFAULT_LIQUIDITY_HUB, DEFAULT_PAYMENT_LEDGER, DEFAULT_SWAP};
use crate::market::{DEFAULT_FEE_RATE, DEFAULT_STAKE_HEADROOM, DEFAULT_SWAP_HEADROOM};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub pricing: PricingConfig,

    #[serde(default)]
    pub canisters: CanisterConfig,

    #[serde(default)]
    pub trading: TradingConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Empty allows any origin
    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Pricing/rebalance service the proxy routes read through to
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    pub base_url: String,

    /// Proxy cache lifetime, clamped to 600
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    #[serde(default = "default_upstream_timeout")]
    pub request_timeout_ms: u64,
}

fn default_upstream_url() -> String {
    "https://testnet.bit10.app".to_string()
}

fn default_cache_ttl() -> u64 {
    600
}

fn default_upstream_timeout() -> u64 {
    10_000
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_upstream_url(),
            cache_ttl_secs: default_cache_ttl(),
            request_timeout_ms: default_upstream_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Reference exchange, queried as `{reference_url}/{CUR}-USD/buy`
    #[serde(default = "default_reference_url")]
    pub reference_url: String,

    #[serde(default = "default_index_refresh")]
    pub index_refresh_secs: u64,

    #[serde(default = "default_reference_refresh")]
    pub reference_refresh_secs: u64,
}

fn default_reference_url() -> String {
    "https://api.coinbase.com/v2/prices".to_string()
}

fn default_index_refresh() -> u64 {
    30 * 60
}

fn default_reference_refresh() -> u64 {
    10
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            reference_url: default_reference_url(),
            index_refresh_secs: default_index_refresh(),
            reference_refresh_secs: default_reference_refresh(),
        }
    }
}

/// Canister principals in text form
#[derive(Debug, Clone, Deserialize)]
pub struct CanisterConfig {
    #[serde(default = "default_payment_ledger")]
    pub payment_ledger: String,

    #[serde(default = "default_swap")]
    pub swap: String,

    #[serde(default = "default_liquidity_hub")]
    pub liquidity_hub: String,
}

fn default_payment_ledger() -> String {
    DEFAULT_PAYMENT_LEDGER.to_string()
}

fn default_swap() -> String {
    DEFAULT_SWAP.to_string()
}

fn default_liquidity_hub() -> String {
    DEFAULT_LIQUIDITY_HUB.to_string()
}

impl Default for CanisterConfig {
    fn default() -> Self {
        Self {
            payment_ledger: default_payment_ledger(),
            swap: default_swap(),
            liquidity_hub: default_liquidity_hub(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TradingConfig {
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,

    #[serde(default = "default_swap_headroom")]
    pub swap_headroom: f64,

    #[serde(default = "default_stake_headroom")]
    pub stake_headroom: f64,

    #[serde(default = "default_approval_expiry")]
    pub approval_expiry_secs: u64,
}

fn default_fee_rate() -> f64 {
    DEFAULT_FEE_RATE
}

fn default_swap_headroom() -> f64 {
    DEFAULT_SWAP_HEADROOM
}

fn default_stake_headroom() -> f64 {
    DEFAULT_STAKE_HEADROOM
}

fn default_approval_expiry() -> u64 {
    300
}

impl Default for TradingConfig {
    fn default() -> Self {
        Self {
            fee_rate: default_fee_rate(),
            swap_headroom: default_swap_headroom(),
            stake_headroom: default_stake_headroom(),
            approval_expiry_secs: default_approval_expiry(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("bit10").join("config.toml")),
            Some(PathBuf::from("/etc/bit10/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // API overrides
        if let Some(host) = lookup("BIT10_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("BIT10_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Upstream overrides
        if let Some(url) = lookup("BIT10_UPSTREAM_URL") {
            self.upstream.base_url = url;
        }
        if let Some(ttl) = lookup("BIT10_CACHE_TTL_SECS") {
            if let Ok(t) = ttl.parse() {
                self.upstream.cache_ttl_secs = t;
            }
        }

        if let Some(url) = lookup("BIT10_REFERENCE_URL") {
            self.pricing.reference_url = url;
        }

        // Logging overrides
        if let Some(level) = lookup("BIT10_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("BIT10_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Reject settings the trading flow cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let trading = &self.trading;

        if !(trading.fee_rate.is_finite() && (0.0..1.0).contains(&trading.fee_rate)) {
            return Err(ConfigError::Invalid(format!(
                "trading.fee_rate must be in [0, 1), got {}",
                trading.fee_rate
            )));
        }

        for (name, value) in [
            ("swap_headroom", trading.swap_headroom),
            ("stake_headroom", trading.stake_headroom),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "trading.{} must be positive, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("pricing.index_refresh_secs", self.pricing.index_refresh_secs),
            ("pricing.reference_refresh_secs", self.pricing.reference_refresh_secs),
            ("api.request_timeout_secs", self.api.request_timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::Invalid(format!("{} must be at least 1", name)));
            }
        }

        if self.upstream.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "upstream.base_url must not be empty".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::Invalid(format!(
                "logging.format must be \"pretty\" or \"json\", got {:?}",
                self.logging.format
            )));
        }

        self.canister_ids()?;
        Ok(())
    }

    pub fn canister_ids(&self) -> Result<CanisterIds, ConfigError> {
        CanisterIds::parse(
            &self.canisters.payment_ledger,
            &self.canisters.swap,
            &self.canisters.liquidity_hub,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# BIT10 Configuration
#
# Environment variables override these settings:
# - BIT10_API_HOST
# - BIT10_API_PORT
# - BIT10_UPSTREAM_URL
# - BIT10_CACHE_TTL_SECS
# - BIT10_REFERENCE_URL
# - BIT10_LOG_LEVEL
# - BIT10_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

# Allowed CORS origins (empty allows any)
cors_origins = []

# Request timeout in seconds
request_timeout_secs = 30

[upstream]
# Pricing and rebalance service
base_url = "https://testnet.bit10.app"

# How long proxied responses are cached (seconds, at most 600)
cache_ttl_secs = 600

# Upstream request timeout (ms)
request_timeout_ms = 10000

[pricing]
# Reference exchange for payment token prices
reference_url = "https://api.coinbase.com/v2/prices"

# Index price refresh interval (seconds)
index_refresh_secs = 1800

# Reference price refresh interval (seconds)
reference_refresh_secs = 10

[canisters]
payment_ledger = "eegan-kqaaa-aaaap-qhmgq-cai"
swap = "6phs7-6yaaa-aaaap-qpvoq-cai"
liquidity_hub = "jskxc-iiaaa-aaaap-qpwrq-cai"

[trading]
# Platform fee added to the displayed payment amount
fee_rate = 0.03

# Approval multipliers
swap_headroom = 3.0
stake_headroom = 1.5

# Approval lifetime (seconds)
approval_expiry_secs = 300

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/bit10/bit10.log"
"#
    .to_string()
}
