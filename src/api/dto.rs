//! Data Transfer Objects
//!
//! Request and response types for the computed endpoints. Proxy routes pass
//! the upstream JSON through untouched.

use serde::{Deserialize, Serialize};

use crate::market::QuoteBreakdown;
use crate::portfolio::AllocationSlice;

// ============================================
// QUOTE DTOs
// ============================================

/// Quote query parameters
#[derive(Debug, Deserialize)]
pub struct QuoteParams {
    /// Index token: symbol (`BIT10.DEFI`), ticker (`defi`) or label
    pub token: String,
    /// Number of index tokens, 1-5 (defaults to 1)
    #[serde(default)]
    pub quantity: Option<String>,
    /// Payment token (defaults to BIT10.BTC)
    #[serde(default)]
    pub payment: Option<String>,
}

/// Quote response
#[derive(Debug, Serialize, Deserialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub quote: QuoteBreakdown,
    /// Whether each price has resolved
    pub target_price_ready: bool,
    pub payment_price_ready: bool,
}

// ============================================
// ALLOCATION DTOs
// ============================================

/// Equal-weight composition of an index
#[derive(Debug, Serialize, Deserialize)]
pub struct AllocationResponse {
    pub token: String,
    pub label: String,
    pub timestamp: Option<String>,
    pub token_price: f64,
    pub slices: Vec<AllocationSlice>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status
    pub status: String,
    /// Upstream base URL
    pub upstream: String,
    /// Proxied routes currently cached
    pub cached_routes: usize,
    pub cache_ttl_secs: u64,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}
