//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (ready to serve traffic)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Kubernetes liveness probe.
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Kubernetes readiness probe. The proxy holds no state that must load
/// first, so a running server is ready; an unreachable upstream shows up as
/// 500s on the proxy routes instead.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.config.upstream_base_url.is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /health
///
/// Full health status with cache details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let cached_routes = state.cache.len().await;

    Json(HealthResponse {
        status: "healthy".to_string(),
        upstream: state.config.upstream_base_url.clone(),
        cached_routes,
        cache_ttl_secs: state.cache.ttl().as_secs(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
