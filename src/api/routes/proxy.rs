//! Proxy Routes
//!
//! Read-through GETs to the pricing service, cached per route:
//!
//! - GET /api/bit10-historic-data-defi-60
//! - GET /api/bit10-latest-rebalance-top
//! - GET /api/bit10-{defi,brc20,top,meme}-current-price
//!
//! Any upstream failure answers 500 `{"error": "Error fetching data"}`.

use axum::Json;
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::pricing::{join_url, UpstreamError};

/// A public route and the upstream path it reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProxyRoute {
    pub path: &'static str,
    pub upstream: &'static str,
}

pub const PROXY_ROUTES: &[ProxyRoute] = &[
    ProxyRoute {
        path: "bit10-historic-data-defi-60",
        upstream: "bit10-historic-data-defi-60",
    },
    ProxyRoute {
        path: "bit10-latest-rebalance-top",
        upstream: "test-bit10-latest-rebalance-top",
    },
    ProxyRoute {
        path: "bit10-defi-current-price",
        upstream: "bit10-defi-current-price",
    },
    ProxyRoute {
        path: "bit10-brc20-current-price",
        upstream: "bit10-brc20-current-price",
    },
    ProxyRoute {
        path: "bit10-top-current-price",
        upstream: "bit10-top-current-price",
    },
    ProxyRoute {
        path: "bit10-meme-current-price",
        upstream: "bit10-meme-current-price",
    },
];

/// Route entry for a public path
pub fn find_route(path: &str) -> Option<&'static ProxyRoute> {
    PROXY_ROUTES.iter().find(|r| r.path == path)
}

/// Upstream body for `route`, served from cache when fresh
pub async fn fetch_cached(
    state: &AppState,
    route: &ProxyRoute,
) -> Result<serde_json::Value, UpstreamError> {
    let url = join_url(&state.config.upstream_base_url, route.upstream);

    state
        .cache
        .get_or_fetch(route.path, || async {
            tracing::debug!(route = %route.path, url = %url, "Fetching upstream");
            state.upstream.get_json(&url).await
        })
        .await
}

/// GET /api/<route>
pub async fn proxy(state: Arc<AppState>, route: &'static ProxyRoute) -> ApiResult<Json<serde_json::Value>> {
    let body = fetch_cached(&state, route).await?;
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table() {
        assert_eq!(PROXY_ROUTES.len(), 6);
        assert_eq!(
            find_route("bit10-latest-rebalance-top").unwrap().upstream,
            "test-bit10-latest-rebalance-top"
        );
        assert!(find_route("bit10-unknown").is_none());

        for token in crate::market::IndexToken::ALL {
            assert!(find_route(token.price_route()).is_some());
        }
    }
}
