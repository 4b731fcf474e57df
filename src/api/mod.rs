//! BIT10 REST API
//!
//! HTTP layer built with Axum: cached read-through proxies for the pricing
//! service plus endpoints computed from the same data.
//!
//! # Endpoints
//!
//! ## Proxy (cached, 500 `{"error": "Error fetching data"}` on failure)
//! - `GET /api/bit10-historic-data-defi-60`
//! - `GET /api/bit10-latest-rebalance-top`
//! - `GET /api/bit10-{defi,brc20,top,meme}-current-price`
//!
//! ## Computed
//! - `GET /api/v1/quote?token=&quantity=&payment=` - Swap quote breakdown
//! - `GET /api/v1/allocation/:index` - Equal-weight index composition
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use bit10::api::{serve, ApiConfig, AppState};
//! use bit10::pricing::HttpUpstream;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let upstream = Arc::new(HttpUpstream::new(Duration::from_secs(10))?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(upstream, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use cache::{ResponseCache, MAX_CACHE_TTL};
pub use error::{ApiError, ApiResult, UPSTREAM_ERROR_MESSAGE};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::State,
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/quote", get(routes::quote::get_quote))
        .route("/allocation/:index", get(routes::allocation::get_allocation));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let mut proxy_routes = Router::new();
    for route in routes::proxy::PROXY_ROUTES {
        proxy_routes = proxy_routes.route(
            &format!("/api/{}", route.path),
            get(move |State(state): State<Arc<AppState>>| routes::proxy::proxy(state, route)),
        );
    }

    let cors = cors_layer(&state.config.cors_origins);
    let timeout = TimeoutLayer::new(state.config.request_timeout);

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .merge(proxy_routes)
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("BIT10 API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("BIT10 API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUpstream;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::json;
    use std::time::Duration;
    use tower::util::ServiceExt;

    const UPSTREAM: &str = "http://upstream.test";
    const REFERENCE: &str = "http://exchange.test";

    fn create_test_app() -> (Router, Arc<FakeUpstream>) {
        let upstream = Arc::new(FakeUpstream::new());
        let config = ApiConfig {
            upstream_base_url: UPSTREAM.to_string(),
            reference_url: REFERENCE.to_string(),
            ..ApiConfig::default()
        };

        let state = AppState::new(upstream.clone(), config);
        (build_router(state), upstream)
    }

    async fn get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn serve_prices(upstream: &FakeUpstream) {
        upstream.respond(
            "http://upstream.test/bit10-defi-current-price",
            json!({
                "timestmpz": "2024-11-02T10:00:00Z",
                "tokenPrice": 100.0,
                "data": [
                    {"id": 1, "name": "Uniswap", "symbol": "UNI", "price": 7.0},
                    {"id": 2, "name": "Aave", "symbol": "AAVE", "price": 150.0},
                    {"id": 3, "name": "Maker", "symbol": "MKR", "price": 1400.0},
                    {"id": 4, "name": "Lido", "symbol": "LDO", "price": 1.5}
                ]
            }),
        );
        upstream.respond(
            "http://exchange.test/BTC-USD/buy",
            json!({"data": {"amount": "50000.00", "base": "BTC", "currency": "USD"}}),
        );
    }

    #[tokio::test]
    async fn test_health_live() {
        let (app, _upstream) = create_test_app();
        assert_eq!(get(&app, "/health/live").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let (app, _upstream) = create_test_app();
        assert_eq!(get(&app, "/health/ready").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let (app, upstream) = create_test_app();
        serve_prices(&upstream);
        get(&app, "/api/bit10-defi-current-price").await;

        let response = get(&app, "/health").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["cached_routes"], 1);
        assert_eq!(body["cache_ttl_secs"], 600);
    }

    #[tokio::test]
    async fn test_proxy_passes_body_through_and_caches() {
        let (app, upstream) = create_test_app();
        upstream.respond(
            "http://upstream.test/test-bit10-latest-rebalance-top",
            json!({"rebalances": [{"date": "2024-10-01"}]}),
        );

        for _ in 0..2 {
            let response = get(&app, "/api/bit10-latest-rebalance-top").await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(
                body_json(response).await,
                json!({"rebalances": [{"date": "2024-10-01"}]})
            );
        }

        assert_eq!(
            upstream.requests(),
            vec!["http://upstream.test/test-bit10-latest-rebalance-top".to_string()]
        );
    }

    #[tokio::test]
    async fn test_proxy_failure_body() {
        let (app, _upstream) = create_test_app();

        let response = get(&app, "/api/bit10-historic-data-defi-60").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Error fetching data"})
        );
    }

    #[tokio::test]
    async fn test_quote_with_live_prices() {
        let (app, upstream) = create_test_app();
        serve_prices(&upstream);

        let response = get(&app, "/api/v1/quote?token=defi&quantity=1").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["payment_amount"], "0.002000");
        assert_eq!(body["total_payment"], "0.002060");
        assert_eq!(body["usd_total"], "103.0000");
        assert_eq!(body["target_token"], "Test BIT10.DEFI");
        assert_eq!(body["submit_enabled"], true);
    }

    #[tokio::test]
    async fn test_quote_reuses_reference_price() {
        let (app, upstream) = create_test_app();
        serve_prices(&upstream);

        for quantity in 1..=3 {
            let uri = format!("/api/v1/quote?token=defi&quantity={}", quantity);
            let response = get(&app, &uri).await;
            assert_eq!(body_json(response).await["submit_enabled"], true);
        }

        let reference_fetches = upstream
            .requests()
            .iter()
            .filter(|url| url.as_str() == "http://exchange.test/BTC-USD/buy")
            .count();
        assert_eq!(reference_fetches, 1);
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let upstream = Arc::new(FakeUpstream::new());
        let config = ApiConfig {
            upstream_base_url: UPSTREAM.to_string(),
            reference_url: REFERENCE.to_string(),
            request_timeout: Duration::from_millis(50),
            ..ApiConfig::default()
        };
        let app = build_router(AppState::new(upstream.clone(), config));
        serve_prices(&upstream);
        upstream.stall(Duration::from_secs(5));

        let response = get(&app, "/api/bit10-defi-current-price").await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        assert_eq!(get(&app, "/health/live").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_quote_without_prices_is_disabled() {
        let (app, _upstream) = create_test_app();

        let response = get(&app, "/api/v1/quote?token=BIT10.TOP").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["submit_enabled"], false);
        assert_eq!(body["total_payment"], "0");
        assert_eq!(body["target_price_ready"], false);
        assert_eq!(body["payment_price_ready"], false);
    }

    #[tokio::test]
    async fn test_quote_validation() {
        let (app, _upstream) = create_test_app();

        let response = get(&app, "/api/v1/quote?token=defi&quantity=6").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = get(&app, "/api/v1/quote?token=doge").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_allocation() {
        let (app, upstream) = create_test_app();
        serve_prices(&upstream);

        let response = get(&app, "/api/v1/allocation/defi").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let slices = body["slices"].as_array().unwrap();
        assert_eq!(slices.len(), 4);
        assert_eq!(slices[0]["weight_percent"], 25.0);
        assert_eq!(body["token_price"], 100.0);
    }

    #[tokio::test]
    async fn test_allocation_unknown_index() {
        let (app, _upstream) = create_test_app();

        let response = get(&app, "/api/v1/allocation/doge").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_allocation_upstream_failure() {
        let (app, _upstream) = create_test_app();

        let response = get(&app, "/api/v1/allocation/meme").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"error": "Error fetching data"})
        );
    }
}
