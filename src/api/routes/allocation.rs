//! Allocation Route
//!
//! GET /api/v1/allocation/:index - equal-weight composition of an index

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use super::proxy::{fetch_cached, find_route};
use crate::api::dto::AllocationResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::market::IndexToken;
use crate::portfolio::{equal_weight_allocation, IndexSnapshot};
use crate::pricing::IndexPriceFeed;

pub async fn get_allocation(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> ApiResult<Json<AllocationResponse>> {
    let token: IndexToken = index
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Index '{}'", index)))?;

    let route = find_route(token.price_route()).ok_or_else(|| {
        ApiError::Internal(format!("No price route for {}", token.symbol()))
    })?;

    let feed = IndexPriceFeed::from_value(fetch_cached(&state, route).await?)?;
    let snapshot = IndexSnapshot::from_feed(token, feed);
    let slices = equal_weight_allocation(&snapshot);

    Ok(Json(AllocationResponse {
        token: token.symbol().to_string(),
        label: token.label().to_string(),
        timestamp: snapshot.timestamp,
        token_price: snapshot.token_price,
        slices,
    }))
}
