//! Quote Route
//!
//! GET /api/v1/quote?token=<index>&quantity=<1-5>[&payment=<token>]
//!
//! Prices that cannot be fetched are treated as still loading: the response
//! is a zeroed quote with `submit_enabled = false`, not an error.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use super::proxy::{fetch_cached, find_route};
use crate::api::dto::{QuoteParams, QuoteResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::market::{IndexToken, PaymentToken, Quantity, Quote};
use crate::pricing::{parse_reference_price, IndexPriceFeed, PriceError};

pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QuoteParams>,
) -> ApiResult<Json<QuoteResponse>> {
    let token = params
        .token
        .parse::<IndexToken>()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let quantity = match params.quantity.as_deref() {
        Some(raw) => raw
            .parse::<Quantity>()
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        None => Quantity::default(),
    };

    let payment = match params.payment.as_deref() {
        Some(raw) => raw
            .parse::<PaymentToken>()
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        None => PaymentToken::default(),
    };

    let target_price = index_price(&state, token).await?;
    let payment_price = reference_price(&state, payment).await;

    let quote = Quote::new(payment, token, quantity, target_price, payment_price)
        .with_fee_rate(state.config.fee_rate);

    tracing::debug!(
        token = %token,
        quantity = quantity.get(),
        ready = quote.is_ready(),
        "Computed quote"
    );

    Ok(Json(QuoteResponse {
        target_price_ready: target_price.map_or(false, |p| p > 0.0),
        payment_price_ready: payment_price.map_or(false, |p| p > 0.0),
        quote: quote.breakdown(),
    }))
}

/// Index price from the cached current-price feed
async fn index_price(state: &AppState, token: IndexToken) -> ApiResult<Option<f64>> {
    let route = find_route(token.price_route()).ok_or_else(|| {
        ApiError::Internal(format!("No price route for {}", token.symbol()))
    })?;

    let body = match fetch_cached(state, route).await {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(token = %token, error = %e, "Index price unavailable for quote");
            return Ok(None);
        }
    };

    match IndexPriceFeed::from_value(body) {
        Ok(feed) => Ok(Some(feed.price())),
        Err(e) => {
            tracing::warn!(token = %token, error = %e, "Index price feed unreadable");
            Ok(None)
        }
    }
}

/// Reference price, reused across requests for the reference TTL
async fn reference_price(state: &AppState, payment: PaymentToken) -> Option<f64> {
    let url = state.prices.reference_price_url(payment);

    let price = state
        .reference_cache
        .get_or_fetch(&url, || state.upstream.get_json(&url))
        .await
        .map_err(PriceError::from)
        .and_then(parse_reference_price);

    match price {
        Ok(price) => Some(price),
        Err(e) => {
            tracing::warn!(token = %payment, error = %e, "Reference price unavailable for quote");
            None
        }
    }
}
