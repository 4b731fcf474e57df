//! Price Oracle Client
//!
//! Fetches the USD price of an index token from the pricing service and of
//! a payment token from the reference exchange.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use super::upstream::{join_url, Upstream, UpstreamError};
use crate::market::{IndexToken, PaymentToken};

/// Where prices come from
#[derive(Debug, Clone)]
pub struct PriceClientConfig {
    /// Pricing service base URL (index feeds)
    pub upstream_base_url: String,
    /// Reference exchange base URL, queried as `{url}/{CUR}-USD/buy`
    pub reference_url: String,
}

impl Default for PriceClientConfig {
    fn default() -> Self {
        Self {
            upstream_base_url: "https://testnet.bit10.app".to_string(),
            reference_url: "https://api.coinbase.com/v2/prices".to_string(),
        }
    }
}

/// One constituent of an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constituent {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain: Option<String>,
}

/// Payload of a `bit10-*-current-price` feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexPriceFeed {
    /// Upstream spells it this way
    #[serde(default)]
    pub timestmpz: Option<String>,
    #[serde(default, rename = "tokenPrice")]
    pub token_price: Option<f64>,
    #[serde(default)]
    pub data: Vec<Constituent>,
}

impl IndexPriceFeed {
    pub fn from_value(value: serde_json::Value) -> Result<Self, PriceError> {
        serde_json::from_value(value).map_err(|e| PriceError::InvalidPayload(e.to_string()))
    }

    /// Index token price; absent reads as zero
    pub fn price(&self) -> f64 {
        self.token_price.unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct ReferenceResponse {
    data: ReferenceData,
}

#[derive(Debug, Deserialize)]
struct ReferenceData {
    amount: String,
}

/// Parse a reference exchange body (`{"data": {"amount": "63012.45", ...}}`)
pub fn parse_reference_price(value: serde_json::Value) -> Result<f64, PriceError> {
    let body: ReferenceResponse =
        serde_json::from_value(value).map_err(|e| PriceError::InvalidPayload(e.to_string()))?;

    let price: f64 = body.data.amount.trim().parse().map_err(|_| {
        PriceError::InvalidPayload(format!("amount is not a number: {:?}", body.data.amount))
    })?;

    if !price.is_finite() || price < 0.0 {
        return Err(PriceError::InvalidPayload(format!(
            "amount out of range: {}",
            price
        )));
    }

    Ok(price)
}

pub struct PriceClient {
    upstream: Arc<dyn Upstream>,
    config: PriceClientConfig,
}

impl PriceClient {
    pub fn new(upstream: Arc<dyn Upstream>, config: PriceClientConfig) -> Self {
        Self { upstream, config }
    }

    pub fn config(&self) -> &PriceClientConfig {
        &self.config
    }

    /// Full current-price feed of an index
    pub async fn index_feed(&self, token: IndexToken) -> Result<IndexPriceFeed, PriceError> {
        let url = join_url(&self.config.upstream_base_url, token.price_route());
        let value = self.upstream.get_json(&url).await?;
        IndexPriceFeed::from_value(value)
    }

    /// USD price of one index token
    pub async fn index_price(&self, token: IndexToken) -> Result<f64, PriceError> {
        let feed = self.index_feed(token).await?;
        tracing::debug!(token = %token, price = feed.price(), "Fetched index price");
        Ok(feed.price())
    }

    /// Reference exchange URL pricing `token` in USD
    pub fn reference_price_url(&self, token: PaymentToken) -> String {
        let path = format!("{}-USD/buy", token.reference_currency());
        join_url(&self.config.reference_url, &path)
    }

    /// USD price of one payment token, from its reference currency
    pub async fn reference_price(&self, token: PaymentToken) -> Result<f64, PriceError> {
        let url = self.reference_price_url(token);
        let price = parse_reference_price(self.upstream.get_json(&url).await?)?;

        tracing::debug!(token = %token, price, "Fetched reference price");
        Ok(price)
    }
}

#[derive(Error, Debug)]
pub enum PriceError {
    #[error("Price source unreachable: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Unexpected price payload: {0}")]
    InvalidPayload(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeUpstream;
    use serde_json::json;

    fn client(upstream: Arc<FakeUpstream>) -> PriceClient {
        PriceClient::new(
            upstream,
            PriceClientConfig {
                upstream_base_url: "http://prices.test".to_string(),
                reference_url: "http://exchange.test/v2/prices".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_index_price() {
        let upstream = Arc::new(FakeUpstream::new());
        upstream.respond(
            "http://prices.test/bit10-defi-current-price",
            json!({
                "timestmpz": "2024-11-02T10:00:00Z",
                "tokenPrice": 123.45,
                "data": [{"id": 1, "name": "Uniswap", "symbol": "UNI", "price": 7.1}]
            }),
        );

        let client = client(upstream.clone());
        assert_eq!(client.index_price(IndexToken::Defi).await.unwrap(), 123.45);

        let feed = client.index_feed(IndexToken::Defi).await.unwrap();
        assert_eq!(feed.data.len(), 1);
        assert_eq!(feed.data[0].symbol, "UNI");
    }

    #[tokio::test]
    async fn test_missing_token_price_reads_as_zero() {
        let upstream = Arc::new(FakeUpstream::new());
        upstream.respond("http://prices.test/bit10-meme-current-price", json!({"data": []}));

        let price = client(upstream).index_price(IndexToken::Meme).await.unwrap();
        assert_eq!(price, 0.0);
    }

    #[tokio::test]
    async fn test_reference_price() {
        let upstream = Arc::new(FakeUpstream::new());
        upstream.respond(
            "http://exchange.test/v2/prices/BTC-USD/buy",
            json!({"data": {"amount": "50000.00", "base": "BTC", "currency": "USD"}}),
        );

        let price = client(upstream.clone())
            .reference_price(PaymentToken::Bit10Btc)
            .await
            .unwrap();
        assert_eq!(price, 50_000.0);
        assert_eq!(
            upstream.requests(),
            vec!["http://exchange.test/v2/prices/BTC-USD/buy".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unreachable_source() {
        let upstream = Arc::new(FakeUpstream::new());
        let result = client(upstream).index_price(IndexToken::Top).await;
        assert!(matches!(result, Err(PriceError::Upstream(_))));
    }

    #[test]
    fn test_reference_payload_errors() {
        assert!(parse_reference_price(json!({"data": {"amount": "abc"}})).is_err());
        assert!(parse_reference_price(json!({"data": {}})).is_err());
        assert!(parse_reference_price(json!({"amount": "1"})).is_err());
        assert_eq!(
            parse_reference_price(json!({"data": {"amount": " 61000.5 "}})).unwrap(),
            61_000.5
        );
    }

    #[test]
    fn test_brc20_constituent_fields() {
        let feed = IndexPriceFeed::from_value(json!({
            "tokenPrice": 2.5,
            "data": [{"id": 3, "name": "ORDI", "symbol": "ORDI", "price": 40.0, "tokenAddress": "abc"}]
        }))
        .unwrap();

        assert_eq!(feed.data[0].token_address.as_deref(), Some("abc"));
        assert!(feed.timestmpz.is_none());
    }
}
