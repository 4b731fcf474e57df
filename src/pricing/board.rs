//! Price board
//!
//! Last known price per index token and per payment token, refreshed on
//! fixed intervals (index feeds every 30 minutes, reference prices every 10
//! seconds). Quotes are built from whatever the board currently holds.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use super::client::PriceClient;
use crate::market::{IndexToken, PaymentToken, Quantity, Quote};

/// Shortest refresh interval the loops will run at
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Refresh cadence
#[derive(Debug, Clone)]
pub struct PriceBoardConfig {
    pub index_refresh: Duration,
    pub reference_refresh: Duration,
    pub fee_rate: f64,
}

impl Default for PriceBoardConfig {
    fn default() -> Self {
        Self {
            index_refresh: Duration::from_secs(30 * 60),
            reference_refresh: Duration::from_secs(10),
            fee_rate: crate::market::DEFAULT_FEE_RATE,
        }
    }
}

impl PriceBoardConfig {
    /// Index refresh period, never below [`MIN_REFRESH_INTERVAL`]
    pub fn index_period(&self) -> Duration {
        self.index_refresh.max(MIN_REFRESH_INTERVAL)
    }

    /// Reference refresh period, never below [`MIN_REFRESH_INTERVAL`]
    pub fn reference_period(&self) -> Duration {
        self.reference_refresh.max(MIN_REFRESH_INTERVAL)
    }
}

/// What the board knows about one price
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum PriceState {
    Loading,
    Ready(f64),
    /// Fetch failed and no earlier value exists
    Unavailable(String),
}

impl PriceState {
    pub fn value(&self) -> Option<f64> {
        match self {
            PriceState::Ready(price) => Some(*price),
            _ => None,
        }
    }
}

pub struct PriceBoard {
    client: Arc<PriceClient>,
    config: PriceBoardConfig,
    index: RwLock<HashMap<IndexToken, PriceState>>,
    reference: RwLock<HashMap<PaymentToken, PriceState>>,
}

impl PriceBoard {
    pub fn new(client: Arc<PriceClient>, config: PriceBoardConfig) -> Self {
        Self {
            client,
            config,
            index: RwLock::new(HashMap::new()),
            reference: RwLock::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &Arc<PriceClient> {
        &self.client
    }

    pub async fn index_price(&self, token: IndexToken) -> PriceState {
        self.index
            .read()
            .await
            .get(&token)
            .cloned()
            .unwrap_or(PriceState::Loading)
    }

    pub async fn reference_price(&self, token: PaymentToken) -> PriceState {
        self.reference
            .read()
            .await
            .get(&token)
            .cloned()
            .unwrap_or(PriceState::Loading)
    }

    /// Fetch one index price. On failure the previous value is kept.
    pub async fn refresh_index(&self, token: IndexToken) -> PriceState {
        let fetched = self.client.index_price(token).await;
        let mut index = self.index.write().await;

        let next = match (fetched, index.get(&token)) {
            (Ok(price), _) => PriceState::Ready(price),
            (Err(e), Some(PriceState::Ready(previous))) => {
                tracing::warn!(token = %token, error = %e, "Index price refresh failed, keeping last value");
                PriceState::Ready(*previous)
            }
            (Err(e), _) => {
                tracing::warn!(token = %token, error = %e, "Index price unavailable");
                PriceState::Unavailable(e.to_string())
            }
        };

        index.insert(token, next.clone());
        next
    }

    /// Fetch one reference price. On failure the previous value is kept.
    pub async fn refresh_reference(&self, token: PaymentToken) -> PriceState {
        let fetched = self.client.reference_price(token).await;
        let mut reference = self.reference.write().await;

        let next = match (fetched, reference.get(&token)) {
            (Ok(price), _) => PriceState::Ready(price),
            (Err(e), Some(PriceState::Ready(previous))) => {
                tracing::warn!(token = %token, error = %e, "Reference price refresh failed, keeping last value");
                PriceState::Ready(*previous)
            }
            (Err(e), _) => {
                tracing::warn!(token = %token, error = %e, "Reference price unavailable");
                PriceState::Unavailable(e.to_string())
            }
        };

        reference.insert(token, next.clone());
        next
    }

    pub async fn refresh_indexes(&self) {
        for token in IndexToken::ALL {
            self.refresh_index(token).await;
        }
    }

    pub async fn refresh_references(&self) {
        for token in PaymentToken::ALL {
            self.refresh_reference(token).await;
        }
    }

    pub async fn refresh_all(&self) {
        self.refresh_indexes().await;
        self.refresh_references().await;
    }

    /// Quote from the current board; missing prices make a not-ready quote
    pub async fn quote(
        &self,
        payment: PaymentToken,
        target: IndexToken,
        quantity: Quantity,
    ) -> Quote {
        let target_price = self.index_price(target).await.value();
        let payment_price = self.reference_price(payment).await.value();

        Quote::new(payment, target, quantity, target_price, payment_price)
            .with_fee_rate(self.config.fee_rate)
    }

    /// Spawn the two refresh loops. Each loop fetches immediately and then
    /// on its interval.
    pub fn start_background_refresh(self: Arc<Self>) {
        tracing::info!(
            index_refresh_secs = self.config.index_refresh.as_secs(),
            reference_refresh_secs = self.config.reference_refresh.as_secs(),
            "Starting background price refresh"
        );

        let board = Arc::clone(&self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(board.config.index_period());
            loop {
                ticker.tick().await;
                tracing::debug!("Refreshing index prices");
                board.refresh_indexes().await;
            }
        });

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.config.reference_period());
            loop {
                ticker.tick().await;
                self.refresh_references().await;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceClientConfig;
    use crate::testing::FakeUpstream;
    use serde_json::json;

    const DEFI_URL: &str = "http://prices.test/bit10-defi-current-price";
    const BTC_URL: &str = "http://exchange.test/BTC-USD/buy";

    fn board(upstream: Arc<FakeUpstream>) -> PriceBoard {
        let client = PriceClient::new(
            upstream,
            PriceClientConfig {
                upstream_base_url: "http://prices.test".to_string(),
                reference_url: "http://exchange.test".to_string(),
            },
        );
        PriceBoard::new(Arc::new(client), PriceBoardConfig::default())
    }

    #[test]
    fn test_zero_intervals_are_floored() {
        let config = PriceBoardConfig {
            index_refresh: Duration::ZERO,
            reference_refresh: Duration::ZERO,
            ..PriceBoardConfig::default()
        };
        assert_eq!(config.index_period(), MIN_REFRESH_INTERVAL);
        assert_eq!(config.reference_period(), MIN_REFRESH_INTERVAL);
        assert_eq!(
            PriceBoardConfig::default().reference_period(),
            Duration::from_secs(10)
        );
    }

    #[tokio::test]
    async fn test_quote_disabled_until_both_prices_resolve() {
        let upstream = Arc::new(FakeUpstream::new());
        let board = board(upstream.clone());
        let quantity = Quantity::default();

        let loading = board
            .quote(PaymentToken::Bit10Btc, IndexToken::Defi, quantity)
            .await;
        assert!(!loading.is_ready());
        assert!(!loading.breakdown().submit_enabled);

        upstream.respond(DEFI_URL, json!({"tokenPrice": 100.0, "data": []}));
        board.refresh_index(IndexToken::Defi).await;
        let half = board
            .quote(PaymentToken::Bit10Btc, IndexToken::Defi, quantity)
            .await;
        assert!(!half.is_ready());

        upstream.respond(BTC_URL, json!({"data": {"amount": "50000"}}));
        board.refresh_reference(PaymentToken::Bit10Btc).await;
        let ready = board
            .quote(PaymentToken::Bit10Btc, IndexToken::Defi, quantity)
            .await;
        assert!(ready.is_ready());
        assert_eq!(ready.breakdown().payment_amount, "0.002000");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_value() {
        let upstream = Arc::new(FakeUpstream::new());
        let board = board(upstream.clone());

        upstream.respond(BTC_URL, json!({"data": {"amount": "61000"}}));
        assert_eq!(
            board.refresh_reference(PaymentToken::Bit10Btc).await,
            PriceState::Ready(61_000.0)
        );

        upstream.fail(BTC_URL);
        assert_eq!(
            board.refresh_reference(PaymentToken::Bit10Btc).await,
            PriceState::Ready(61_000.0)
        );
    }

    #[tokio::test]
    async fn test_failed_first_fetch_is_unavailable() {
        let upstream = Arc::new(FakeUpstream::new());
        let board = board(upstream);

        let state = board.refresh_index(IndexToken::Brc20).await;
        assert!(matches!(state, PriceState::Unavailable(_)));
        assert_eq!(state.value(), None);
        assert_eq!(board.index_price(IndexToken::Brc20).await, state);
    }

    #[tokio::test]
    async fn test_zero_token_price_is_not_ready() {
        let upstream = Arc::new(FakeUpstream::new());
        let board = board(upstream.clone());

        upstream.respond(DEFI_URL, json!({"data": []}));
        upstream.respond(BTC_URL, json!({"data": {"amount": "50000"}}));
        board.refresh_all().await;

        let quote = board
            .quote(PaymentToken::Bit10Btc, IndexToken::Defi, Quantity::default())
            .await;
        assert_eq!(quote.unit_price_usd, 0.0);
        assert!(!quote.is_ready());
    }
}
