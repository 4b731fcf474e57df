//! # BIT10
//!
//! Core of the BIT10 crypto index-fund dashboard: price feeds, swap and stake
//! quotes, wallet sessions, and the approve-then-transfer flow against the
//! exchange canisters.
//!
//! ## Modules
//!
//! - [`market`]: Tokens, quantities, swap quotes and stake requests
//! - [`pricing`]: Index and reference price feeds
//! - [`wallet`]: ICP and Solana wallet providers behind one bridge
//! - [`ledger`]: Candid shapes of the canister calls
//! - [`orchestrator`]: Approval-and-transfer state machine
//! - [`portfolio`]: Allocation and balance read model
//! - [`api`]: Cached proxy and quote endpoints with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bit10::market::{IndexToken, PaymentToken, Quantity};
//! use bit10::pricing::{HttpUpstream, PriceBoard, PriceBoardConfig, PriceClient, PriceClientConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let upstream = Arc::new(HttpUpstream::new(Duration::from_secs(10))?);
//!     let client = Arc::new(PriceClient::new(upstream, PriceClientConfig::default()));
//!     let board = PriceBoard::new(client, PriceBoardConfig::default());
//!
//!     board.refresh_all().await;
//!
//!     let quote = board
//!         .quote(PaymentToken::Bit10Btc, IndexToken::Top, Quantity::new(2)?)
//!         .await;
//!     println!("Pay {} BIT10.BTC", quote.breakdown().total_payment);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod ledger;
pub mod logging;
pub mod market;
pub mod orchestrator;
pub mod portfolio;
pub mod pricing;
pub mod wallet;

#[cfg(test)]
pub(crate) mod testing;

// Re-export top-level types for convenience
pub use market::{
    IndexToken, PaymentToken, Quantity, Quote, QuoteBreakdown, QuoteError, StakeRequest,
};

pub use pricing::{
    HttpUpstream, PriceBoard, PriceBoardConfig, PriceClient, PriceClientConfig, PriceError,
    PriceState, Upstream, UpstreamError,
};

pub use wallet::{
    AdapterWallet, Chain, ConnectionState, ExtensionHost, ExtensionWallet, WalletBridge,
    WalletError, WalletProvider, WalletSession,
};

pub use ledger::{CallOutcome, CanisterIds, FailureKind, LedgerError};

pub use orchestrator::{
    FailureReason, Notification, Notifier, Orchestrator, OrchestratorConfig, OrchestratorError,
    TransferAttempt, TransferStatus,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{
    ApiConfig as ConfigApiConfig, Config, ConfigError, LoggingConfig, TradingConfig,
};
