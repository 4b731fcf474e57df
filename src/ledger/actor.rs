//! Canister actor seams
//!
//! Implemented by whatever the wallet provider hands back from actor
//! creation. Calls are issued once; there is no retry or cancellation here.

use async_trait::async_trait;
use thiserror::Error;

use super::types::{ApproveArgs, ApproveResult, ExchangeResult, StakeArgs, SwapArgs};

/// ICRC-2 token ledger
#[async_trait]
pub trait TokenLedger: Send + Sync {
    async fn icrc2_approve(&self, args: ApproveArgs) -> Result<ApproveResult, LedgerError>;
}

/// Exchange canister
#[async_trait]
pub trait SwapCanister: Send + Sync {
    async fn te_swap(&self, args: SwapArgs) -> Result<ExchangeResult, LedgerError>;
}

/// Staking (liquidity hub) canister
#[async_trait]
pub trait LiquidityHub: Send + Sync {
    async fn te_slp(&self, args: StakeArgs) -> Result<ExchangeResult, LedgerError>;
}

/// Failures below the canister's own result type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Call to {canister} was rejected: {message}")]
    Rejected { canister: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to decode reply: {0}")]
    Decode(String),

    #[error("Invalid canister id {text:?}: {reason}")]
    InvalidCanisterId { text: String, reason: String },
}
