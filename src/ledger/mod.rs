//! Ledger Interface
//!
//! Candid shapes of the canister methods the trading flow calls through the
//! wallet bridge, plus the classification of their results.
//!
//! - [`TokenLedger`]: ICRC-2 `icrc2_approve` on the payment token ledger
//! - [`SwapCanister`]: `te_swap` on the exchange
//! - [`LiquidityHub`]: `te_slp` on the staking hub
//!
//! Actors are created by the wallet provider; this module never talks to the
//! network itself.

mod actor;
mod canisters;
mod types;

pub use actor::{LedgerError, LiquidityHub, SwapCanister, TokenLedger};
pub use canisters::{CanisterIds, DEFAULT_LIQUIDITY_HUB, DEFAULT_PAYMENT_LEDGER, DEFAULT_SWAP};
pub use types::{
    Account, ApproveArgs, ApproveError, ApproveResult, CallOutcome, ExchangeResult, FailureKind,
    StakeArgs, SwapArgs, STAKE_INSUFFICIENT_BALANCE, SWAP_INSUFFICIENT_BALANCE,
};
