//! Canister argument and result types

use candid::{CandidType, Nat, Principal};
use serde::{Deserialize, Serialize};

/// Marker in a failed `te_swap` result meaning the holder is short
pub const SWAP_INSUFFICIENT_BALANCE: &str = "Insufficient balance";

/// Marker in a failed `te_slp` result meaning the holder is short
pub const STAKE_INSUFFICIENT_BALANCE: &str = "Insufficient withdrawable balance";

/// ICRC-1 account
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub struct Account {
    pub owner: Principal,
    pub subaccount: Option<Vec<u8>>,
}

/// ICRC-2 `icrc2_approve` arguments
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub struct ApproveArgs {
    pub from_subaccount: Option<Vec<u8>>,
    pub spender: Account,
    pub amount: Nat,
    pub expected_allowance: Option<Nat>,
    pub expires_at: Option<u64>,
    pub fee: Option<Nat>,
    pub memo: Option<Vec<u8>>,
    pub created_at_time: Option<u64>,
}

impl ApproveArgs {
    /// Allowance for `spender` expiring at `expires_at` (ns since epoch),
    /// all optional fields left to ledger defaults
    pub fn for_spender(spender: Principal, amount: u64, expires_at: u64) -> Self {
        Self {
            from_subaccount: None,
            spender: Account {
                owner: spender,
                subaccount: None,
            },
            amount: Nat::from(amount),
            expected_allowance: None,
            expires_at: Some(expires_at),
            fee: None,
            memo: None,
            created_at_time: None,
        }
    }
}

/// ICRC-2 approve errors
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub enum ApproveError {
    BadFee { expected_fee: Nat },
    InsufficientFunds { balance: Nat },
    AllowanceChanged { current_allowance: Nat },
    Expired { ledger_time: u64 },
    TooOld,
    CreatedInFuture { ledger_time: u64 },
    Duplicate { duplicate_of: Nat },
    TemporarilyUnavailable,
    GenericError { error_code: Nat, message: String },
}

#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub enum ApproveResult {
    Ok(Nat),
    Err(ApproveError),
}

/// `te_swap` arguments
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub struct SwapArgs {
    pub tick_in_name: String,
    pub tick_out_name: String,
    pub tick_out_amount: Nat,
}

/// `te_slp` arguments
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub struct StakeArgs {
    pub tick_in_name: String,
    pub tick_in_amount: Nat,
    pub duration: Nat,
}

/// Result of `te_swap` / `te_slp`; errors are free text
#[derive(CandidType, Deserialize, Debug, Clone, PartialEq)]
pub enum ExchangeResult {
    Ok(Nat),
    Err(String),
}

impl ExchangeResult {
    /// Classify the result, treating an error containing
    /// `insufficient_marker` as an insufficient-balance failure
    pub fn classify(self, insufficient_marker: &str) -> CallOutcome<Nat> {
        match self {
            ExchangeResult::Ok(value) => CallOutcome::Success(value),
            ExchangeResult::Err(message) if message.contains(insufficient_marker) => {
                CallOutcome::Failure(FailureKind::InsufficientBalance)
            }
            ExchangeResult::Err(message) => CallOutcome::Failure(FailureKind::Unknown(message)),
        }
    }
}

/// Why a canister call did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureKind {
    InsufficientFunds,
    InsufficientBalance,
    Unknown(String),
}

/// Tagged result of a canister call
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome<T> {
    Success(T),
    Failure(FailureKind),
}

impl<T> CallOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }
}

impl From<ApproveResult> for CallOutcome<Nat> {
    fn from(result: ApproveResult) -> Self {
        match result {
            ApproveResult::Ok(block_index) => CallOutcome::Success(block_index),
            ApproveResult::Err(ApproveError::InsufficientFunds { .. }) => {
                CallOutcome::Failure(FailureKind::InsufficientFunds)
            }
            ApproveResult::Err(err) => CallOutcome::Failure(FailureKind::Unknown(format!("{:?}", err))),
        }
    }
}
