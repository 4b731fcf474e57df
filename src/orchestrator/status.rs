//! Transfer attempt state machine

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use super::notify::messages;
use super::OrchestratorError;

/// What a submit action is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptKind {
    Swap,
    Stake,
}

impl AttemptKind {
    pub fn success_message(&self) -> &'static str {
        match self {
            AttemptKind::Swap => messages::SWAP_SUCCEEDED,
            AttemptKind::Stake => messages::STAKE_SUCCEEDED,
        }
    }
}

/// Classified reason an attempt failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// User declined the connection request
    WalletRejected,
    /// Provider errored while connecting or creating actors
    WalletUnavailable(String),
    /// No connected ICP session
    WalletNotConnected,
    /// Approval refused for lack of funds
    InsufficientFunds,
    /// Approval refused for any other reason
    ApprovalRejected(String),
    /// Transfer refused for lack of balance
    InsufficientBalance,
    /// Transfer refused for any other reason
    TransferFailed(String),
    /// A call failed below the canister's result type
    CallFailed(String),
}

impl FailureReason {
    /// Toast text shown for this failure
    pub fn user_message(&self) -> &'static str {
        match self {
            FailureReason::WalletRejected => messages::TRANSFER_FAILED,
            FailureReason::WalletNotConnected => messages::CONNECT_WALLET_FIRST,
            FailureReason::InsufficientFunds | FailureReason::InsufficientBalance => {
                messages::INSUFFICIENT_FUNDS
            }
            FailureReason::ApprovalRejected(_) => messages::APPROVAL_FAILED,
            FailureReason::WalletUnavailable(_)
            | FailureReason::TransferFailed(_)
            | FailureReason::CallFailed(_) => messages::GENERIC_ERROR,
        }
    }
}

/// Orchestrator / attempt status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum TransferStatus {
    Idle,
    ConnectingWallet,
    RequestingApproval,
    Approved,
    SubmittingTransfer,
    Succeeded,
    Failed(FailureReason),
}

impl TransferStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferStatus::Succeeded | TransferStatus::Failed(_))
    }

    /// Between connecting and the end of the transfer call; submit is
    /// disabled while busy
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            TransferStatus::ConnectingWallet
                | TransferStatus::RequestingApproval
                | TransferStatus::Approved
                | TransferStatus::SubmittingTransfer
        )
    }

    pub fn can_transition_to(&self, next: &TransferStatus) -> bool {
        use TransferStatus::*;

        match (self, next) {
            (Idle, ConnectingWallet) => true,
            (ConnectingWallet, RequestingApproval) => true,
            (RequestingApproval, Approved) => true,
            (Approved, SubmittingTransfer) => true,
            (SubmittingTransfer, Succeeded) => true,
            (ConnectingWallet | RequestingApproval | Approved | SubmittingTransfer, Failed(_)) => {
                true
            }
            _ => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Idle => "idle",
            TransferStatus::ConnectingWallet => "connecting_wallet",
            TransferStatus::RequestingApproval => "requesting_approval",
            TransferStatus::Approved => "approved",
            TransferStatus::SubmittingTransfer => "submitting_transfer",
            TransferStatus::Succeeded => "succeeded",
            TransferStatus::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submit action and every status it went through
#[derive(Debug, Clone, Serialize)]
pub struct TransferAttempt {
    pub id: String,
    pub kind: AttemptKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    history: Vec<TransferStatus>,
}

impl TransferAttempt {
    pub fn new(kind: AttemptKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            started_at: Utc::now(),
            finished_at: None,
            history: vec![TransferStatus::Idle],
        }
    }

    pub fn status(&self) -> &TransferStatus {
        // history always holds the initial Idle entry
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[TransferStatus] {
        &self.history
    }

    /// Move to `next`, rejecting transitions the state machine forbids
    pub fn advance(&mut self, next: TransferStatus) -> Result<(), OrchestratorError> {
        let current = self.status();
        if !current.can_transition_to(&next) {
            return Err(OrchestratorError::InvalidTransition {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
        self.history.push(next);
        Ok(())
    }

    /// Whether an `approved` status was observed in this attempt
    pub fn was_approved(&self) -> bool {
        self.history.contains(&TransferStatus::Approved)
    }

    pub fn succeeded(&self) -> bool {
        *self.status() == TransferStatus::Succeeded
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self.status() {
            TransferStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}
