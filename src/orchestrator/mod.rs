//! Approval-and-Transfer Orchestrator
//!
//! Sequences a submit action through
//! `idle → connecting_wallet → requesting_approval → approved →
//! submitting_transfer → {succeeded | failed}` and reports every step to the
//! user through [`Notifier`].
//!
//! ## Guarantees
//!
//! - A transfer call is never issued without a successful approval in the
//!   same attempt ([`TransferAttempt::advance`] enforces the ordering)
//! - At most one attempt is in flight per orchestrator
//! - Nothing is retried; after each attempt the orchestrator is `idle` again
//! - Provider calls are not cancelled once issued

mod flow;
mod guard;
mod notify;
mod status;

pub use flow::{Orchestrator, OrchestratorConfig};
pub use guard::InFlightGuard;
pub use notify::{messages, Notification, NotificationLevel, Notifier};
pub use status::{AttemptKind, FailureReason, TransferAttempt, TransferStatus};

use thiserror::Error;

use crate::market::QuoteError;

/// Reasons a submit is refused before any attempt starts
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    #[error("Quote is not ready: prices are zero or still loading")]
    QuoteNotReady,

    #[error("A transfer attempt is already in progress")]
    AttemptInFlight,

    #[error("Invalid order: {0}")]
    InvalidOrder(#[from] QuoteError),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
