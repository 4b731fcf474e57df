//! Swap and stake submission
//!
//! Each submit runs: connect request with a canister whitelist, session
//! check, `icrc2_approve` on the payment ledger, then `te_swap` / `te_slp`.

use candid::{Nat, Principal};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::guard::InFlightGuard;
use super::notify::{messages, Notifier};
use super::status::{AttemptKind, FailureReason, TransferAttempt, TransferStatus};
use super::OrchestratorError;
use crate::config::TradingConfig;
use crate::ledger::{
    ApproveArgs, CallOutcome, CanisterIds, FailureKind, StakeArgs, SwapArgs,
    STAKE_INSUFFICIENT_BALANCE, SWAP_INSUFFICIENT_BALANCE,
};
use crate::market::{Quote, StakeRequest, DEFAULT_STAKE_HEADROOM, DEFAULT_SWAP_HEADROOM};
use crate::wallet::{Chain, ExtensionHost, WalletBridge};

/// Runtime settings for the trading flow
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub swap_headroom: f64,
    pub stake_headroom: f64,
    /// How long an approval stays valid
    pub approval_expiry: Duration,
    pub notification_capacity: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            swap_headroom: DEFAULT_SWAP_HEADROOM,
            stake_headroom: DEFAULT_STAKE_HEADROOM,
            approval_expiry: Duration::from_secs(300),
            notification_capacity: 64,
        }
    }
}

impl From<&TradingConfig> for OrchestratorConfig {
    fn from(config: &TradingConfig) -> Self {
        Self {
            swap_headroom: config.swap_headroom,
            stake_headroom: config.stake_headroom,
            approval_expiry: Duration::from_secs(config.approval_expiry_secs),
            ..Default::default()
        }
    }
}

enum Transfer {
    Swap(SwapArgs),
    Stake(StakeArgs),
}

struct Plan {
    kind: AttemptKind,
    spender: Principal,
    whitelist: Vec<Principal>,
    approval_units: u64,
    transfer: Transfer,
}

/// Drives approval-then-transfer attempts for one form instance
pub struct Orchestrator {
    bridge: Arc<WalletBridge>,
    host: Arc<dyn ExtensionHost>,
    canisters: CanisterIds,
    config: OrchestratorConfig,
    notifier: Notifier,
    status: watch::Sender<TransferStatus>,
    in_flight: AtomicBool,
}

impl Orchestrator {
    pub fn new(
        bridge: Arc<WalletBridge>,
        host: Arc<dyn ExtensionHost>,
        canisters: CanisterIds,
        config: OrchestratorConfig,
    ) -> Self {
        let (status, _) = watch::channel(TransferStatus::Idle);
        let notifier = Notifier::new(config.notification_capacity);

        Self {
            bridge,
            host,
            canisters,
            config,
            notifier,
            status,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TransferStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> TransferStatus {
        self.status.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Whether the swap submit control should be enabled
    pub fn can_submit_swap(&self, quote: &Quote) -> bool {
        quote.is_ready() && !self.is_busy() && self.bridge.active_chain() == Some(Chain::Icp)
    }

    /// Whether the stake submit control should be enabled
    pub fn can_submit_stake(&self) -> bool {
        !self.is_busy()
    }

    /// Buy `quote.target_quantity` index tokens.
    ///
    /// Returns the finished attempt; a failed attempt is a normal outcome and
    /// has already been reported through the notifier.
    pub async fn submit_swap(&self, quote: &Quote) -> Result<TransferAttempt, OrchestratorError> {
        if !quote.is_ready() {
            return Err(OrchestratorError::QuoteNotReady);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let plan = Plan {
            kind: AttemptKind::Swap,
            spender: self.canisters.swap,
            whitelist: self.canisters.swap_whitelist(),
            approval_units: quote.approval_base_units(self.config.swap_headroom)?,
            transfer: Transfer::Swap(SwapArgs {
                tick_in_name: quote.payment_token.label().to_string(),
                tick_out_name: quote.target_token.label().to_string(),
                tick_out_amount: Nat::from(quote.target_quantity.get()),
            }),
        };

        tracing::info!(
            token = %quote.target_token,
            quantity = quote.target_quantity.get(),
            approval_units = plan.approval_units,
            "Submitting swap"
        );

        Ok(self.execute(plan).await)
    }

    /// Stake `request.amount` in the liquidity hub
    pub async fn submit_stake(
        &self,
        request: &StakeRequest,
    ) -> Result<TransferAttempt, OrchestratorError> {
        request.validate()?;
        let _guard = InFlightGuard::acquire(&self.in_flight)?;

        let plan = Plan {
            kind: AttemptKind::Stake,
            spender: self.canisters.liquidity_hub,
            whitelist: self.canisters.stake_whitelist(),
            approval_units: request.approval_base_units(self.config.stake_headroom)?,
            transfer: Transfer::Stake(StakeArgs {
                tick_in_name: request.token.label().to_string(),
                tick_in_amount: Nat::from(request.tick_in_base_units()?),
                duration: Nat::from(request.duration_days),
            }),
        };

        tracing::info!(
            token = %request.token,
            amount = request.amount,
            duration_days = request.duration_days,
            "Submitting stake"
        );

        Ok(self.execute(plan).await)
    }

    async fn execute(&self, plan: Plan) -> TransferAttempt {
        let mut attempt = TransferAttempt::new(plan.kind);

        match self.drive(&mut attempt, plan).await {
            Ok(()) => {
                tracing::info!(attempt_id = %attempt.id, kind = ?attempt.kind, "Transfer succeeded");
            }
            Err(reason) => {
                tracing::warn!(attempt_id = %attempt.id, kind = ?attempt.kind, reason = ?reason, "Transfer failed");
                self.notifier.error(reason.user_message());

                if let Err(e) = self.transition(&mut attempt, TransferStatus::Failed(reason)) {
                    tracing::error!(attempt_id = %attempt.id, error = %e, "Could not record failure");
                }
            }
        }

        self.status.send_replace(TransferStatus::Idle);
        attempt
    }

    async fn drive(&self, attempt: &mut TransferAttempt, plan: Plan) -> Result<(), FailureReason> {
        self.advance(attempt, TransferStatus::ConnectingWallet)?;

        match self.host.request_connect(&plan.whitelist).await {
            Ok(true) => {}
            Ok(false) => return Err(FailureReason::WalletRejected),
            Err(e) => return Err(FailureReason::WalletUnavailable(e.to_string())),
        }

        self.bridge.refresh().await;
        match self.bridge.session().await {
            Some(session) if session.chain == Chain::Icp => {
                tracing::debug!(attempt_id = %attempt.id, address = %session.address, "Wallet session active");
            }
            _ => return Err(FailureReason::WalletNotConnected),
        }

        self.advance(attempt, TransferStatus::RequestingApproval)?;
        self.notifier.info(messages::ALLOW_IN_WALLET);

        let ledger = self
            .host
            .create_ledger(self.canisters.payment_ledger)
            .await
            .map_err(|e| FailureReason::WalletUnavailable(e.to_string()))?;

        let args = ApproveArgs::for_spender(plan.spender, plan.approval_units, self.expires_at());
        let approval = ledger
            .icrc2_approve(args)
            .await
            .map_err(|e| FailureReason::CallFailed(e.to_string()))?;

        match CallOutcome::from(approval) {
            CallOutcome::Success(block_index) => {
                tracing::debug!(attempt_id = %attempt.id, block_index = %block_index, "Approval accepted");
            }
            CallOutcome::Failure(FailureKind::InsufficientFunds) => {
                return Err(FailureReason::InsufficientFunds)
            }
            CallOutcome::Failure(FailureKind::InsufficientBalance) => {
                return Err(FailureReason::InsufficientBalance)
            }
            CallOutcome::Failure(FailureKind::Unknown(detail)) => {
                return Err(FailureReason::ApprovalRejected(detail))
            }
        }

        self.advance(attempt, TransferStatus::Approved)?;
        self.notifier.success(messages::APPROVAL_SUCCEEDED);

        self.advance(attempt, TransferStatus::SubmittingTransfer)?;
        let outcome = match plan.transfer {
            Transfer::Swap(args) => {
                let swap = self
                    .host
                    .create_swap(self.canisters.swap)
                    .await
                    .map_err(|e| FailureReason::WalletUnavailable(e.to_string()))?;
                swap.te_swap(args)
                    .await
                    .map_err(|e| FailureReason::CallFailed(e.to_string()))?
                    .classify(SWAP_INSUFFICIENT_BALANCE)
            }
            Transfer::Stake(args) => {
                let hub = self
                    .host
                    .create_liquidity_hub(self.canisters.liquidity_hub)
                    .await
                    .map_err(|e| FailureReason::WalletUnavailable(e.to_string()))?;
                hub.te_slp(args)
                    .await
                    .map_err(|e| FailureReason::CallFailed(e.to_string()))?
                    .classify(STAKE_INSUFFICIENT_BALANCE)
            }
        };

        match outcome {
            CallOutcome::Success(_) => {
                self.advance(attempt, TransferStatus::Succeeded)?;
                self.notifier.success(plan.kind.success_message());
                Ok(())
            }
            CallOutcome::Failure(FailureKind::InsufficientBalance) => {
                Err(FailureReason::InsufficientBalance)
            }
            CallOutcome::Failure(FailureKind::InsufficientFunds) => {
                Err(FailureReason::InsufficientFunds)
            }
            CallOutcome::Failure(FailureKind::Unknown(detail)) => {
                Err(FailureReason::TransferFailed(detail))
            }
        }
    }

    /// Record and publish a status change
    fn transition(
        &self,
        attempt: &mut TransferAttempt,
        next: TransferStatus,
    ) -> Result<(), OrchestratorError> {
        attempt.advance(next.clone())?;
        self.status.send_replace(next);
        Ok(())
    }

    fn advance(&self, attempt: &mut TransferAttempt, next: TransferStatus) -> Result<(), FailureReason> {
        self.transition(attempt, next)
            .map_err(|e| FailureReason::CallFailed(e.to_string()))
    }

    /// Approval expiry in nanoseconds since epoch
    fn expires_at(&self) -> u64 {
        let now = Utc::now().timestamp_nanos_opt().unwrap_or_default().max(0) as u64;
        deadline_nanos(now, self.config.approval_expiry)
    }
}

/// `now + expiry`, saturating at `u64::MAX`
fn deadline_nanos(now: u64, expiry: Duration) -> u64 {
    now.saturating_add(u64::try_from(expiry.as_nanos()).unwrap_or(u64::MAX))
}
