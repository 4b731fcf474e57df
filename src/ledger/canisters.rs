//! Canister identifiers

use candid::Principal;

use super::actor::LedgerError;

/// BIT10.BTC ledger
pub const DEFAULT_PAYMENT_LEDGER: &str = "eegan-kqaaa-aaaap-qhmgq-cai";

/// Exchange canister
pub const DEFAULT_SWAP: &str = "6phs7-6yaaa-aaaap-qpvoq-cai";

/// Liquidity hub canister
pub const DEFAULT_LIQUIDITY_HUB: &str = "jskxc-iiaaa-aaaap-qpwrq-cai";

/// Resolved canister principals used by the trading flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanisterIds {
    pub payment_ledger: Principal,
    pub swap: Principal,
    pub liquidity_hub: Principal,
}

impl CanisterIds {
    pub fn parse(
        payment_ledger: &str,
        swap: &str,
        liquidity_hub: &str,
    ) -> Result<Self, LedgerError> {
        Ok(Self {
            payment_ledger: parse_principal(payment_ledger)?,
            swap: parse_principal(swap)?,
            liquidity_hub: parse_principal(liquidity_hub)?,
        })
    }

    /// Whitelist to request when approving for the swap canister
    pub fn swap_whitelist(&self) -> Vec<Principal> {
        vec![self.payment_ledger, self.swap]
    }

    /// Whitelist to request when approving for the liquidity hub
    pub fn stake_whitelist(&self) -> Vec<Principal> {
        vec![self.payment_ledger, self.liquidity_hub]
    }
}

fn parse_principal(text: &str) -> Result<Principal, LedgerError> {
    Principal::from_text(text).map_err(|e| LedgerError::InvalidCanisterId {
        text: text.to_string(),
        reason: e.to_string(),
    })
}
