//! Stake Request
//!
//! Input for the liquidity hub: lock an amount of the payment token for a
//! number of days.

use serde::{Deserialize, Serialize};

use super::error::{QuoteError, QuoteResult};
use super::tokens::{to_base_units, PaymentToken, BASE_UNITS_PER_TOKEN};

/// Approval headroom for stakes
pub const DEFAULT_STAKE_HEADROOM: f64 = 1.5;

/// Ledger precision; amounts with more decimals are rejected
pub const MAX_AMOUNT_DECIMALS: u32 = 8;

/// A validated staking order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StakeRequest {
    pub token: PaymentToken,
    pub amount: f64,
    pub duration_days: u32,
}

impl Default for StakeRequest {
    fn default() -> Self {
        Self {
            token: PaymentToken::Bit10Btc,
            amount: 0.03,
            duration_days: 1,
        }
    }
}

impl StakeRequest {
    pub fn new(token: PaymentToken, amount: f64, duration_days: u32) -> QuoteResult<Self> {
        let request = Self {
            token,
            amount,
            duration_days,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> QuoteResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(QuoteError::InvalidAmount(
                "The amount must be a positive number".to_string(),
            ));
        }

        if !has_at_most_decimals(self.amount) {
            return Err(QuoteError::InvalidAmount(format!(
                "Amount cannot have more than {} decimal places",
                MAX_AMOUNT_DECIMALS
            )));
        }

        if self.duration_days < 1 {
            return Err(QuoteError::InvalidDuration(self.duration_days));
        }

        Ok(())
    }

    /// Staked amount in base units (`tick_in_amount`)
    pub fn tick_in_base_units(&self) -> QuoteResult<u64> {
        self.validate()?;
        to_base_units(self.amount)
    }

    /// Allowance requested before staking, inflated by `headroom`
    pub fn approval_base_units(&self, headroom: f64) -> QuoteResult<u64> {
        self.validate()?;
        if !headroom.is_finite() || headroom <= 0.0 {
            return Err(QuoteError::InvalidAmount(format!(
                "headroom must be positive, got {}",
                headroom
            )));
        }

        to_base_units(self.amount * headroom)
    }
}

fn has_at_most_decimals(value: f64) -> bool {
    (value * BASE_UNITS_PER_TOKEN).round() / BASE_UNITS_PER_TOKEN == value
}
