//! Swap Quote Calculator
//!
//! Pure function of (quantity, target price, payment price). Recomputed on
//! every input change; never persisted.

use serde::{Deserialize, Serialize};

use super::error::{QuoteError, QuoteResult};
use super::tokens::{to_base_units, IndexToken, PaymentToken, Quantity};

/// Platform fee charged on top of the payment amount
pub const DEFAULT_FEE_RATE: f64 = 0.03;

/// Approval headroom for swaps (covers price drift between approve and swap)
pub const DEFAULT_SWAP_HEADROOM: f64 = 3.0;

/// A quote for buying `target_quantity` index tokens with `payment_token`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quote {
    pub payment_token: PaymentToken,
    pub target_token: IndexToken,
    pub target_quantity: Quantity,
    /// USD price of one target token (0 while loading)
    pub unit_price_usd: f64,
    /// USD price of one payment token (0 while loading)
    pub payment_unit_price_usd: f64,
    pub fee_rate: f64,
}

fn is_usable_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

impl Quote {
    /// Build a quote. Prices that have not resolved yet are passed as `None`
    /// and read as zero.
    pub fn new(
        payment_token: PaymentToken,
        target_token: IndexToken,
        target_quantity: Quantity,
        unit_price_usd: Option<f64>,
        payment_unit_price_usd: Option<f64>,
    ) -> Self {
        Self {
            payment_token,
            target_token,
            target_quantity,
            unit_price_usd: unit_price_usd.unwrap_or(0.0),
            payment_unit_price_usd: payment_unit_price_usd.unwrap_or(0.0),
            fee_rate: DEFAULT_FEE_RATE,
        }
    }

    pub fn with_fee_rate(mut self, fee_rate: f64) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Both prices resolved to positive values. Submission is only allowed
    /// for ready quotes.
    pub fn is_ready(&self) -> bool {
        is_usable_price(self.unit_price_usd) && is_usable_price(self.payment_unit_price_usd)
    }

    /// Payment tokens owed before fees: `quantity × target / payment`
    pub fn payment_amount(&self) -> f64 {
        if !self.is_ready() {
            return 0.0;
        }

        self.target_quantity.get() as f64 * self.unit_price_usd / self.payment_unit_price_usd
    }

    pub fn fee_amount(&self) -> f64 {
        self.payment_amount() * self.fee_rate
    }

    /// Payment amount including the platform fee (what the form displays)
    pub fn total_payment(&self) -> f64 {
        self.payment_amount() * (1.0 + self.fee_rate)
    }

    /// USD value of the requested index tokens
    pub fn usd_value(&self) -> f64 {
        if !is_usable_price(self.unit_price_usd) {
            return 0.0;
        }

        self.target_quantity.get() as f64 * self.unit_price_usd
    }

    pub fn usd_fee(&self) -> f64 {
        self.usd_value() * self.fee_rate
    }

    pub fn usd_total(&self) -> f64 {
        self.usd_value() + self.usd_fee()
    }

    /// Amount to approve for spending, inflated by `headroom`.
    ///
    /// The headroom never feeds back into the displayed quote.
    pub fn approval_amount(&self, headroom: f64) -> QuoteResult<f64> {
        if !self.is_ready() {
            return Err(QuoteError::PricesNotReady);
        }
        if !headroom.is_finite() || headroom <= 0.0 {
            return Err(QuoteError::InvalidAmount(format!(
                "headroom must be positive, got {}",
                headroom
            )));
        }

        Ok(self.payment_amount() * headroom)
    }

    /// Approval amount in ledger base units
    pub fn approval_base_units(&self, headroom: f64) -> QuoteResult<u64> {
        to_base_units(self.approval_amount(headroom)?)
    }

    /// Display-ready view of the quote
    pub fn breakdown(&self) -> QuoteBreakdown {
        let ready = self.is_ready();
        let payment = |value: f64| {
            if ready {
                format!("{:.6}", value)
            } else {
                "0".to_string()
            }
        };
        let usd = |value: f64| {
            if is_usable_price(self.unit_price_usd) {
                format!("{:.4}", value)
            } else {
                "0".to_string()
            }
        };

        QuoteBreakdown {
            payment_token: self.payment_token.label().to_string(),
            target_token: self.target_token.label().to_string(),
            quantity: self.target_quantity.get(),
            unit_price_usd: self.unit_price_usd,
            payment_unit_price_usd: self.payment_unit_price_usd,
            fee_rate: self.fee_rate,
            payment_amount: payment(self.payment_amount()),
            fee_amount: payment(self.fee_amount()),
            total_payment: payment(self.total_payment()),
            usd_value: usd(self.usd_value()),
            usd_fee: usd(self.usd_fee()),
            usd_total: usd(self.usd_total()),
            submit_enabled: ready,
        }
    }
}

/// Formatted quote, as shown by the swap form and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub payment_token: String,
    pub target_token: String,
    pub quantity: u32,
    pub unit_price_usd: f64,
    pub payment_unit_price_usd: f64,
    pub fee_rate: f64,
    /// Payment amount before fee (6 decimals)
    pub payment_amount: String,
    pub fee_amount: String,
    /// Payment amount including fee (6 decimals)
    pub total_payment: String,
    /// USD value before fee (4 decimals)
    pub usd_value: String,
    pub usd_fee: String,
    pub usd_total: String,
    pub submit_enabled: bool,
}
