//! Market Primitives
//!
//! Token catalogue, bounded order quantities and the pure quote math used by
//! the swap and stake forms.
//!
//! ## Quote flow
//!
//! 1. The price board supplies the target index price and the payment
//!    asset's reference price (either may still be loading)
//! 2. [`Quote`] turns them into a payment amount plus a 3% platform fee
//! 3. The orchestrator asks the quote for the approval amount, which carries
//!    a headroom multiplier so the allowance survives price drift
//!
//! A quote whose prices are not both positive is *not ready*: it displays as
//! zero and the submit control stays disabled.

mod error;
mod quote;
mod stake;
mod tokens;

pub use error::QuoteError;
pub use quote::{Quote, QuoteBreakdown, DEFAULT_FEE_RATE, DEFAULT_SWAP_HEADROOM};
pub use stake::{StakeRequest, DEFAULT_STAKE_HEADROOM, MAX_AMOUNT_DECIMALS};
pub use tokens::{
    to_base_units, IndexToken, PaymentToken, Quantity, ALLOWED_QUANTITIES, BASE_UNITS_PER_TOKEN,
};
