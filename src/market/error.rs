//! Quote and order validation errors

use thiserror::Error;

/// Errors raised while building quotes or validating order input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// Token name not in the catalogue
    #[error("Unknown token: {0}")]
    UnknownToken(String),

    /// Quantity outside the enumerated set
    #[error("Quantity must be one of 1, 2, 3, 4 or 5, got {0}")]
    InvalidQuantity(String),

    /// Amount failed validation
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Staking duration below the minimum
    #[error("Staking duration must be at least 1 day, got {0}")]
    InvalidDuration(u32),

    /// One or both prices are zero or still loading
    #[error("Prices are not ready")]
    PricesNotReady,
}

/// Result type alias for quote operations
pub type QuoteResult<T> = Result<T, QuoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuoteError::InvalidQuantity("9".to_string());
        assert_eq!(err.to_string(), "Quantity must be one of 1, 2, 3, 4 or 5, got 9");

        assert_eq!(QuoteError::PricesNotReady.to_string(), "Prices are not ready");
    }
}
