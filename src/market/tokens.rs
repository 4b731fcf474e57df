//! Token Catalogue
//!
//! Index tokens a user can receive, assets accepted as payment, and the
//! bounded quantity type used by the swap form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::{QuoteError, QuoteResult};

/// Ledger base units per whole token (8 decimals)
pub const BASE_UNITS_PER_TOKEN: f64 = 100_000_000.0;

/// Quantities offered by the swap form
pub const ALLOWED_QUANTITIES: [u32; 5] = [1, 2, 3, 4, 5];

/// BIT10 index tokens available on the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexToken {
    Defi,
    Brc20,
    Top,
    Meme,
}

impl IndexToken {
    pub const ALL: [IndexToken; 4] = [
        IndexToken::Defi,
        IndexToken::Brc20,
        IndexToken::Top,
        IndexToken::Meme,
    ];

    /// Name used by the exchange canister (`tick_out_name`)
    pub fn label(&self) -> &'static str {
        match self {
            IndexToken::Defi => "Test BIT10.DEFI",
            IndexToken::Brc20 => "Test BIT10.BRC20",
            IndexToken::Top => "Test BIT10.TOP",
            IndexToken::Meme => "Test BIT10.MEME",
        }
    }

    /// Short lowercase symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            IndexToken::Defi => "defi",
            IndexToken::Brc20 => "brc20",
            IndexToken::Top => "top",
            IndexToken::Meme => "meme",
        }
    }

    /// Name of the current-price feed for this index
    pub fn price_route(&self) -> &'static str {
        match self {
            IndexToken::Defi => "bit10-defi-current-price",
            IndexToken::Brc20 => "bit10-brc20-current-price",
            IndexToken::Top => "bit10-top-current-price",
            IndexToken::Meme => "bit10-meme-current-price",
        }
    }
}

impl fmt::Display for IndexToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IndexToken {
    type Err = QuoteError;

    /// Accepts the symbol (`defi`), the ticker (`BIT10.DEFI`) or the full
    /// label (`Test BIT10.DEFI`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let normalized = normalized
            .strip_prefix("test ")
            .unwrap_or(&normalized)
            .trim();
        let normalized = normalized.strip_prefix("bit10.").unwrap_or(normalized);

        IndexToken::ALL
            .into_iter()
            .find(|token| token.symbol() == normalized)
            .ok_or_else(|| QuoteError::UnknownToken(s.to_string()))
    }
}

/// Assets accepted as payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentToken {
    #[serde(rename = "BIT10.BTC")]
    Bit10Btc,
}

impl PaymentToken {
    pub const ALL: [PaymentToken; 1] = [PaymentToken::Bit10Btc];

    /// Name used by the exchange canister (`tick_in_name`)
    pub fn label(&self) -> &'static str {
        match self {
            PaymentToken::Bit10Btc => "BIT10.BTC",
        }
    }

    /// Reference asset whose USD price prices this token
    pub fn reference_currency(&self) -> &'static str {
        match self {
            PaymentToken::Bit10Btc => "BTC",
        }
    }
}

impl Default for PaymentToken {
    fn default() -> Self {
        PaymentToken::Bit10Btc
    }
}

impl fmt::Display for PaymentToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentToken {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bit10.btc" | "btc" => Ok(PaymentToken::Bit10Btc),
            _ => Err(QuoteError::UnknownToken(s.to_string())),
        }
    }
}

/// Number of index tokens requested, restricted to [`ALLOWED_QUANTITIES`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    pub fn new(value: u32) -> QuoteResult<Self> {
        if ALLOWED_QUANTITIES.contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuoteError::InvalidQuantity(value.to_string()))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(1)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Quantity {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s
            .trim()
            .parse::<u32>()
            .map_err(|_| QuoteError::InvalidQuantity(s.to_string()))?;
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u32::deserialize(deserializer)?;
        Quantity::new(value).map_err(serde::de::Error::custom)
    }
}

/// Convert a whole-token amount into 8-decimal ledger base units
pub fn to_base_units(amount: f64) -> QuoteResult<u64> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(QuoteError::InvalidAmount(format!(
            "cannot convert {} to base units",
            amount
        )));
    }

    Ok((amount * BASE_UNITS_PER_TOKEN).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_token_parsing() {
        assert_eq!("defi".parse::<IndexToken>().unwrap(), IndexToken::Defi);
        assert_eq!("BIT10.TOP".parse::<IndexToken>().unwrap(), IndexToken::Top);
        assert_eq!(
            "Test BIT10.MEME".parse::<IndexToken>().unwrap(),
            IndexToken::Meme
        );
        assert!(matches!(
            "BIT10.XYZ".parse::<IndexToken>(),
            Err(QuoteError::UnknownToken(_))
        ));
    }

    #[test]
    fn test_index_token_names() {
        assert_eq!(IndexToken::Brc20.label(), "Test BIT10.BRC20");
        assert_eq!(IndexToken::Brc20.price_route(), "bit10-brc20-current-price");
        assert_eq!(IndexToken::Defi.to_string(), "Test BIT10.DEFI");
    }

    #[test]
    fn test_payment_token() {
        let token: PaymentToken = "BIT10.BTC".parse().unwrap();
        assert_eq!(token, PaymentToken::Bit10Btc);
        assert_eq!(token.reference_currency(), "BTC");
        assert!("ETH".parse::<PaymentToken>().is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        for value in ALLOWED_QUANTITIES {
            assert_eq!(Quantity::new(value).unwrap().get(), value);
        }
        assert!(Quantity::new(0).is_err());
        assert!(Quantity::new(6).is_err());
        assert!("abc".parse::<Quantity>().is_err());
        assert_eq!("3".parse::<Quantity>().unwrap().get(), 3);
    }

    #[test]
    fn test_quantity_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<Quantity>("4").is_ok());
        assert!(serde_json::from_str::<Quantity>("10").is_err());
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(1.0).unwrap(), 100_000_000);
        assert_eq!(to_base_units(0.03).unwrap(), 3_000_000);
        assert_eq!(to_base_units(0.123456789).unwrap(), 12_345_679);
        assert!(to_base_units(-1.0).is_err());
        assert!(to_base_units(f64::NAN).is_err());
    }
}
