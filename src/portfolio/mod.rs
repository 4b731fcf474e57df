//! Portfolio read model
//!
//! Index composition and holder balances as shown on the portfolio page:
//! equal-weight allocation per index, balance series for the chart, and the
//! display formatting for addresses and token amounts.

use serde::{Deserialize, Serialize};

use crate::market::IndexToken;
use crate::pricing::{Constituent, IndexPriceFeed};

/// Label of the placeholder slice for an empty portfolio
pub const NO_DATA_LABEL: &str = "No Data";

/// Constituents of one index at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexSnapshot {
    pub token: IndexToken,
    pub timestamp: Option<String>,
    pub token_price: f64,
    pub constituents: Vec<Constituent>,
}

impl IndexSnapshot {
    pub fn from_feed(token: IndexToken, feed: IndexPriceFeed) -> Self {
        Self {
            token,
            token_price: feed.price(),
            timestamp: feed.timestmpz,
            constituents: feed.data,
        }
    }
}

/// One constituent's share of an index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationSlice {
    pub symbol: String,
    pub name: String,
    pub weight_percent: f64,
}

/// Every constituent weighted `100 / n` percent
pub fn equal_weight_allocation(snapshot: &IndexSnapshot) -> Vec<AllocationSlice> {
    let count = snapshot.constituents.len();
    if count == 0 {
        return Vec::new();
    }

    let weight = 100.0 / count as f64;
    snapshot
        .constituents
        .iter()
        .map(|c| AllocationSlice {
            symbol: c.symbol.clone(),
            name: c.name.clone(),
            weight_percent: weight,
        })
        .collect()
}

/// Ledger integer amount to whole tokens
pub fn balance_from_base_units(raw: u128, decimals: u32) -> f64 {
    raw as f64 / 10f64.powi(decimals as i32)
}

/// Shorten an address to `abcd...xyz`; seven characters or fewer are kept
pub fn format_address(id: &str) -> String {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() <= 7 {
        return id.to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{}...{}", head, tail)
}

/// Five decimals with trailing zeros trimmed
pub fn format_token_amount(amount: f64) -> String {
    let rounded = format!("{:.5}", amount);
    rounded
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

/// A held index token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub label: String,
    pub balance: f64,
}

/// One slice of the balance chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
}

/// Balance chart series. Only positive balances appear; when the displayed
/// total is zero the series is a single placeholder slice.
pub fn balance_chart(holdings: &[Holding]) -> Vec<ChartSlice> {
    let total: f64 = holdings.iter().map(|h| h.balance).sum();
    let displayed_total: f64 = format_token_amount(total).parse().unwrap_or(0.0);

    if displayed_total == 0.0 {
        return vec![ChartSlice {
            name: NO_DATA_LABEL.to_string(),
            value: 1.0,
        }];
    }

    holdings
        .iter()
        .filter(|h| h.balance > 0.0)
        .map(|h| ChartSlice {
            name: h.label.clone(),
            value: h.balance,
        })
        .collect()
}
