//! Price feeds
//!
//! - [`PriceClient`]: one-shot fetches of index prices (pricing service) and
//!   payment token prices (reference exchange)
//! - [`PriceBoard`]: last known prices, refreshed in the background
//! - [`Upstream`]: the JSON-over-HTTP seam both sit on

mod board;
mod client;
mod upstream;

pub use board::{PriceBoard, PriceBoardConfig, PriceState, MIN_REFRESH_INTERVAL};
pub use client::{
    parse_reference_price, Constituent, IndexPriceFeed, PriceClient, PriceClientConfig, PriceError,
};
pub use upstream::{join_url, HttpUpstream, Upstream, UpstreamError};
