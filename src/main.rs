//! BIT10 price watcher
//!
//! Keeps the price board fresh in the background and logs the current quote
//! for every index token on each reference refresh.

use bit10::api::shutdown_signal;
use bit10::config::Config;
use bit10::logging::init_logging;
use bit10::market::{IndexToken, PaymentToken, Quantity};
use bit10::pricing::{HttpUpstream, PriceBoard, PriceBoardConfig, PriceClient, PriceClientConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    config.validate()?;
    init_logging(&config.logging)?;

    tracing::info!("BIT10 price watcher v{}", env!("CARGO_PKG_VERSION"));

    let upstream = Arc::new(HttpUpstream::new(Duration::from_millis(
        config.upstream.request_timeout_ms,
    ))?);

    let client = Arc::new(PriceClient::new(
        upstream,
        PriceClientConfig {
            upstream_base_url: config.upstream.base_url.clone(),
            reference_url: config.pricing.reference_url.clone(),
        },
    ));

    let board_config = PriceBoardConfig {
        index_refresh: Duration::from_secs(config.pricing.index_refresh_secs),
        reference_refresh: Duration::from_secs(config.pricing.reference_refresh_secs),
        fee_rate: config.trading.fee_rate,
    };
    let report_every = board_config.reference_period();

    let board = Arc::new(PriceBoard::new(client, board_config));
    Arc::clone(&board).start_background_refresh();

    let report = async {
        let mut ticker = tokio::time::interval(report_every);
        loop {
            ticker.tick().await;
            report_quotes(&board).await;
        }
    };

    tokio::select! {
        _ = report => {},
        _ = shutdown_signal() => {},
    }

    tracing::info!("Price watcher stopped");
    Ok(())
}

async fn report_quotes(board: &PriceBoard) {
    for token in IndexToken::ALL {
        let quote = board
            .quote(PaymentToken::Bit10Btc, token, Quantity::default())
            .await;
        let breakdown = quote.breakdown();

        if quote.is_ready() {
            tracing::info!(
                token = %token,
                unit_price_usd = quote.unit_price_usd,
                payment_unit_price_usd = quote.payment_unit_price_usd,
                total_payment = %breakdown.total_payment,
                "Quote"
            );
        } else {
            tracing::info!(
                token = %token,
                index_price = ?board.index_price(token).await,
                reference_price = ?board.reference_price(PaymentToken::Bit10Btc).await,
                "Quote not ready"
            );
        }
    }
}
