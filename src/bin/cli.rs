//! BIT10 CLI
//!
//! Command-line client for a running BIT10 API:
//! - Quote a swap
//! - Show current index prices and allocations
//! - Show rebalance and price history
//! - Generate a config file

use bit10::market::IndexToken;
use bit10::portfolio::format_token_amount;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bit10")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "BIT10 index-fund dashboard client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL
    #[arg(long, default_value = "http://localhost:8082", global = true)]
    pub api_url: String,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Quote buying index tokens
    Quote {
        /// Index token (defi, brc20, top, meme)
        token: String,
        /// Number of tokens, 1-5
        #[arg(short, long, default_value = "1")]
        quantity: u32,
    },

    /// Current price of every index token
    Prices,

    /// Equal-weight composition of an index
    Allocation {
        /// Index token (defi, brc20, top, meme)
        index: String,
    },

    /// Latest rebalance of the top index
    Rebalance,

    /// 60-day price history of the DeFi index
    History,

    /// Show API status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Quote { token, quantity } => {
            let quote = fetch(quote_request(&client, &cli.api_url, &token, quantity)).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&quote)?);
            } else {
                print_quote(&quote);
            }
        }

        Commands::Prices => {
            let mut rows = Vec::new();
            for token in IndexToken::ALL {
                let url = format!("{}/api/{}", cli.api_url, token.price_route());
                let feed = fetch(client.get(&url)).await?;
                rows.push((token, feed));
            }

            if cli.format == "json" {
                let map: serde_json::Map<String, serde_json::Value> = rows
                    .into_iter()
                    .map(|(token, feed)| (token.symbol().to_string(), feed))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                println!("{:<20} {:>14} {:>8}", "Index", "Price (USD)", "Tokens");
                println!("{}", "-".repeat(44));
                for (token, feed) in rows {
                    println!(
                        "{:<20} {:>14} {:>8}",
                        token.label(),
                        feed["tokenPrice"]
                            .as_f64()
                            .map(|p| format!("{:.4}", p))
                            .unwrap_or_else(|| "-".to_string()),
                        feed["data"].as_array().map_or(0, |d| d.len())
                    );
                }
            }
        }

        Commands::Allocation { index } => {
            let url = format!("{}/api/v1/allocation/{}", cli.api_url, index);
            let allocation = fetch(client.get(&url)).await?;

            if cli.format == "json" {
                println!("{}", serde_json::to_string_pretty(&allocation)?);
            } else {
                println!(
                    "{} (${})",
                    allocation["label"].as_str().unwrap_or("-"),
                    allocation["token_price"]
                        .as_f64()
                        .map(format_token_amount)
                        .unwrap_or_else(|| "-".to_string())
                );
                println!();

                let slices = allocation["slices"].as_array().cloned().unwrap_or_default();
                if slices.is_empty() {
                    println!("No constituents");
                }
                for slice in slices {
                    println!(
                        "  {:<10} {:<24} {:>8.3} %",
                        slice["symbol"].as_str().unwrap_or("-"),
                        slice["name"].as_str().unwrap_or("-"),
                        slice["weight_percent"].as_f64().unwrap_or(0.0)
                    );
                }
            }
        }

        Commands::Rebalance => {
            let url = format!("{}/api/bit10-latest-rebalance-top", cli.api_url);
            println!("{}", serde_json::to_string_pretty(&fetch(client.get(&url)).await?)?);
        }

        Commands::History => {
            let url = format!("{}/api/bit10-historic-data-defi-60", cli.api_url);
            println!("{}", serde_json::to_string_pretty(&fetch(client.get(&url)).await?)?);
        }

        Commands::Status => {
            let response = client
                .get(format!("{}/health", cli.api_url))
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("BIT10 v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!(
                        "API Status: {}",
                        health["status"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Upstream: {}",
                        health["upstream"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Cached routes: {} (TTL {}s)",
                        health["cached_routes"].as_u64().unwrap_or(0),
                        health["cache_ttl_secs"].as_u64().unwrap_or(0)
                    );

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("API returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to BIT10 API at {}", cli.api_url);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the BIT10 API server is running:");
                    eprintln!("  cargo run --bin bit10-api");
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let config = bit10::config::generate_default_config();

            match output {
                Some(path) => {
                    // Create parent directory if needed
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Quote request with the token and quantity query-encoded
fn quote_request(
    client: &reqwest::Client,
    api_url: &str,
    token: &str,
    quantity: u32,
) -> reqwest::RequestBuilder {
    client
        .get(format!("{}/api/v1/quote", api_url))
        .query(&[("token", token.to_string()), ("quantity", quantity.to_string())])
}

/// Send a GET and read its JSON body, exiting with the error body on failure
async fn fetch(
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let response = request.send().await?;

    if !response.status().is_success() {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        eprintln!("Request failed ({}): {}", status, text);
        std::process::exit(1);
    }

    Ok(response.json().await?)
}

fn print_quote(quote: &serde_json::Value) {
    let field = |name: &str| quote[name].as_str().unwrap_or("-").to_string();

    println!(
        "Buy {} x {}",
        quote["quantity"].as_u64().unwrap_or(0),
        field("target_token")
    );
    println!();
    println!("  Pay:        {} {}", field("payment_amount"), field("payment_token"));
    println!("  Fee:        {} {}", field("fee_amount"), field("payment_token"));
    println!("  Total:      {} {}", field("total_payment"), field("payment_token"));
    println!();
    println!("  Value:      $ {}", field("usd_value"));
    println!("  Total:      $ {}", field("usd_total"));
    println!();

    if quote["submit_enabled"].as_bool().unwrap_or(false) {
        println!("Prices resolved; swap can be submitted.");
    } else {
        println!("Prices still loading or unavailable; swap is disabled.");
    }
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
