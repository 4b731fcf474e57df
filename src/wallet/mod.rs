//! Wallet Bridge
//!
//! Connect/disconnect/address access for the two supported chains behind a
//! single capability trait:
//!
//! - [`ExtensionWallet`]: ICP, through an extension-injected provider that
//!   also creates canister actors
//! - [`AdapterWallet`]: Solana devnet, through a multi-wallet adapter
//!
//! [`WalletBridge`] owns both providers, enforces "one active chain" and
//! publishes the derived active chain on a watch channel.

mod adapter;
mod bridge;
mod extension;

pub use adapter::{AdapterWallet, ReadyState, WalletAdapter, WalletDescriptor};
pub use bridge::{derive_active_chain, WalletBridge};
pub use extension::{ExtensionHost, ExtensionWallet};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Supported chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Icp,
    SolDev,
}

impl Chain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::Icp => "icp",
            Chain::SolDev => "sol_dev",
        }
    }

    /// The other supported chain
    pub fn other(&self) -> Chain {
        match self {
            Chain::Icp => Chain::SolDev,
            Chain::SolDev => Chain::Icp,
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection lifecycle of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// The active wallet session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    pub chain: Chain,
    pub address: String,
    pub state: ConnectionState,
}

/// Capability set shared by every wallet provider
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Chain this provider connects to
    fn chain(&self) -> Chain;

    /// Connect and return the wallet address
    async fn connect(&self) -> Result<String, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    /// Address of the connected wallet, if any
    async fn current_address(&self) -> Option<String>;

    async fn connection_state(&self) -> ConnectionState;

    async fn is_connected(&self) -> bool {
        self.connection_state().await == ConnectionState::Connected
    }
}

/// Errors surfaced by wallet providers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WalletError {
    #[error("Connection request was rejected")]
    Rejected,

    #[error("You'll need a wallet on Solana to continue")]
    NoWalletInstalled,

    #[error("Wallet not found: {0}")]
    UnknownWallet(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet provider error: {0}")]
    Provider(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_names() {
        assert_eq!(Chain::Icp.as_str(), "icp");
        assert_eq!(Chain::SolDev.to_string(), "sol_dev");
        assert_eq!(Chain::Icp.other(), Chain::SolDev);
        assert_eq!(
            serde_json::to_string(&Chain::SolDev).unwrap(),
            "\"sol_dev\""
        );
    }
}
