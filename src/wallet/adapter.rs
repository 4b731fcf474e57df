//! Multi-adapter Solana wallet
//!
//! Wraps the standard wallet-adapter selector: a list of known wallets with
//! readiness, `select(name)`, `disconnect()` and a `connected` flag.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{Chain, ConnectionState, WalletError, WalletProvider};

/// Readiness reported by the adapter for each wallet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReadyState {
    Installed,
    Loadable,
    NotDetected,
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletDescriptor {
    pub name: String,
    pub ready_state: ReadyState,
}

/// The adapter selector's interface
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn wallets(&self) -> Vec<WalletDescriptor>;

    async fn select(&self, name: &str) -> Result<(), WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    fn connected(&self) -> bool;

    /// Base58 public key of the connected wallet
    fn public_key(&self) -> Option<String>;
}

/// Solana devnet wallet backed by a [`WalletAdapter`]
pub struct AdapterWallet {
    adapter: Arc<dyn WalletAdapter>,
    preferred: Option<String>,
    connecting: AtomicBool,
}

impl AdapterWallet {
    pub fn new(adapter: Arc<dyn WalletAdapter>, preferred: Option<String>) -> Self {
        Self {
            adapter,
            preferred,
            connecting: AtomicBool::new(false),
        }
    }

    pub fn installed_wallets(&self) -> Vec<WalletDescriptor> {
        self.adapter
            .wallets()
            .into_iter()
            .filter(|w| w.ready_state == ReadyState::Installed)
            .collect()
    }

    /// Preferred wallet if installed, otherwise the first installed one
    fn pick_wallet(&self) -> Result<String, WalletError> {
        let installed = self.installed_wallets();
        if installed.is_empty() {
            return Err(WalletError::NoWalletInstalled);
        }

        if let Some(preferred) = &self.preferred {
            if installed.iter().any(|w| &w.name == preferred) {
                return Ok(preferred.clone());
            }
            tracing::debug!(wallet = %preferred, "Preferred wallet not installed");
        }

        Ok(installed[0].name.clone())
    }
}

#[async_trait]
impl WalletProvider for AdapterWallet {
    fn chain(&self) -> Chain {
        Chain::SolDev
    }

    async fn connect(&self) -> Result<String, WalletError> {
        let name = self.pick_wallet()?;

        self.connecting.store(true, Ordering::SeqCst);
        let selected = self.adapter.select(&name).await;
        self.connecting.store(false, Ordering::SeqCst);

        if let Err(e) = selected {
            tracing::warn!(chain = %Chain::SolDev, wallet = %name, error = %e, "Wallet selection failed");
            return Err(e);
        }

        if !self.adapter.connected() {
            return Err(WalletError::NotConnected);
        }

        let address = self.adapter.public_key().ok_or(WalletError::NotConnected)?;
        tracing::info!(chain = %Chain::SolDev, wallet = %name, address = %address, "Wallet connected");
        Ok(address)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.adapter.disconnect().await?;
        tracing::info!(chain = %Chain::SolDev, "Wallet disconnected");
        Ok(())
    }

    async fn current_address(&self) -> Option<String> {
        if self.adapter.connected() {
            self.adapter.public_key()
        } else {
            None
        }
    }

    async fn connection_state(&self) -> ConnectionState {
        if self.adapter.connected() {
            ConnectionState::Connected
        } else if self.connecting.load(Ordering::SeqCst) {
            ConnectionState::Connecting
        } else {
            ConnectionState::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeAdapter, SOL_ADDRESS};

    #[tokio::test]
    async fn test_connect_picks_preferred_installed_wallet() {
        let adapter = Arc::new(FakeAdapter::new(&[
            ("Phantom", ReadyState::Installed),
            ("Solflare", ReadyState::Installed),
        ]));
        let wallet = AdapterWallet::new(adapter.clone(), Some("Solflare".to_string()));

        let address = wallet.connect().await.unwrap();
        assert_eq!(address, SOL_ADDRESS);
        assert_eq!(adapter.selected().as_deref(), Some("Solflare"));
        assert_eq!(wallet.connection_state().await, ConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_connect_falls_back_to_first_installed() {
        let adapter = Arc::new(FakeAdapter::new(&[
            ("Backpack", ReadyState::NotDetected),
            ("Phantom", ReadyState::Installed),
        ]));
        let wallet = AdapterWallet::new(adapter.clone(), Some("Backpack".to_string()));

        wallet.connect().await.unwrap();
        assert_eq!(adapter.selected().as_deref(), Some("Phantom"));
    }

    #[tokio::test]
    async fn test_connect_without_installed_wallet() {
        let adapter = Arc::new(FakeAdapter::new(&[("Phantom", ReadyState::Loadable)]));
        let wallet = AdapterWallet::new(adapter, None);

        let err = wallet.connect().await.unwrap_err();
        assert_eq!(err, WalletError::NoWalletInstalled);
        assert_eq!(err.to_string(), "You'll need a wallet on Solana to continue");
    }

    #[tokio::test]
    async fn test_disconnect() {
        let adapter = Arc::new(FakeAdapter::new(&[("Phantom", ReadyState::Installed)]));
        let wallet = AdapterWallet::new(adapter, None);

        wallet.connect().await.unwrap();
        wallet.disconnect().await.unwrap();
        assert!(!wallet.is_connected().await);
        assert!(wallet.current_address().await.is_none());
    }
}
