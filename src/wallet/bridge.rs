//! Wallet session owner
//!
//! Holds one provider per chain. Connecting a chain tears down the other
//! chain's session first, so at most one session is live. The active chain is
//! recomputed after every connect/disconnect and published on a watch
//! channel for display components.

use std::sync::Arc;
use tokio::sync::watch;

use super::{Chain, ConnectionState, WalletError, WalletProvider, WalletSession};

/// Active chain derived from provider connection flags.
///
/// When both report connected, Solana wins.
pub fn derive_active_chain(icp_connected: bool, sol_connected: bool) -> Option<Chain> {
    if sol_connected {
        Some(Chain::SolDev)
    } else if icp_connected {
        Some(Chain::Icp)
    } else {
        None
    }
}

pub struct WalletBridge {
    icp: Arc<dyn WalletProvider>,
    sol: Arc<dyn WalletProvider>,
    active: watch::Sender<Option<Chain>>,
}

impl WalletBridge {
    pub fn new(icp: Arc<dyn WalletProvider>, sol: Arc<dyn WalletProvider>) -> Self {
        let (active, _) = watch::channel(None);
        Self { icp, sol, active }
    }

    pub fn provider(&self, chain: Chain) -> &Arc<dyn WalletProvider> {
        match chain {
            Chain::Icp => &self.icp,
            Chain::SolDev => &self.sol,
        }
    }

    /// Observe active-chain changes
    pub fn subscribe(&self) -> watch::Receiver<Option<Chain>> {
        self.active.subscribe()
    }

    pub fn active_chain(&self) -> Option<Chain> {
        *self.active.borrow()
    }

    /// Connect `chain`, tearing down the other chain's session first
    pub async fn connect(&self, chain: Chain) -> Result<WalletSession, WalletError> {
        let other = self.provider(chain.other());
        if other.connection_state().await != ConnectionState::Disconnected {
            tracing::info!(from = %chain.other(), to = %chain, "Switching wallet chain");
            if let Err(e) = other.disconnect().await {
                self.refresh().await;
                return Err(e);
            }
        }

        let connected = self.provider(chain).connect().await;
        self.refresh().await;

        let address = connected?;
        Ok(WalletSession {
            chain,
            address,
            state: ConnectionState::Connected,
        })
    }

    /// Disconnect every connected provider
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        let mut first_error = None;

        for provider in [&self.icp, &self.sol] {
            if provider.is_connected().await {
                if let Err(e) = provider.disconnect().await {
                    tracing::warn!(chain = %provider.chain(), error = %e, "Wallet disconnect failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        self.refresh().await;

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Recompute the active chain from provider state and publish it if it
    /// changed
    pub async fn refresh(&self) -> Option<Chain> {
        let chain = derive_active_chain(self.icp.is_connected().await, self.sol.is_connected().await);

        let changed = self.active.send_if_modified(|current| {
            if *current == chain {
                false
            } else {
                *current = chain;
                true
            }
        });

        if changed {
            tracing::debug!(active_chain = ?chain, "Active chain changed");
        }

        chain
    }

    /// Session of the active chain
    pub async fn session(&self) -> Option<WalletSession> {
        let chain = self.active_chain()?;
        let provider = self.provider(chain);
        let address = provider.current_address().await?;

        Some(WalletSession {
            chain,
            address,
            state: provider.connection_state().await,
        })
    }
}
