//! Extension-injected ICP wallet
//!
//! Wraps the browser extension's provider object. Besides connecting, the
//! host creates the canister actors the trading flow calls through.

use async_trait::async_trait;
use candid::Principal;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Chain, ConnectionState, WalletError, WalletProvider};
use crate::ledger::{LiquidityHub, SwapCanister, TokenLedger};

/// The extension's provider interface
#[async_trait]
pub trait ExtensionHost: Send + Sync {
    /// Ask the user to connect, allowing calls to `whitelist`.
    /// Returns false when the user declines.
    async fn request_connect(&self, whitelist: &[Principal]) -> Result<bool, WalletError>;

    /// Principal of the connected identity
    async fn principal(&self) -> Result<Option<Principal>, WalletError>;

    async fn disconnect(&self) -> Result<(), WalletError>;

    async fn create_ledger(&self, canister: Principal)
        -> Result<Arc<dyn TokenLedger>, WalletError>;

    async fn create_swap(&self, canister: Principal)
        -> Result<Arc<dyn SwapCanister>, WalletError>;

    async fn create_liquidity_hub(
        &self,
        canister: Principal,
    ) -> Result<Arc<dyn LiquidityHub>, WalletError>;
}

#[derive(Debug, Default)]
struct ExtensionState {
    connection: ConnectionState,
    principal: Option<Principal>,
}

/// ICP wallet backed by an [`ExtensionHost`]
pub struct ExtensionWallet {
    host: Arc<dyn ExtensionHost>,
    whitelist: Vec<Principal>,
    state: RwLock<ExtensionState>,
}

impl ExtensionWallet {
    pub fn new(host: Arc<dyn ExtensionHost>, whitelist: Vec<Principal>) -> Self {
        Self {
            host,
            whitelist,
            state: RwLock::new(ExtensionState::default()),
        }
    }

    /// Underlying host, for actor creation
    pub fn host(&self) -> Arc<dyn ExtensionHost> {
        Arc::clone(&self.host)
    }

    pub async fn principal(&self) -> Option<Principal> {
        self.state.read().await.principal
    }

    async fn reset(&self) {
        let mut state = self.state.write().await;
        state.connection = ConnectionState::Disconnected;
        state.principal = None;
    }
}

#[async_trait]
impl WalletProvider for ExtensionWallet {
    fn chain(&self) -> Chain {
        Chain::Icp
    }

    async fn connect(&self) -> Result<String, WalletError> {
        self.state.write().await.connection = ConnectionState::Connecting;

        let allowed = match self.host.request_connect(&self.whitelist).await {
            Ok(allowed) => allowed,
            Err(e) => {
                self.reset().await;
                tracing::warn!(chain = %Chain::Icp, error = %e, "Wallet connection failed");
                return Err(e);
            }
        };

        if !allowed {
            self.reset().await;
            tracing::info!(chain = %Chain::Icp, "Wallet connection declined");
            return Err(WalletError::Rejected);
        }

        match self.host.principal().await {
            Ok(Some(principal)) => {
                let mut state = self.state.write().await;
                state.connection = ConnectionState::Connected;
                state.principal = Some(principal);

                tracing::info!(chain = %Chain::Icp, address = %principal, "Wallet connected");
                Ok(principal.to_text())
            }
            Ok(None) => {
                self.reset().await;
                Err(WalletError::NotConnected)
            }
            Err(e) => {
                self.reset().await;
                Err(e)
            }
        }
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.host.disconnect().await?;
        self.reset().await;

        tracing::info!(chain = %Chain::Icp, "Wallet disconnected");
        Ok(())
    }

    async fn current_address(&self) -> Option<String> {
        let state = self.state.read().await;
        match state.connection {
            ConnectionState::Connected => state.principal.map(|p| p.to_text()),
            _ => None,
        }
    }

    async fn connection_state(&self) -> ConnectionState {
        self.state.read().await.connection
    }
}
