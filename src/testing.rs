//! In-memory fakes for wallet providers, canister actors and upstream HTTP

use async_trait::async_trait;
use candid::{Nat, Principal};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

use crate::ledger::{
    ApproveArgs, ApproveResult, ExchangeResult, LedgerError, LiquidityHub, StakeArgs, SwapArgs,
    SwapCanister, TokenLedger,
};
use crate::pricing::{Upstream, UpstreamError};
use crate::wallet::{
    Chain, ConnectionState, ExtensionHost, ReadyState, WalletAdapter, WalletDescriptor,
    WalletError, WalletProvider,
};

pub const USER_PRINCIPAL: &str = "rrkah-fqaaa-aaaaa-aaaaq-cai";
pub const SOL_ADDRESS: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

type EventLog = Arc<Mutex<Vec<&'static str>>>;

/// Parks `icrc2_approve` until released
#[derive(Clone, Default)]
pub struct CallGate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

pub struct FakeLedger {
    result: Mutex<Result<ApproveResult, LedgerError>>,
    calls: Mutex<Vec<ApproveArgs>>,
    gate: Mutex<Option<CallGate>>,
    events: EventLog,
}

impl FakeLedger {
    fn new(events: EventLog) -> Self {
        Self {
            result: Mutex::new(Ok(ApproveResult::Ok(Nat::from(1u64)))),
            calls: Mutex::new(Vec::new()),
            gate: Mutex::new(None),
            events,
        }
    }

    pub fn set_result(&self, result: ApproveResult) {
        *self.result.lock().unwrap() = Ok(result);
    }

    pub fn fail_with(&self, error: LedgerError) {
        *self.result.lock().unwrap() = Err(error);
    }

    pub fn calls(&self) -> Vec<ApproveArgs> {
        self.calls.lock().unwrap().clone()
    }

    /// Block every later approval until `release` is notified
    pub fn hold(&self) -> CallGate {
        let gate = CallGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }
}

#[async_trait]
impl TokenLedger for FakeLedger {
    async fn icrc2_approve(&self, args: ApproveArgs) -> Result<ApproveResult, LedgerError> {
        self.events.lock().unwrap().push("icrc2_approve");
        self.calls.lock().unwrap().push(args);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.result.lock().unwrap().clone()
    }
}

pub struct FakeSwap {
    result: Mutex<ExchangeResult>,
    calls: Mutex<Vec<SwapArgs>>,
    events: EventLog,
}

impl FakeSwap {
    fn new(events: EventLog) -> Self {
        Self {
            result: Mutex::new(ExchangeResult::Ok(Nat::from(1u64))),
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn set_result(&self, result: ExchangeResult) {
        *self.result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<SwapArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SwapCanister for FakeSwap {
    async fn te_swap(&self, args: SwapArgs) -> Result<ExchangeResult, LedgerError> {
        self.events.lock().unwrap().push("te_swap");
        self.calls.lock().unwrap().push(args);
        Ok(self.result.lock().unwrap().clone())
    }
}

pub struct FakeHub {
    result: Mutex<ExchangeResult>,
    calls: Mutex<Vec<StakeArgs>>,
    events: EventLog,
}

impl FakeHub {
    fn new(events: EventLog) -> Self {
        Self {
            result: Mutex::new(ExchangeResult::Ok(Nat::from(1u64))),
            calls: Mutex::new(Vec::new()),
            events,
        }
    }

    pub fn set_result(&self, result: ExchangeResult) {
        *self.result.lock().unwrap() = result;
    }

    pub fn calls(&self) -> Vec<StakeArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LiquidityHub for FakeHub {
    async fn te_slp(&self, args: StakeArgs) -> Result<ExchangeResult, LedgerError> {
        self.events.lock().unwrap().push("te_slp");
        self.calls.lock().unwrap().push(args);
        Ok(self.result.lock().unwrap().clone())
    }
}

/// Extension host that approves connections and hands out fake actors.
/// Canister calls from all actors land in one ordered event log.
pub struct FakeHost {
    declining: AtomicBool,
    whitelists: Mutex<Vec<Vec<Principal>>>,
    events: EventLog,
    ledger: Arc<FakeLedger>,
    swap: Arc<FakeSwap>,
    hub: Arc<FakeHub>,
}

impl FakeHost {
    pub fn new() -> Self {
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        Self {
            declining: AtomicBool::new(false),
            whitelists: Mutex::new(Vec::new()),
            ledger: Arc::new(FakeLedger::new(Arc::clone(&events))),
            swap: Arc::new(FakeSwap::new(Arc::clone(&events))),
            hub: Arc::new(FakeHub::new(Arc::clone(&events))),
            events,
        }
    }

    pub fn declining(self) -> Self {
        self.set_declining(true);
        self
    }

    pub fn set_declining(&self, declining: bool) {
        self.declining.store(declining, Ordering::SeqCst);
    }

    pub fn whitelists(&self) -> Vec<Vec<Principal>> {
        self.whitelists.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn ledger(&self) -> &FakeLedger {
        &self.ledger
    }

    pub fn swap(&self) -> &FakeSwap {
        &self.swap
    }

    pub fn hub(&self) -> &FakeHub {
        &self.hub
    }
}

#[async_trait]
impl ExtensionHost for FakeHost {
    async fn request_connect(&self, whitelist: &[Principal]) -> Result<bool, WalletError> {
        self.whitelists.lock().unwrap().push(whitelist.to_vec());
        Ok(!self.declining.load(Ordering::SeqCst))
    }

    async fn principal(&self) -> Result<Option<Principal>, WalletError> {
        Principal::from_text(USER_PRINCIPAL)
            .map(Some)
            .map_err(|e| WalletError::Provider(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        Ok(())
    }

    async fn create_ledger(&self, _canister: Principal) -> Result<Arc<dyn TokenLedger>, WalletError> {
        Ok(self.ledger.clone())
    }

    async fn create_swap(&self, _canister: Principal) -> Result<Arc<dyn SwapCanister>, WalletError> {
        Ok(self.swap.clone())
    }

    async fn create_liquidity_hub(
        &self,
        _canister: Principal,
    ) -> Result<Arc<dyn LiquidityHub>, WalletError> {
        Ok(self.hub.clone())
    }
}

/// Multi-wallet adapter with a fixed wallet list
pub struct FakeAdapter {
    wallets: Vec<WalletDescriptor>,
    selected: Mutex<Option<String>>,
    connected: AtomicBool,
}

impl FakeAdapter {
    pub fn new(wallets: &[(&str, ReadyState)]) -> Self {
        Self {
            wallets: wallets
                .iter()
                .map(|(name, ready_state)| WalletDescriptor {
                    name: name.to_string(),
                    ready_state: *ready_state,
                })
                .collect(),
            selected: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    pub fn selected(&self) -> Option<String> {
        self.selected.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletAdapter for FakeAdapter {
    fn wallets(&self) -> Vec<WalletDescriptor> {
        self.wallets.clone()
    }

    async fn select(&self, name: &str) -> Result<(), WalletError> {
        if !self.wallets.iter().any(|w| w.name == name) {
            return Err(WalletError::UnknownWallet(name.to_string()));
        }
        *self.selected.lock().unwrap() = Some(name.to_string());
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.connected.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn public_key(&self) -> Option<String> {
        if self.connected() {
            Some(SOL_ADDRESS.to_string())
        } else {
            None
        }
    }
}

/// Generic wallet provider with scripted connect failures
pub struct FakeProvider {
    chain: Chain,
    address: String,
    state: Mutex<ConnectionState>,
    next_connect_error: Mutex<Option<WalletError>>,
    disconnects: AtomicUsize,
}

impl FakeProvider {
    pub fn new(chain: Chain, address: &str) -> Self {
        Self {
            chain,
            address: address.to_string(),
            state: Mutex::new(ConnectionState::Disconnected),
            next_connect_error: Mutex::new(None),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn fail_next_connect(&self, error: WalletError) {
        *self.next_connect_error.lock().unwrap() = Some(error);
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for FakeProvider {
    fn chain(&self) -> Chain {
        self.chain
    }

    async fn connect(&self) -> Result<String, WalletError> {
        if let Some(error) = self.next_connect_error.lock().unwrap().take() {
            return Err(error);
        }
        *self.state.lock().unwrap() = ConnectionState::Connected;
        Ok(self.address.clone())
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = ConnectionState::Disconnected;
        Ok(())
    }

    async fn current_address(&self) -> Option<String> {
        match *self.state.lock().unwrap() {
            ConnectionState::Connected => Some(self.address.clone()),
            _ => None,
        }
    }

    async fn connection_state(&self) -> ConnectionState {
        *self.state.lock().unwrap()
    }
}

/// Upstream serving canned JSON per URL; unknown URLs are unavailable
pub struct FakeUpstream {
    responses: Mutex<HashMap<String, serde_json::Value>>,
    requests: Mutex<Vec<String>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            delay: Mutex::new(None),
        }
    }

    pub fn respond(&self, url: &str, body: serde_json::Value) {
        self.responses.lock().unwrap().insert(url.to_string(), body);
    }

    pub fn fail(&self, url: &str) {
        self.responses.lock().unwrap().remove(url);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Answer every later request only after `delay`
    pub fn stall(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn get_json(&self, url: &str) -> Result<serde_json::Value, UpstreamError> {
        self.requests.lock().unwrap().push(url.to_string());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(UpstreamError::Unavailable)
    }
}
