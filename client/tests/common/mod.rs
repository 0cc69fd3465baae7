//! Scripted wallet used by the integration tests.
//!
//! Every call is logged by its JSON-RPC method name so tests can assert both
//! that the wallet was (or was not) touched and in which order.

#![allow(dead_code)]

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use alloy_primitives::{Address, TxHash};
use async_trait::async_trait;
use donation_tracker::{
    config::NetworkConfig,
    database::MemoryStore,
    wallet::{
        AddChainParameters, ProviderError, ProviderErrorCode, ProviderEvent, TransactionSigner,
        TransferRequest, WalletProvider, WalletSession,
    },
    Config, DonationFlow, LedgerStore,
};
use tokio::sync::broadcast;

pub const BASE_CHAIN_ID: u64 = 8453;
pub const ETHEREUM_CHAIN_ID: u64 = 1;

pub fn donor() -> Address {
    Address::repeat_byte(0x11)
}

pub fn tx_hash() -> TxHash {
    TxHash::repeat_byte(0xab)
}

pub fn tx_hash_string() -> String {
    format!("0x{}", "ab".repeat(32))
}

pub enum Confirmation {
    Confirmed,
    Fails(ProviderError),
    Never,
}

pub struct MockState {
    /// Accounts granted when the human approves a connect prompt.
    pub grantable: Mutex<Vec<Address>>,
    /// Accounts returned by the silent check.
    pub authorized: Mutex<Vec<Address>>,
    pub request_error: Mutex<Option<ProviderError>>,
    pub chain_id_error: Mutex<Option<ProviderError>>,
    pub chain_id: Mutex<u64>,
    pub known_chains: Mutex<Vec<u64>>,
    pub switch_error: Mutex<Option<ProviderError>>,
    pub add_error: Mutex<Option<ProviderError>>,
    pub send_error: Mutex<Option<ProviderError>>,
    /// Account the signer signs with, normally the granted one.
    pub signer_account: Mutex<Address>,
    pub confirmation: Mutex<Confirmation>,
    pub calls: Mutex<Vec<String>>,
    pub sent: Mutex<Vec<TransferRequest>>,
    pub added: Mutex<Vec<AddChainParameters>>,
}

impl MockState {
    fn log(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_owned());
    }
}

pub struct MockProvider {
    pub state: Arc<MockState>,
    events: broadcast::Sender<ProviderEvent>,
}

impl MockProvider {
    /// A wallet holding `donor()`, currently on `chain_id`, that knows
    /// Ethereum mainnet and Base.
    pub fn new(chain_id: u64) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Arc::new(MockState {
                grantable: Mutex::new(vec![donor()]),
                authorized: Mutex::new(Vec::new()),
                request_error: Mutex::new(None),
                chain_id_error: Mutex::new(None),
                chain_id: Mutex::new(chain_id),
                known_chains: Mutex::new(vec![ETHEREUM_CHAIN_ID, BASE_CHAIN_ID]),
                switch_error: Mutex::new(None),
                add_error: Mutex::new(None),
                send_error: Mutex::new(None),
                signer_account: Mutex::new(donor()),
                confirmation: Mutex::new(Confirmation::Confirmed),
                calls: Mutex::new(Vec::new()),
                sent: Mutex::new(Vec::new()),
                added: Mutex::new(Vec::new()),
            }),
            events,
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.state.calls.lock().unwrap().clear();
    }

    pub fn sent(&self) -> Vec<TransferRequest> {
        self.state.sent.lock().unwrap().clone()
    }

    pub fn chain(&self) -> u64 {
        *self.state.chain_id.lock().unwrap()
    }

    pub fn forget_chain(&self, chain_id: u64) {
        self.state
            .known_chains
            .lock()
            .unwrap()
            .retain(|known| *known != chain_id);
    }

    pub fn fail_request(&self, error: ProviderError) {
        *self.state.request_error.lock().unwrap() = Some(error);
    }

    pub fn fail_chain_id(&self, error: ProviderError) {
        *self.state.chain_id_error.lock().unwrap() = Some(error);
    }

    pub fn sign_as(&self, account: Address) {
        *self.state.signer_account.lock().unwrap() = account;
    }

    pub fn fail_switch(&self, error: ProviderError) {
        *self.state.switch_error.lock().unwrap() = Some(error);
    }

    pub fn fail_add(&self, error: ProviderError) {
        *self.state.add_error.lock().unwrap() = Some(error);
    }

    pub fn fail_send(&self, error: ProviderError) {
        *self.state.send_error.lock().unwrap() = Some(error);
    }

    pub fn confirm_with(&self, confirmation: Confirmation) {
        *self.state.confirmation.lock().unwrap() = confirmation;
    }

    pub fn authorize(&self, accounts: Vec<Address>) {
        *self.state.authorized.lock().unwrap() = accounts;
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.events.send(event).expect("someone is subscribed");
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.state.log("eth_requestAccounts");
        if let Some(error) = self.state.request_error.lock().unwrap().clone() {
            return Err(error);
        }
        let granted = self.state.grantable.lock().unwrap().clone();
        *self.state.authorized.lock().unwrap() = granted.clone();
        Ok(granted)
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        self.state.log("eth_accounts");
        Ok(self.state.authorized.lock().unwrap().clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        self.state.log("eth_chainId");
        if let Some(error) = self.state.chain_id_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.chain())
    }

    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError> {
        self.state.log("wallet_switchEthereumChain");
        if let Some(error) = self.state.switch_error.lock().unwrap().clone() {
            return Err(error);
        }

        let chain_id = u64::from_str_radix(chain_id_hex.trim_start_matches("0x"), 16)
            .map_err(|_| ProviderError::new(ProviderErrorCode::InvalidArgument, "bad chain id"))?;
        if !self.state.known_chains.lock().unwrap().contains(&chain_id) {
            return Err(ProviderError::new(
                ProviderErrorCode::UnrecognizedChain,
                "Unrecognized chain ID",
            ));
        }

        *self.state.chain_id.lock().unwrap() = chain_id;
        Ok(())
    }

    async fn add_chain(&self, parameters: &AddChainParameters) -> Result<(), ProviderError> {
        self.state.log("wallet_addEthereumChain");
        if let Some(error) = self.state.add_error.lock().unwrap().clone() {
            return Err(error);
        }

        let chain_id = u64::from_str_radix(parameters.chain_id.trim_start_matches("0x"), 16)
            .map_err(|_| ProviderError::new(ProviderErrorCode::InvalidArgument, "bad chain id"))?;
        self.state.known_chains.lock().unwrap().push(chain_id);
        self.state.added.lock().unwrap().push(parameters.clone());
        Ok(())
    }

    async fn signer(&self) -> Result<Arc<dyn TransactionSigner>, ProviderError> {
        self.state.log("getSigner");
        Ok(Arc::new(MockSigner {
            state: Arc::clone(&self.state),
            bound_chain: self.chain(),
        }))
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

pub struct MockSigner {
    state: Arc<MockState>,
    bound_chain: u64,
}

#[async_trait]
impl TransactionSigner for MockSigner {
    fn address(&self) -> Address {
        *self.state.signer_account.lock().unwrap()
    }

    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash, ProviderError> {
        self.state.log("eth_sendTransaction");
        if let Some(error) = self.state.send_error.lock().unwrap().clone() {
            return Err(error);
        }
        if request.chain_id != self.bound_chain {
            return Err(ProviderError::new(
                ProviderErrorCode::InvalidArgument,
                "signer is bound to another chain",
            ));
        }

        self.state.sent.lock().unwrap().push(request);
        Ok(tx_hash())
    }

    async fn wait_for_confirmation(&self, _tx_hash: TxHash) -> Result<(), ProviderError> {
        self.state.log("wait");
        let outcome = match &*self.state.confirmation.lock().unwrap() {
            Confirmation::Confirmed => Some(Ok(())),
            Confirmation::Fails(error) => Some(Err(error.clone())),
            Confirmation::Never => None,
        };

        match outcome {
            Some(outcome) => outcome,
            None => std::future::pending().await,
        }
    }
}

pub fn flow(timeout: Option<Duration>) -> DonationFlow {
    let recipient = Config::default()
        .recipient_address()
        .expect("default recipient is valid");
    DonationFlow::new(NetworkConfig::base_mainnet(), recipient, timeout)
}

pub fn empty_ledger() -> LedgerStore {
    LedgerStore::load(Arc::new(MemoryStore::new()), "donation-tracker-donations")
        .expect("memory store never fails")
}

/// A session already connected to `donor()`, with the call log cleared.
pub async fn connected(provider: &Arc<MockProvider>) -> WalletSession {
    let mut session = WalletSession::new(Some(provider.clone() as Arc<dyn WalletProvider>));
    session.connect().await.expect("mock wallet grants the account");
    provider.clear_calls();
    session
}
