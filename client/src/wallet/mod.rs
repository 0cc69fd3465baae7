//! The injected wallet, seen as a capability interface.
//!
//! Nothing here knows how a wallet is implemented. A provider can prompt a
//! human, can fail, and eventually resolves or rejects; that is all the rest
//! of the crate relies on.

use std::{fmt, sync::Arc};

use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::{config::NativeCurrency, utils::error::ErrorKind, Error};

mod session;

pub use session::{SessionChange, SessionState, WalletSession};

/// Error codes reported by wallets, both the EIP-1193 numeric ones and the
/// named codes signing libraries wrap them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderErrorCode {
    /// 4001
    UserRejectedRequest,
    /// 4902
    UnrecognizedChain,
    /// -32000
    InsufficientFundsRpc,
    /// -32603
    InternalRpc,
    Other(i64),
    ActionRejected,
    InsufficientFunds,
    NetworkError,
    InvalidArgument,
    Unknown,
}

impl ProviderErrorCode {
    pub fn from_rpc(code: i64) -> Self {
        match code {
            4001 => Self::UserRejectedRequest,
            4902 => Self::UnrecognizedChain,
            -32000 => Self::InsufficientFundsRpc,
            -32603 => Self::InternalRpc,
            other => Self::Other(other),
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "ACTION_REJECTED" => Self::ActionRejected,
            "INSUFFICIENT_FUNDS" => Self::InsufficientFunds,
            "NETWORK_ERROR" => Self::NetworkError,
            "INVALID_ARGUMENT" => Self::InvalidArgument,
            _ => Self::Unknown,
        }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::UserRejectedRequest | Self::ActionRejected)
    }
}

impl fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserRejectedRequest => f.write_str("4001"),
            Self::UnrecognizedChain => f.write_str("4902"),
            Self::InsufficientFundsRpc => f.write_str("-32000"),
            Self::InternalRpc => f.write_str("-32603"),
            Self::Other(code) => write!(f, "{code}"),
            Self::ActionRejected => f.write_str("ACTION_REJECTED"),
            Self::InsufficientFunds => f.write_str("INSUFFICIENT_FUNDS"),
            Self::NetworkError => f.write_str("NETWORK_ERROR"),
            Self::InvalidArgument => f.write_str("INVALID_ARGUMENT"),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: ProviderErrorCode,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn rejected() -> Self {
        Self::new(ProviderErrorCode::UserRejectedRequest, "User rejected the request.")
    }

    /// Maps a failure raised while submitting a donation onto the taxonomy.
    pub fn classify(&self, network_name: &str) -> Error {
        use ProviderErrorCode::*;

        let (kind, message) = match self.code {
            UserRejectedRequest | ActionRejected => (
                ErrorKind::UserRejected,
                "Transaction was cancelled by user".to_owned(),
            ),
            InsufficientFundsRpc | InsufficientFunds => (
                ErrorKind::InsufficientFunds,
                "Insufficient funds for transaction and gas fees".to_owned(),
            ),
            InternalRpc | NetworkError => (
                ErrorKind::TransientProviderFault,
                "Network error. Please check your connection and try again".to_owned(),
            ),
            InvalidArgument => (
                ErrorKind::InvalidTransaction,
                "Invalid transaction parameters. Please try again".to_owned(),
            ),
            UnrecognizedChain => (
                ErrorKind::NetworkSwitchFailed,
                format!("Please add {network_name} to your wallet"),
            ),
            Other(_) | Unknown => (
                ErrorKind::TransientProviderFault,
                "Failed to process donation".to_owned(),
            ),
        };

        tracing::debug!("Classified {} as {:?}", self, kind);
        Error::donation(kind, message)
    }
}

/// Notifications pushed by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// Payload of a network registration request (EIP-3085 shape).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParameters {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// A native-currency transfer, value in the smallest unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub chain_id: u64,
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompts the human to authorize accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Already-authorized accounts, never prompts.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Fails with [`ProviderErrorCode::UnrecognizedChain`] when the wallet does
    /// not know the network.
    async fn switch_chain(&self, chain_id_hex: &str) -> Result<(), ProviderError>;

    async fn add_chain(&self, parameters: &AddChainParameters) -> Result<(), ProviderError>;

    /// A signer bound to whatever network is active right now.
    async fn signer(&self) -> Result<Arc<dyn TransactionSigner>, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn address(&self) -> Address;

    async fn send_transaction(&self, request: TransferRequest) -> Result<TxHash, ProviderError>;

    /// Resolves once the transaction is included. May never resolve.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<(), ProviderError>;
}
