use std::io;

use thiserror::Error;
use tracing::{error, warn};

use crate::notice::Notice;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The fixed set of failures a human can see.
///
/// Every provider-originated failure is mapped onto the nearest entry; anything
/// unrecognised ends up as [`ErrorKind::TransientProviderFault`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No wallet provider is injected.
    ProviderUnavailable,
    /// A donation was attempted with no authorized account.
    NotConnected,
    /// The amount is non-numeric, zero, negative or too precise for the currency.
    InvalidAmount,
    EmptyCause,
    CauseTooLong,
    /// The human declined a provider prompt.
    UserRejected,
    InsufficientFunds,
    /// The provider could not switch to or register the target network.
    NetworkSwitchFailed,
    TransientProviderFault,
    /// The provider refused the transaction parameters.
    InvalidTransaction,
    /// The ledger could not be written to its slot.
    StorageFailure,
    /// The persisted ledger could not be parsed.
    CorruptLedger,
    Configuration,
}

impl ErrorKind {
    /// Notice title shown for this kind of failure.
    pub fn title(self) -> &'static str {
        match self {
            Self::ProviderUnavailable => "Wallet Not Found",
            Self::NotConnected => "Wallet Not Connected",
            Self::InvalidAmount => "Invalid Amount",
            Self::EmptyCause => "Missing Cause",
            Self::CauseTooLong => "Cause Too Long",
            Self::UserRejected
            | Self::InsufficientFunds
            | Self::NetworkSwitchFailed
            | Self::TransientProviderFault
            | Self::InvalidTransaction => "Donation Failed",
            Self::StorageFailure => "Ledger Not Saved",
            Self::CorruptLedger => "Ledger Reset",
            Self::Configuration => "Configuration Error",
        }
    }

    /// True for failures detected locally, before any provider call.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            Self::NotConnected | Self::InvalidAmount | Self::EmptyCause | Self::CauseTooLong
        )
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("{1}")]
    Donation(ErrorKind, String),
    #[error("There was a problem with the ledger slot: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
    #[error("Could not serialize the ledger: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
    #[error("Stored donation history could not be read and was reset: {0}")]
    CorruptLedger(String),
    #[error("{0}")]
    BadConfig(&'static str),
    #[error("Could not load the configuration: {source}")]
    Figment {
        #[from]
        source: figment::Error,
    },
}

impl Error {
    pub fn donation(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        if kind.is_validation() {
            warn!("Rejected donation input ({:?}): {}", kind, message);
        } else {
            warn!("{:?}: {}", kind, message);
        }
        Self::Donation(kind, message)
    }

    pub fn storage(source: impl std::fmt::Display) -> Self {
        error!("Failed to persist the ledger: {}", source);
        Self::Donation(
            ErrorKind::StorageFailure,
            format!("Your donation went through but could not be saved locally: {source}"),
        )
    }

    pub fn bad_config(message: &'static str) -> Self {
        error!("BadConfig: {}", message);
        Self::BadConfig(message)
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Donation(kind, _) => *kind,
            Self::Io { .. } | Self::Json { .. } => ErrorKind::StorageFailure,
            Self::CorruptLedger(_) => ErrorKind::CorruptLedger,
            Self::BadConfig(_) | Self::Figment { .. } => ErrorKind::Configuration,
        }
    }

    pub fn to_notice(&self) -> Notice {
        match self {
            Self::CorruptLedger(reason) => Notice::ledger_recovered(reason),
            _ if self.kind() == ErrorKind::ProviderUnavailable => Notice::provider_missing(),
            _ => Notice::destructive(self.kind().title(), self.to_string()),
        }
    }
}
