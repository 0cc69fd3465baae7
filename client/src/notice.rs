//! Human-readable notices raised by the tracker.
//!
//! These are the only user-facing output of a failed operation; nothing is
//! retried automatically, the human decides what to do next.

use std::fmt;

use crate::utils::short_address;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Info,
    Destructive,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Info,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    pub fn connected(account: &str) -> Self {
        Self::info(
            "Wallet Connected",
            format!("Connected to {}", short_address(account)),
        )
    }

    pub fn provider_missing() -> Self {
        Self::destructive(
            "Wallet Not Found",
            "No wallet found. Please install MetaMask or another browser wallet to donate.",
        )
    }

    /// The stored history was unreadable and the ledger started empty.
    pub fn ledger_recovered(reason: &str) -> Self {
        Self::destructive(
            "Ledger Reset",
            format!("Stored donation history could not be read and was reset: {reason}"),
        )
    }

    pub fn disconnected() -> Self {
        Self::info("Wallet Disconnected", "Your wallet has been disconnected.")
    }

    pub fn network_changed() -> Self {
        Self::info(
            "Network Changed",
            "Your wallet switched networks, donation history was reloaded.",
        )
    }

    pub fn donation_succeeded(amount: &str, symbol: &str, network_name: &str) -> Self {
        Self::info(
            "Donation Successful!",
            format!("Thank you for donating {amount} {symbol} on {network_name}!"),
        )
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "{}: {}", self.title, self.description),
            Severity::Destructive => write!(f, "[!] {}: {}", self.title, self.description),
        }
    }
}
