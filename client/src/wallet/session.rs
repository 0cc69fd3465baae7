use std::sync::Arc;

use alloy_primitives::Address;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use super::{ProviderError, ProviderEvent, WalletProvider};
use crate::{utils::error::ErrorKind, Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected(Address),
}

/// What a provider notification meant for the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionChange {
    Disconnected,
    AccountChanged(Address),
    /// The wallet moved to another network. Client state should be rebuilt
    /// from scratch rather than reconciled.
    ReloadRequired(u64),
}

/// Tracks which account, if any, the wallet has authorized.
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    state: SessionState,
    events: Option<broadcast::Receiver<ProviderEvent>>,
}

impl WalletSession {
    /// `None` means no wallet is injected at all.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            state: SessionState::Disconnected,
            events: None,
        }
    }

    pub fn provider(&self) -> Result<&Arc<dyn WalletProvider>> {
        self.provider.as_ref().ok_or_else(|| {
            Error::donation(
                ErrorKind::ProviderUnavailable,
                "No wallet found. Please install MetaMask or another browser wallet to donate.",
            )
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn account(&self) -> Option<Address> {
        match self.state {
            SessionState::Connected(account) => Some(account),
            _ => None,
        }
    }

    pub fn is_observing(&self) -> bool {
        self.events.is_some()
    }

    /// Asks the wallet to authorize an account.
    ///
    /// - Fails with `ProviderUnavailable` when no wallet is injected
    /// - Fails with `UserRejected` when the human declines the prompt
    /// - On success the first account becomes active and account/network
    ///   notifications start being observed
    pub async fn connect(&mut self) -> Result<Address> {
        let provider = Arc::clone(self.provider()?);

        self.state = SessionState::Connecting;
        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                self.state = SessionState::Disconnected;
                return Err(connect_error(&e));
            }
        };

        let Some(&account) = accounts.first() else {
            self.state = SessionState::Disconnected;
            return Err(Error::donation(
                ErrorKind::TransientProviderFault,
                "The wallet did not authorize any account.",
            ));
        };

        self.state = SessionState::Connected(account);
        self.watch();
        info!("Wallet connected: {}", account.to_checksum(None));

        Ok(account)
    }

    /// Silent check for an account authorized in an earlier visit.
    ///
    /// Never prompts. Having no wallet at all is not an error here.
    pub async fn current_account(&mut self) -> Result<Option<Address>> {
        let Some(provider) = self.provider.clone() else {
            return Ok(None);
        };

        let accounts = provider.accounts().await.map_err(|e| {
            Error::donation(
                ErrorKind::TransientProviderFault,
                format!("Could not check the wallet connection: {}", e.message),
            )
        })?;

        let account = accounts.first().copied();
        if let Some(account) = account {
            debug!("Restored wallet session for {}", account.to_checksum(None));
            self.state = SessionState::Connected(account);
            self.watch();
        }

        Ok(account)
    }

    /// Forgets the account locally. The wallet keeps its authorization and
    /// notifications keep being observed, so a later account change reconnects.
    pub fn disconnect(&mut self) {
        if let SessionState::Connected(account) = self.state {
            info!("Wallet disconnected: {}", account.to_checksum(None));
        }
        self.state = SessionState::Disconnected;
    }

    pub fn handle_event(&mut self, event: ProviderEvent) -> Option<SessionChange> {
        match event {
            ProviderEvent::AccountsChanged(accounts) => match accounts.first() {
                None => {
                    let was_connected = matches!(self.state, SessionState::Connected(_));
                    self.state = SessionState::Disconnected;
                    if was_connected {
                        info!("Wallet reported no accounts, session disconnected");
                    }
                    was_connected.then_some(SessionChange::Disconnected)
                }
                Some(&account) => {
                    if self.state == SessionState::Connected(account) {
                        return None;
                    }
                    info!("Active account changed to {}", account.to_checksum(None));
                    self.state = SessionState::Connected(account);
                    Some(SessionChange::AccountChanged(account))
                }
            },
            ProviderEvent::ChainChanged(chain_id) => {
                info!("Wallet switched to chain {}, reload required", chain_id);
                Some(SessionChange::ReloadRequired(chain_id))
            }
        }
    }

    /// Waits for the next notification that changes the session.
    ///
    /// Returns `None` when nothing is being observed or the provider went away.
    pub async fn next_change(&mut self) -> Option<SessionChange> {
        loop {
            let received = self.events.as_mut()?.recv().await;
            match received {
                Ok(event) => {
                    if let Some(change) = self.handle_event(event) {
                        return Some(change);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {} wallet notifications", skipped);
                }
                Err(RecvError::Closed) => {
                    self.events = None;
                    return None;
                }
            }
        }
    }

    /// Starts observing account and network notifications, once.
    pub fn watch(&mut self) {
        if self.events.is_some() {
            return;
        }
        if let Some(provider) = &self.provider {
            self.events = Some(provider.subscribe());
        }
    }
}

fn connect_error(error: &ProviderError) -> Error {
    if error.code.is_rejection() {
        Error::donation(ErrorKind::UserRejected, "Connection request was cancelled")
    } else if error.message.is_empty() {
        Error::donation(ErrorKind::TransientProviderFault, "Failed to connect wallet")
    } else {
        Error::donation(ErrorKind::TransientProviderFault, error.message.clone())
    }
}
