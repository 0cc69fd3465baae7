use std::sync::Arc;

use alloy_primitives::Address;
use tracing::{info, warn};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::{
    database::KeyValueStore,
    donation::DonationFlow,
    ledger::{DonationRecord, LedgerStore},
    notice::Notice,
    render::LedgerView,
    utils::error::ErrorKind,
    wallet::{SessionChange, WalletProvider, WalletSession},
    Config, Error, Result,
};

/// Installs the global `tracing` subscriber using `config.log` as filter.
pub fn init_logging(config: &Config) -> Result<()> {
    let filter_layer = match EnvFilter::try_new(&config.log) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!(
                "It looks like your log config is invalid. The following error occurred while parsing it: {e}"
            );
            EnvFilter::new("warn")
        }
    };

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|_| Error::bad_config("A logger is already installed."))
}

/// Application root: owns the session, the ledger and the submission flow.
///
/// Every operation leaves a [`Notice`] behind for the human and returns
/// control in an interactive state; nothing here is fatal.
pub struct DonationTracker {
    config: Config,
    session: WalletSession,
    ledger: LedgerStore,
    flow: DonationFlow,
    notices: Vec<Notice>,
}

impl DonationTracker {
    pub fn new(
        config: Config,
        provider: Option<Arc<dyn WalletProvider>>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        let flow = DonationFlow::from_config(&config)?;
        let ledger = LedgerStore::load(store, config.storage_key.clone())?;

        let mut notices = Vec::new();
        if let Some(e) = ledger.recovered_from() {
            notices.push(e.to_notice());
        }

        info!(
            "Donating to {} on {} ({} donations on record)",
            flow.recipient(),
            flow.network().chain_name,
            ledger.len()
        );

        let mut session = WalletSession::new(provider);
        session.watch();

        Ok(Self {
            config,
            session,
            ledger,
            flow,
            notices,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn ledger(&self) -> &LedgerStore {
        &self.ledger
    }

    pub fn account(&self) -> Option<Address> {
        self.session.account()
    }

    /// Picks up an account authorized in an earlier visit, without prompting.
    pub async fn restore_session(&mut self) -> Option<Address> {
        match self.session.current_account().await {
            Ok(account) => account,
            Err(e) => {
                warn!("Error checking connection: {}", e);
                None
            }
        }
    }

    pub async fn connect(&mut self) -> Result<Address> {
        match self.session.connect().await {
            Ok(account) => {
                self.notices.push(Notice::connected(&account.to_checksum(None)));
                Ok(account)
            }
            Err(e) => {
                let notice = e.to_notice();
                let title = if e.kind() == ErrorKind::ProviderUnavailable {
                    notice.title
                } else {
                    "Connection Failed".to_owned()
                };
                self.notices.push(Notice::destructive(title, notice.description));
                Err(e)
            }
        }
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
        self.notices.push(Notice::disconnected());
    }

    /// Runs one submission. The tracker stays mutably borrowed until the
    /// wallet resolves, so a second donation cannot start in the meantime.
    pub async fn donate(&mut self, amount: &str, cause: &str) -> Result<DonationRecord> {
        let outcome = self
            .flow
            .submit(&self.session, &mut self.ledger, amount, cause)
            .await;

        match &outcome {
            Ok(record) => {
                let network = self.flow.network();
                self.notices.push(Notice::donation_succeeded(
                    &record.amount,
                    &network.native_currency.symbol,
                    &network.chain_name,
                ));
            }
            Err(e) => self.notices.push(e.to_notice()),
        }

        outcome
    }

    /// Waits for the next wallet notification and applies it.
    ///
    /// A network change rebuilds client state: the session is dropped, the
    /// ledger is read back from storage and the previous account is looked
    /// up again silently.
    pub async fn process_next_event(&mut self) -> Option<SessionChange> {
        let change = self.session.next_change().await?;

        match change {
            SessionChange::Disconnected => self.notices.push(Notice::disconnected()),
            SessionChange::AccountChanged(account) => {
                self.notices.push(Notice::connected(&account.to_checksum(None)));
            }
            SessionChange::ReloadRequired(_) => {
                self.session.disconnect();
                if let Err(e) = self.ledger.reload() {
                    warn!("Could not reload the ledger: {}", e);
                    self.notices.push(e.to_notice());
                } else if let Some(e) = self.ledger.recovered_from() {
                    self.notices.push(e.to_notice());
                }
                self.restore_session().await;
                self.notices.push(Notice::network_changed());
            }
        }

        Some(change)
    }

    pub fn clear_history(&mut self) -> Result<()> {
        self.ledger.clear()
    }

    pub fn view(&self) -> LedgerView {
        LedgerView::new(&self.ledger, self.flow.network())
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}
