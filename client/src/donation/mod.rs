//! Native-currency donations signed by the connected wallet.
//!
//! A submission makes sure the wallet is on the target network, sends one
//! transfer to the fixed recipient, waits for it to be included and only then
//! appends a record to the ledger. Either a full record is appended or
//! nothing is.

use std::{sync::Arc, time::Duration};

use alloy_primitives::{Address, TxHash};
use tracing::{debug, info};

use crate::{
    config::NetworkConfig,
    ledger::{DonationRecord, LedgerStore},
    utils::error::ErrorKind,
    wallet::{
        ProviderError, ProviderErrorCode, TransactionSigner, TransferRequest, WalletProvider,
        WalletSession,
    },
    Config, Error, Result,
};

mod request;

pub use request::{DonationRequest, MAX_CAUSE_LENGTH};

#[derive(Clone, Debug)]
pub struct DonationFlow {
    network: NetworkConfig,
    recipient: Address,
    confirmation_timeout: Option<Duration>,
}

impl DonationFlow {
    pub fn new(
        network: NetworkConfig,
        recipient: Address,
        confirmation_timeout: Option<Duration>,
    ) -> Self {
        Self {
            network,
            recipient,
            confirmation_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.target_network().clone(),
            config.recipient_address()?,
            config.confirmation_timeout(),
        ))
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    /// Checksummed form of the single donation recipient.
    pub fn recipient(&self) -> String {
        self.recipient.to_checksum(None)
    }

    /// Sends `amount` (display units) to the recipient and records it.
    ///
    /// - Fails with `NotConnected` when no account is authorized, without
    ///   calling the wallet
    /// - Fails with `InvalidAmount`, `EmptyCause` or `CauseTooLong` before
    ///   calling the wallet
    /// - Switches (registering first if needed) to the target network,
    ///   failing with `NetworkSwitchFailed`
    /// - Refuses to send when the signer is not the connected account
    /// - Waits for inclusion, bounded by the configured timeout if any
    /// - On success appends a record with `id = ledger length + 1`
    pub async fn submit(
        &self,
        session: &WalletSession,
        ledger: &mut LedgerStore,
        amount: &str,
        cause: &str,
    ) -> Result<DonationRecord> {
        let Some(donor) = session.account() else {
            return Err(Error::donation(
                ErrorKind::NotConnected,
                "Please connect your wallet to make a donation.",
            ));
        };
        let request = DonationRequest::parse(amount, cause, self.network.native_currency.decimals)?;
        let provider = session.provider()?;

        self.ensure_network(provider.as_ref()).await?;

        // A signer taken before a network switch may still be bound to the
        // old chain.
        let signer = provider
            .signer()
            .await
            .map_err(|e| e.classify(&self.network.chain_name))?;
        if signer.address() != donor {
            return Err(Error::donation(
                ErrorKind::InvalidTransaction,
                "The wallet's active account is not the connected one. Please reconnect your wallet.",
            ));
        }

        let tx_hash = self.transfer(signer.as_ref(), donor, &request).await?;
        self.wait_for_confirmation(&signer, tx_hash).await?;

        let tx_hash = format!("0x{}", hex::encode(tx_hash));
        info!(
            "Donation of {} {} confirmed in {}",
            request.amount, self.network.native_currency.symbol, tx_hash
        );

        ledger
            .record_donation(
                &request.amount,
                donor.to_checksum(None),
                request.cause,
                Some(tx_hash),
            )
    }

    async fn ensure_network(&self, provider: &dyn WalletProvider) -> Result<()> {
        let current = provider
            .chain_id()
            .await
            .map_err(|e| e.classify(&self.network.chain_name))?;
        if current == self.network.chain_id {
            return Ok(());
        }

        let chain_id_hex = self.network.chain_id_hex();
        debug!(
            "Wallet is on chain {}, switching to {} ({})",
            current, self.network.chain_name, chain_id_hex
        );

        match provider.switch_chain(&chain_id_hex).await {
            Ok(()) => Ok(()),
            Err(e) if e.code == ProviderErrorCode::UnrecognizedChain => {
                debug!("Wallet does not know {}, registering it", self.network.chain_name);
                provider
                    .add_chain(&self.network.add_chain_parameters())
                    .await
                    .map_err(|e| self.switch_failed(&e))?;
                provider
                    .switch_chain(&chain_id_hex)
                    .await
                    .map_err(|e| self.switch_failed(&e))
            }
            Err(e) => Err(self.switch_failed(&e)),
        }
    }

    async fn transfer(
        &self,
        signer: &dyn TransactionSigner,
        donor: Address,
        request: &DonationRequest,
    ) -> Result<TxHash> {
        let transfer = TransferRequest {
            from: donor,
            to: self.recipient,
            value: request.base_units,
            chain_id: self.network.chain_id,
        };
        debug!(
            "Requesting transfer of {} base units to {}",
            transfer.value,
            self.recipient()
        );

        signer
            .send_transaction(transfer)
            .await
            .map_err(|e| e.classify(&self.network.chain_name))
    }

    async fn wait_for_confirmation(
        &self,
        signer: &Arc<dyn TransactionSigner>,
        tx_hash: TxHash,
    ) -> Result<()> {
        let confirmation = signer.wait_for_confirmation(tx_hash);
        let outcome = match self.confirmation_timeout {
            Some(limit) => tokio::time::timeout(limit, confirmation)
                .await
                .map_err(|_| {
                    Error::donation(
                        ErrorKind::TransientProviderFault,
                        format!(
                            "No confirmation after {limit:?}. Check the explorer before donating again."
                        ),
                    )
                })?,
            None => confirmation.await,
        };

        outcome.map_err(|e| e.classify(&self.network.chain_name))
    }

    fn switch_failed(&self, error: &ProviderError) -> Error {
        let name = &self.network.chain_name;
        let message = match error.code {
            ProviderErrorCode::UnrecognizedChain => format!("Please add {name} to your wallet"),
            ref code if code.is_rejection() => format!("Switching to {name} was cancelled"),
            _ => format!("Could not switch your wallet to {name}: {}", error.message),
        };
        Error::donation(ErrorKind::NetworkSwitchFailed, message)
    }
}
