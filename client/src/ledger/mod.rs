//! The locally persisted donation history.
//!
//! The whole sequence lives in one key-value slot and is rewritten on every
//! change. Newest records come first; order is insertion order, so a clock
//! anomaly cannot reorder the list.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::{
    database::KeyValueStore,
    utils,
    Error, Result,
};

mod record;

pub use record::DonationRecord;

pub struct LedgerStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
    records: Vec<DonationRecord>,
    recovered_from: Option<Error>,
}

impl LedgerStore {
    /// Reads the slot once at startup.
    ///
    /// An absent slot gives an empty ledger. So does a slot that fails to
    /// parse; the parse error is kept in [`Self::recovered_from`] and the bad
    /// blob stays untouched until the next successful append. Backend I/O
    /// failures are returned as is.
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let (records, recovered_from) = read_slot(store.as_ref(), &key)?;

        Ok(Self {
            store,
            key,
            records,
            recovered_from,
        })
    }

    /// Throws away in-memory state and reads the slot again.
    pub fn reload(&mut self) -> Result<()> {
        let (records, recovered_from) = read_slot(self.store.as_ref(), &self.key)?;
        self.records = records;
        self.recovered_from = recovered_from;
        Ok(())
    }

    pub fn recovered_from(&self) -> Option<&Error> {
        self.recovered_from.as_ref()
    }

    pub fn records(&self) -> &[DonationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The newest record.
    pub fn latest(&self) -> Option<&DonationRecord> {
        self.records.first()
    }

    pub fn next_id(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    /// Sum of every parsed amount, recomputed on each call.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing.
    pub fn total(&self) -> Decimal {
        self.records
            .iter()
            .filter_map(DonationRecord::amount_value)
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(amount))
            .unwrap_or_else(|| {
                warn!("Ledger total overflowed, showing the largest representable amount");
                Decimal::MAX
            })
    }

    /// Prepends `record` and rewrites the slot.
    ///
    /// The slot is written before memory changes, so a failed write leaves
    /// the ledger exactly as it was.
    pub fn append(&mut self, record: DonationRecord) -> Result<()> {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());

        self.persist(&next)?;
        debug!("Ledger now holds {} donations", next.len());
        self.records = next;
        Ok(())
    }

    /// Builds the record for a confirmed donation and appends it.
    ///
    /// The id is taken and the record appended in one step, with no
    /// suspension point in between.
    pub fn record_donation(
        &mut self,
        amount: &str,
        donor: String,
        cause: String,
        tx_hash: Option<String>,
    ) -> Result<DonationRecord> {
        let record = DonationRecord {
            id: self.next_id(),
            amount: amount.to_owned(),
            donor,
            cause,
            timestamp: utils::millis_since_unix_epoch(),
            tx_hash,
        };

        self.append(record.clone())?;
        info!("Recorded donation #{} of {}", record.id, record.amount);
        Ok(record)
    }

    /// Deletes the whole history. There is no per-record deletion.
    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(&self.key)?;
        self.records.clear();
        self.recovered_from = None;
        info!("Donation ledger cleared");
        Ok(())
    }

    fn persist(&self, records: &[DonationRecord]) -> Result<()> {
        let blob = serde_json::to_string(records)?;
        self.store
            .set(&self.key, &blob)
            .map_err(Error::storage)
    }
}

fn read_slot(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<(Vec<DonationRecord>, Option<Error>)> {
    let blob = match store.get(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Ok((Vec::new(), None)),
        Err(e @ Error::CorruptLedger(_)) => {
            warn!("Ledger slot {} is unreadable, starting empty: {}", key, e);
            return Ok((Vec::new(), Some(e)));
        }
        Err(e) => return Err(e),
    };

    if blob.trim().is_empty() {
        return Ok((Vec::new(), None));
    }

    match serde_json::from_str::<Vec<DonationRecord>>(&blob) {
        Ok(records) => {
            debug!("Loaded {} donations from {}", records.len(), key);
            Ok((records, None))
        }
        Err(e) => {
            warn!("Ledger slot {} is corrupt, starting empty: {}", key, e);
            Ok((Vec::new(), Some(Error::CorruptLedger(e.to_string()))))
        }
    }
}

impl std::fmt::Debug for LedgerStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerStore")
            .field("key", &self.key)
            .field("records", &self.records)
            .field("recovered_from", &self.recovered_from.as_ref().map(Error::kind))
            .finish()
    }
}
