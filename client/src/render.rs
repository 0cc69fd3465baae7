//! Text rendering of the donation ledger.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::{
    config::NetworkConfig,
    ledger::{DonationRecord, LedgerStore},
    utils::short_address,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationRow {
    pub id: u64,
    pub amount: String,
    pub donor: String,
    pub date: String,
    pub cause: String,
    pub explorer_url: Option<String>,
}

/// Everything the ledger panel shows, computed from a snapshot of the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerView {
    pub total: String,
    pub count: usize,
    pub latest: Option<DonationRow>,
    pub rows: Vec<DonationRow>,
    /// Set on testnets that publish a faucet.
    pub faucet: Option<String>,
}

impl LedgerView {
    pub fn new(ledger: &LedgerStore, network: &NetworkConfig) -> Self {
        let symbol = &network.native_currency.symbol;
        let rows: Vec<DonationRow> = ledger
            .records()
            .iter()
            .map(|record| row(record, network))
            .collect();

        Self {
            total: format!("{} {symbol}", format_total(ledger.total())),
            count: rows.len(),
            latest: rows.first().cloned(),
            rows,
            faucet: network
                .faucet_url
                .as_ref()
                .map(|url| format!("Get free test {symbol} from: {url}")),
        }
    }
}

fn row(record: &DonationRecord, network: &NetworkConfig) -> DonationRow {
    DonationRow {
        id: record.id,
        amount: format!("{} {}", record.amount, network.native_currency.symbol),
        donor: short_address(&record.donor),
        date: format_timestamp(record.timestamp),
        cause: record.cause.clone(),
        explorer_url: record
            .tx_hash
            .as_deref()
            .map(|hash| network.transaction_url(hash)),
    }
}

/// Four decimal places, like the ledger header always showed.
pub fn format_total(total: Decimal) -> String {
    format!("{:.4}", total.round_dp(4))
}

/// `Oct 16, 2026, 02:30 PM`, in UTC.
pub fn format_timestamp(millis: u64) -> String {
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|date| date.format("%b %-d, %Y, %I:%M %p").to_string())
        .unwrap_or_else(|| "unknown date".to_owned())
}

impl fmt::Display for LedgerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Donation Ledger")?;
        writeln!(f, "Total Raised: {}", self.total)?;
        if let Some(faucet) = &self.faucet {
            writeln!(f, "{faucet}")?;
        }

        if self.rows.is_empty() {
            writeln!(f)?;
            writeln!(f, "No donations yet")?;
            return writeln!(
                f,
                "Be the first to make a donation and help make a difference!"
            );
        }

        writeln!(f, "{} donations", self.count)?;
        if let Some(latest) = &self.latest {
            writeln!(
                f,
                "Latest: {} gave {} on {}",
                latest.donor, latest.amount, latest.date
            )?;
        }

        for row in &self.rows {
            writeln!(f)?;
            writeln!(f, "#{} {}", row.id, row.amount)?;
            writeln!(f, "  {}  {}", row.donor, row.date)?;
            writeln!(f, "  {}", row.cause)?;
            if let Some(url) = &row.explorer_url {
                writeln!(f, "  {url}")?;
            }
        }

        Ok(())
    }
}
