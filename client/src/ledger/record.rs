use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One confirmed donation. Created once, never mutated.
///
/// Serialized in the same camelCase shape the browser front-end kept in
/// local storage, so existing histories load unchanged.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DonationRecord {
    /// `ledger length + 1` at insertion, unique only within this ledger.
    pub id: u64,
    /// Display units, e.g. `"0.01"` ETH, not wei.
    pub amount: String,
    pub donor: String,
    pub cause: String,
    /// Milliseconds since the epoch, captured when the confirmation arrived.
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl DonationRecord {
    /// `None` for amounts that do not parse, which only a hand-edited store
    /// can contain.
    pub fn amount_value(&self) -> Option<Decimal> {
        Decimal::from_str(self.amount.trim()).ok()
    }
}
