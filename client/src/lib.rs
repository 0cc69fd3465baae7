//! Wallet-signed donations to a single fixed address, with a locally
//! persisted ledger of past donations.
//!
//! The chain itself is never touched directly: account discovery, network
//! switching, signing and confirmation all go through an injected
//! [`wallet::WalletProvider`]. The ledger lives in one slot of a
//! [`database::KeyValueStore`] and is rewritten whole on every change.

pub mod config;
pub mod database;
pub mod donation;
pub mod ledger;
pub mod notice;
pub mod render;
pub mod tracker;
pub mod utils;
pub mod wallet;

pub use config::Config;
pub use donation::DonationFlow;
pub use ledger::{DonationRecord, LedgerStore};
pub use tracker::DonationTracker;
pub use utils::error::{Error, ErrorKind, Result};
