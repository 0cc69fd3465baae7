use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use alloy_primitives::Address;
use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::{Error, Result};

mod network;

pub use network::{NativeCurrency, NetworkConfig};

/// Environment variable naming the TOML file to read.
pub const CONFIG_PATH_ENV: &str = "DONATION_TRACKER_CONFIG";

/// Prefix for environment overrides, e.g. `DONATION_TRACKER_USE_TESTNET=true`.
pub const ENV_PREFIX: &str = "DONATION_TRACKER_";

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "NetworkConfig::base_mainnet")]
    pub mainnet: NetworkConfig,
    #[serde(default = "NetworkConfig::sepolia")]
    pub testnet: NetworkConfig,
    #[serde(default)]
    pub use_testnet: bool,

    /// The single destination of every donation.
    #[serde(default = "default_recipient")]
    pub recipient: String,

    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_confirmation_timeout", with = "humantime_serde")]
    pub confirmation_timeout: Option<Duration>,

    #[serde(default = "default_log")]
    pub log: String,
}

impl Config {
    /// Reads `[global]` from the TOML file (explicit path first, then
    /// `DONATION_TRACKER_CONFIG`) and layers `DONATION_TRACKER_*` variables on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut figment = Figment::new();
        if let Some(path) = path {
            debug!("Reading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path).nested());
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__").global())
            .extract::<Config>()?;

        config.recipient_address()?;
        Ok(config)
    }

    /// The one network donations are sent on.
    pub fn target_network(&self) -> &NetworkConfig {
        if self.use_testnet {
            &self.testnet
        } else {
            &self.mainnet
        }
    }

    /// Parses the recipient. Mixed-case input must carry a valid checksum.
    pub fn recipient_address(&self) -> Result<Address> {
        let recipient = self.recipient.trim();
        let hex_part = recipient.strip_prefix("0x").unwrap_or(recipient);
        let mixed_case = hex_part.chars().any(|c| c.is_ascii_uppercase())
            && hex_part.chars().any(|c| c.is_ascii_lowercase());

        let parsed = if mixed_case {
            Address::parse_checksummed(recipient, None).ok()
        } else {
            Address::from_str(recipient).ok()
        };

        parsed.ok_or_else(|| Error::bad_config("Recipient is not a valid address."))
    }

    /// Unset or zero means the confirmation wait is unbounded.
    pub fn confirmation_timeout(&self) -> Option<Duration> {
        self.confirmation_timeout
            .filter(|timeout| !timeout.is_zero())
    }

    /// Directory holding the ledger slot.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }

        ProjectDirs::from("org", "donation-tracker", "donation-tracker")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| Error::bad_config("Could not determine a data directory, set database_path."))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mainnet: NetworkConfig::base_mainnet(),
            testnet: NetworkConfig::sepolia(),
            use_testnet: false,
            recipient: default_recipient(),
            storage_key: default_storage_key(),
            database_path: None,
            confirmation_timeout: default_confirmation_timeout(),
            log: default_log(),
        }
    }
}

fn default_recipient() -> String {
    "0x4c675ebfbf0be454d0632a28e167f78b9f775d90".to_owned()
}

fn default_storage_key() -> String {
    "donation-tracker-donations".to_owned()
}

fn default_confirmation_timeout() -> Option<Duration> {
    Some(Duration::from_secs(10 * 60))
}

fn default_log() -> String {
    "warn".to_owned()
}

fn hardcoded_url(url: &str) -> Url {
    Url::parse(url).expect("hardcoded url is valid")
}
