use serde::{Deserialize, Serialize};
use url::Url;

use super::hardcoded_url;
use crate::wallet::AddChainParameters;

/// Display metadata of a chain's native currency.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl NativeCurrency {
    pub fn ether() -> Self {
        Self {
            name: "Ethereum".to_owned(),
            symbol: "ETH".to_owned(),
            decimals: 18,
        }
    }
}

/// Everything a wallet needs to find, register and switch to a network.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_url: Url,
    pub explorer_url: Url,
    #[serde(default = "NativeCurrency::ether")]
    pub native_currency: NativeCurrency,
    /// Where to get test funds, testnets only.
    #[serde(default)]
    pub faucet_url: Option<Url>,
}

impl NetworkConfig {
    pub fn base_mainnet() -> Self {
        Self {
            chain_id: 8453,
            chain_name: "Base Mainnet".to_owned(),
            rpc_url: hardcoded_url("https://mainnet.base.org"),
            explorer_url: hardcoded_url("https://basescan.org"),
            native_currency: NativeCurrency::ether(),
            faucet_url: None,
        }
    }

    pub fn sepolia() -> Self {
        Self {
            chain_id: 11_155_111,
            chain_name: "Sepolia Testnet".to_owned(),
            rpc_url: hardcoded_url("https://rpc.sepolia.org"),
            explorer_url: hardcoded_url("https://sepolia.etherscan.io"),
            native_currency: NativeCurrency {
                name: "Sepolia Ether".to_owned(),
                symbol: "ETH".to_owned(),
                decimals: 18,
            },
            faucet_url: Some(hardcoded_url("https://faucet-sepolia.rockx.com/")),
        }
    }

    /// `0x`-prefixed lowercase hex, the form wallets expect in switch requests.
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }

    pub fn add_chain_parameters(&self) -> AddChainParameters {
        AddChainParameters {
            chain_id: self.chain_id_hex(),
            chain_name: self.chain_name.clone(),
            native_currency: self.native_currency.clone(),
            rpc_urls: vec![trimmed(&self.rpc_url).to_owned()],
            block_explorer_urls: vec![trimmed(&self.explorer_url).to_owned()],
        }
    }

    /// Explorer link for a transaction. Not validated, only concatenated.
    pub fn transaction_url(&self, tx_hash: &str) -> String {
        format!("{}/tx/{tx_hash}", trimmed(&self.explorer_url))
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{address}", trimmed(&self.explorer_url))
    }
}

fn trimmed(url: &Url) -> &str {
    url.as_str().trim_end_matches('/')
}
