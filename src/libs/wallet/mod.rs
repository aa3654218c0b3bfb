//! Wallet providers. The app never inspects arbitrary objects for wallet
//! capabilities; it knows a closed set of variants ([`ProviderChoice`]) and
//! each one either is available in this environment or is not.
pub mod consent;
pub mod local;
pub mod node;

use std::sync::Arc;

use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::Network,
    error::DappError,
    libs::{config::Config, rpc::Eip1193},
};

pub use consent::{AutoApprove, ChannelConsent, Consent, ConsentRequest, Prompt};
pub use local::LocalKeyWallet;
pub use node::NodeWallet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderChoice {
    /// Keys from `PRIVATE_KEY`, signing locally, approvals through the UI.
    LocalKey,
    /// Accounts unlocked on the node at `NODE_WALLET_RPC` (anvil, geth --dev).
    NodeAccounts,
}

impl ProviderChoice {
    pub const ALL: [ProviderChoice; 2] = [ProviderChoice::LocalKey, ProviderChoice::NodeAccounts];

    pub fn label(self) -> &'static str {
        match self {
            ProviderChoice::LocalKey => "Local key",
            ProviderChoice::NodeAccounts => "Node accounts",
        }
    }

    pub fn is_available(self, cfg: &Config) -> bool {
        match self {
            ProviderChoice::LocalKey => !cfg.private_keys.is_empty(),
            ProviderChoice::NodeAccounts => cfg.node_wallet_rpc.is_some(),
        }
    }

    /// Instantiate the provider handle. Does not touch the network and does
    /// not prompt; authorization happens on `eth_requestAccounts`.
    pub fn inject(
        self,
        cfg: &Config,
        network: &'static Network,
        consent: Arc<dyn Consent>,
    ) -> Result<Arc<dyn Eip1193>, DappError> {
        if !self.is_available(cfg) {
            return Err(DappError::WalletNotInstalled(match self {
                ProviderChoice::LocalKey => "set PRIVATE_KEY to enable the local-key wallet".into(),
                ProviderChoice::NodeAccounts => {
                    "set NODE_WALLET_RPC to enable node-managed accounts".into()
                }
            }));
        }
        match self {
            ProviderChoice::LocalKey => Ok(Arc::new(LocalKeyWallet::new(
                &cfg.private_keys,
                network,
                consent,
            )?)),
            ProviderChoice::NodeAccounts => {
                let url = cfg.node_wallet_rpc.as_deref().unwrap_or_default();
                Ok(Arc::new(NodeWallet::new(url)?))
            }
        }
    }
}

/// Params object of `eth_sendTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTxParams {
    pub from: Address,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Params object of `wallet_addEthereumChain` (EIP-3085).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    pub chain_id: String,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency: NativeCurrency,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_explorer_urls: Vec<String>,
}

impl AddChainParams {
    pub fn for_network(n: &Network) -> Self {
        Self {
            chain_id: crate::libs::rpc::quantity(n.chain_id),
            chain_name: n.display_name.to_string(),
            rpc_urls: vec![n.rpc_url.to_string()],
            native_currency: NativeCurrency {
                name: n.native_symbol.to_string(),
                symbol: n.native_symbol.to_string(),
                decimals: 18,
            },
            block_explorer_urls: n.explorer_url.map(str::to_string).into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::network_by_id;

    fn cfg(keys: Vec<String>, node: Option<String>) -> Config {
        let mut c = Config::new();
        c.private_keys = keys;
        c.node_wallet_rpc = node;
        c
    }

    #[test]
    fn availability_follows_config() {
        let none = cfg(vec![], None);
        assert!(!ProviderChoice::LocalKey.is_available(&none));
        assert!(!ProviderChoice::NodeAccounts.is_available(&none));
        let net = network_by_id("localhost").unwrap();
        let err = ProviderChoice::LocalKey
            .inject(&none, net, Arc::new(AutoApprove))
            .err()
            .unwrap();
        assert!(matches!(err, DappError::WalletNotInstalled(_)));

        let node = cfg(vec![], Some("http://127.0.0.1:8545".into()));
        assert!(ProviderChoice::NodeAccounts.is_available(&node));
        assert!(ProviderChoice::NodeAccounts
            .inject(&node, net, Arc::new(AutoApprove))
            .is_ok());
    }

    #[test]
    fn add_chain_params_shape() {
        let bsc = network_by_id("bsc").unwrap();
        let v = serde_json::to_value(AddChainParams::for_network(bsc)).unwrap();
        assert_eq!(v["chainId"], "0x38");
        assert_eq!(v["rpcUrls"][0], bsc.rpc_url);
        assert_eq!(v["nativeCurrency"]["symbol"], "BNB");
        assert_eq!(v["blockExplorerUrls"][0], "https://bscscan.com");

        let local = network_by_id("localhost").unwrap();
        let v = serde_json::to_value(AddChainParams::for_network(local)).unwrap();
        assert!(v.get("blockExplorerUrls").is_none());
    }

    #[test]
    fn send_params_skip_empty_fields() {
        let p = SendTxParams {
            from: Address::ZERO,
            to: Some(Address::repeat_byte(1)),
            value: None,
            data: None,
        };
        let v = serde_json::to_value(&p).unwrap();
        assert!(v.get("value").is_none());
        assert!(v.get("data").is_none());
        let back: SendTxParams = serde_json::from_value(v).unwrap();
        assert_eq!(back, p);
    }
}
