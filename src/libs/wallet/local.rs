use std::{collections::HashMap, str::FromStr, sync::Arc};

use alloy::{
    network::TransactionBuilder,
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::{local::PrivateKeySigner, Signer},
};
use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{
    consent::{Consent, Prompt},
    AddChainParams, SendTxParams,
};
use crate::{
    constants::{network_by_id, Network},
    error::{DappError, ProviderRpcError},
    libs::{
        rpc::{parse_quantity, quantity, Eip1193, HttpRpc},
        writing::cc,
    },
    log, warn,
};

const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Clone)]
struct KnownChain {
    name: String,
    rpc: Arc<HttpRpc>,
}

#[derive(Debug)]
struct State {
    authorized: bool,
    chain_id: u64,
    chains: HashMap<u64, KnownChain>,
}

/// Wallet backed by keys held in process memory. Signs with alloy's local
/// signer and broadcasts through the current chain's public RPC. Every
/// account, network and transaction action is confirmed through [`Consent`].
pub struct LocalKeyWallet {
    signers: Vec<PrivateKeySigner>,
    state: RwLock<State>,
    consent: Arc<dyn Consent>,
}

impl LocalKeyWallet {
    pub fn new(
        keys: &[String],
        network: &'static Network,
        consent: Arc<dyn Consent>,
    ) -> Result<Self, DappError> {
        let signers = keys
            .iter()
            .map(|k| PrivateKeySigner::from_str(k))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DappError::WalletNotInstalled(format!("PRIVATE_KEY is invalid: {e}")))?;
        if signers.is_empty() {
            return Err(DappError::WalletNotInstalled("PRIVATE_KEY is empty".into()));
        }

        // Out of the box the wallet knows Ethereum and Sepolia plus whatever it
        // was opened on. Anything else has to be added first.
        let mut chains = HashMap::new();
        for n in ["mainnet", "sepolia"]
            .into_iter()
            .filter_map(network_by_id)
            .chain(std::iter::once(network))
        {
            let rpc = HttpRpc::new(n.rpc_url).map_err(|e| DappError::RpcUnavailable(e.to_string()))?;
            chains.insert(
                n.chain_id,
                KnownChain {
                    name: n.display_name.to_string(),
                    rpc: Arc::new(rpc),
                },
            );
        }

        Ok(Self {
            signers,
            state: RwLock::new(State {
                authorized: false,
                chain_id: network.chain_id,
                chains,
            }),
            consent,
        })
    }

    pub fn addresses(&self) -> Vec<Address> {
        self.signers.iter().map(|s| s.address()).collect()
    }

    async fn upstream(&self) -> Result<(u64, Arc<HttpRpc>), ProviderRpcError> {
        let st = self.state.read().await;
        st.chains
            .get(&st.chain_id)
            .map(|c| (st.chain_id, c.rpc.clone()))
            .ok_or_else(|| ProviderRpcError::transport("current chain has no rpc endpoint"))
    }

    async fn request_accounts(&self) -> Result<Value, ProviderRpcError> {
        if self.state.read().await.authorized {
            return Ok(json!(self.addresses()));
        }
        let approved = self
            .consent
            .approve(Prompt::Connect {
                accounts: self.addresses(),
            })
            .await;
        if !approved {
            return Err(ProviderRpcError::user_rejected());
        }
        self.state.write().await.authorized = true;
        log!(cc::LIGHT_GREEN, "local wallet: {} account(s) shared", self.signers.len());
        Ok(json!(self.addresses()))
    }

    async fn switch_chain(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let target = parse_quantity(&params[0]["chainId"])
            .map_err(|e| ProviderRpcError::new(INVALID_PARAMS, e.message))?;
        {
            let st = self.state.read().await;
            if !st.chains.contains_key(&target) {
                return Err(ProviderRpcError::new(
                    crate::error::codes::UNRECOGNIZED_CHAIN,
                    format!("Unrecognized chain ID {}. Try adding the chain first.", quantity(target)),
                ));
            }
            if st.chain_id == target {
                return Ok(Value::Null);
            }
        }
        if !self.consent.approve(Prompt::SwitchChain { chain_id: target }).await {
            return Err(ProviderRpcError::user_rejected());
        }
        self.state.write().await.chain_id = target;
        Ok(Value::Null)
    }

    async fn add_chain(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let add: AddChainParams = serde_json::from_value(params[0].clone())
            .map_err(|e| ProviderRpcError::new(INVALID_PARAMS, e.to_string()))?;
        let chain_id = parse_quantity(&json!(add.chain_id))
            .map_err(|e| ProviderRpcError::new(INVALID_PARAMS, e.message))?;
        let url = add
            .rpc_urls
            .first()
            .cloned()
            .ok_or_else(|| ProviderRpcError::new(INVALID_PARAMS, "rpcUrls is empty"))?;
        let rpc = HttpRpc::new(&url)
            .map_err(|e| ProviderRpcError::new(INVALID_PARAMS, e.to_string()))?;

        let approved = self
            .consent
            .approve(Prompt::AddChain {
                chain_id,
                name: add.chain_name.clone(),
                rpc_url: url,
            })
            .await;
        if !approved {
            return Err(ProviderRpcError::user_rejected());
        }
        self.state.write().await.chains.insert(
            chain_id,
            KnownChain {
                name: add.chain_name,
                rpc: Arc::new(rpc),
            },
        );
        Ok(Value::Null)
    }

    async fn send_transaction(&self, params: &Value) -> Result<Value, ProviderRpcError> {
        let tx: SendTxParams = serde_json::from_value(params[0].clone())
            .map_err(|e| ProviderRpcError::new(INVALID_PARAMS, e.to_string()))?;
        if !self.state.read().await.authorized {
            return Err(ProviderRpcError::unauthorized(
                "The requested account has not been authorized by the user.",
            ));
        }
        let signer = self
            .signers
            .iter()
            .find(|s| s.address() == tx.from)
            .cloned()
            .ok_or_else(|| {
                ProviderRpcError::unauthorized(format!("account {} is not managed here", tx.from))
            })?;

        let approved = self
            .consent
            .approve(Prompt::SendTransaction {
                from: tx.from,
                to: tx.to,
                value: tx.value.unwrap_or_default(),
                data_len: tx.data.as_ref().map_or(0, |d| d.len()),
            })
            .await;
        if !approved {
            return Err(ProviderRpcError::user_rejected());
        }

        let (chain_id, upstream) = self.upstream().await?;
        let provider = ProviderBuilder::new()
            .with_chain_id(chain_id)
            .wallet(signer.with_chain_id(Some(chain_id)))
            .connect_http(upstream.url().clone());

        let mut req = TransactionRequest::default()
            .with_from(tx.from)
            .with_chain_id(chain_id);
        if let Some(to) = tx.to {
            req = req.with_to(to);
        }
        if let Some(value) = tx.value {
            req = req.with_value(value);
        }
        if let Some(data) = tx.data {
            req = req.with_input(data);
        }

        let pending = provider.send_transaction(req).await.map_err(|e| {
            warn!("local wallet: broadcast failed: {}", e);
            match e.as_error_resp() {
                Some(payload) => ProviderRpcError::new(payload.code, payload.message.to_string()),
                None => ProviderRpcError::transport(e.to_string()),
            }
        })?;
        let hash = *pending.tx_hash();
        log!(cc::LIGHT_GREEN, "local wallet: broadcast {}", hash);
        Ok(json!(hash))
    }

    pub async fn chain_name(&self) -> Option<String> {
        let st = self.state.read().await;
        st.chains.get(&st.chain_id).map(|c| c.name.clone())
    }
}

#[async_trait]
impl Eip1193 for LocalKeyWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        match method {
            "eth_accounts" => Ok(if self.state.read().await.authorized {
                json!(self.addresses())
            } else {
                json!([])
            }),
            "eth_requestAccounts" => self.request_accounts().await,
            "eth_chainId" => Ok(json!(quantity(self.state.read().await.chain_id))),
            "wallet_switchEthereumChain" => self.switch_chain(&params).await,
            "wallet_addEthereumChain" => self.add_chain(&params).await,
            "eth_sendTransaction" => self.send_transaction(&params).await,
            "eth_sign" | "personal_sign" | "eth_signTypedData_v4" => {
                Err(ProviderRpcError::unsupported(method))
            }
            _ => {
                let (_, upstream) = self.upstream().await?;
                upstream.request(method, params).await
            }
        }
    }
}
