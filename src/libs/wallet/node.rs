use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    error::{DappError, ProviderRpcError},
    libs::rpc::{parse_quantity, spells, Eip1193, HttpRpc},
};

/// Accounts unlocked on a development node. The node signs, so the only thing
/// this wrapper adds is the wallet-side surface: it cannot change networks and
/// it never prompts.
#[derive(Debug)]
pub struct NodeWallet {
    node: HttpRpc,
}

impl NodeWallet {
    pub fn new(url: &str) -> Result<Self, DappError> {
        let node = HttpRpc::new(url).map_err(|e| DappError::RpcUnavailable(e.to_string()))?;
        Ok(Self { node })
    }
}

#[async_trait]
impl Eip1193 for NodeWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        match method {
            "eth_requestAccounts" => {
                let accounts = spells::accounts(&self.node).await?;
                if accounts.is_empty() {
                    return Err(ProviderRpcError::unauthorized(
                        "node at NODE_WALLET_RPC has no unlocked accounts",
                    ));
                }
                Ok(json!(accounts))
            }
            "wallet_switchEthereumChain" => {
                let target = parse_quantity(&params[0]["chainId"])?;
                if spells::chain_id(&self.node).await? == target {
                    Ok(Value::Null)
                } else {
                    Err(ProviderRpcError::unsupported(method))
                }
            }
            "wallet_addEthereumChain" => Err(ProviderRpcError::unsupported(method)),
            _ => self.node.request(method, params).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::codes;

    #[tokio::test]
    async fn cannot_add_chains() {
        let w = NodeWallet::new("http://127.0.0.1:1").unwrap();
        let err = w
            .request("wallet_addEthereumChain", json!([{ "chainId": "0x1" }]))
            .await
            .unwrap_err();
        assert_eq!(err.code, codes::UNSUPPORTED_METHOD);
    }

    #[test]
    fn bad_url_is_rpc_unavailable() {
        assert!(matches!(
            NodeWallet::new("not a url"),
            Err(DappError::RpcUnavailable(_))
        ));
    }
}
