//! Typed convenience calls over any [`Eip1193`] endpoint. Whereas the
//! trait only moves JSON around, these helpers know the parameter layout and
//! decode the handful of responses the app cares about.
use alloy::primitives::{Address, Bytes, B256, U256};
use serde_json::{json, Value};

use super::{
    parse_quantity, quantity,
    types::{Block, Filter, Log, TransactionReceipt},
    Eip1193,
};
use crate::error::ProviderRpcError;

/// Block selector for `eth_getBlockByNumber`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Number(u64),
}

impl BlockTag {
    fn to_param(self) -> Value {
        match self {
            BlockTag::Latest => json!("latest"),
            BlockTag::Number(n) => json!(quantity(n)),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(method: &str, v: Value) -> Result<T, ProviderRpcError> {
    serde_json::from_value(v)
        .map_err(|e| ProviderRpcError::transport(format!("{method}: cannot decode response: {e}")))
}

pub async fn chain_id<R: Eip1193 + ?Sized>(rpc: &R) -> Result<u64, ProviderRpcError> {
    let v = rpc.request("eth_chainId", json!([])).await?;
    parse_quantity(&v)
}

pub async fn block_number<R: Eip1193 + ?Sized>(rpc: &R) -> Result<u64, ProviderRpcError> {
    let v = rpc.request("eth_blockNumber", json!([])).await?;
    parse_quantity(&v)
}

/// `Ok(None)` when the node does not know the block (yet).
pub async fn get_block<R: Eip1193 + ?Sized>(
    rpc: &R,
    tag: BlockTag,
    full_transactions: bool,
) -> Result<Option<Block>, ProviderRpcError> {
    let v = rpc
        .request(
            "eth_getBlockByNumber",
            json!([tag.to_param(), full_transactions]),
        )
        .await?;
    if v.is_null() {
        return Ok(None);
    }
    decode("eth_getBlockByNumber", v).map(Some)
}

/// `Ok(None)` while the transaction is unmined.
pub async fn get_receipt<R: Eip1193 + ?Sized>(
    rpc: &R,
    hash: B256,
) -> Result<Option<TransactionReceipt>, ProviderRpcError> {
    let v = rpc
        .request("eth_getTransactionReceipt", json!([hash]))
        .await?;
    if v.is_null() {
        return Ok(None);
    }
    decode("eth_getTransactionReceipt", v).map(Some)
}

pub async fn get_balance<R: Eip1193 + ?Sized>(
    rpc: &R,
    address: Address,
) -> Result<U256, ProviderRpcError> {
    let v = rpc
        .request("eth_getBalance", json!([address, "latest"]))
        .await?;
    decode("eth_getBalance", v)
}

pub async fn call<R: Eip1193 + ?Sized>(
    rpc: &R,
    to: Address,
    data: Bytes,
) -> Result<Bytes, ProviderRpcError> {
    let v = rpc
        .request("eth_call", json!([{ "to": to, "data": data }, "latest"]))
        .await?;
    decode("eth_call", v)
}

pub async fn get_logs<R: Eip1193 + ?Sized>(
    rpc: &R,
    filter: &Filter,
) -> Result<Vec<Log>, ProviderRpcError> {
    let v = rpc.request("eth_getLogs", json!([filter])).await?;
    decode("eth_getLogs", v)
}

pub async fn accounts<R: Eip1193 + ?Sized>(rpc: &R) -> Result<Vec<Address>, ProviderRpcError> {
    let v = rpc.request("eth_accounts", json!([])).await?;
    decode("eth_accounts", v)
}

pub async fn request_accounts<R: Eip1193 + ?Sized>(
    rpc: &R,
) -> Result<Vec<Address>, ProviderRpcError> {
    let v = rpc.request("eth_requestAccounts", json!([])).await?;
    decode("eth_requestAccounts", v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filter_params() {
        let f = Filter::new()
            .address(Address::repeat_byte(0x11))
            .from_block(7)
            .event_signature(B256::repeat_byte(1));
        let p = json!(f);
        assert_eq!(p["fromBlock"], "0x7");
        assert!(p["address"].is_string());
        assert!(p["topics"].to_string().contains("0101010101"));
    }

    #[test]
    fn block_tags() {
        assert_eq!(BlockTag::Latest.to_param(), json!("latest"));
        assert_eq!(BlockTag::Number(255).to_param(), json!("0xff"));
    }
}
