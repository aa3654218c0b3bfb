use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use url::Url;

use super::Eip1193;
use crate::error::ProviderRpcError;

/// Plain JSON-RPC over HTTP. Used directly for read-only browsing and as the
/// upstream of both wallet variants.
#[derive(Debug)]
pub struct HttpRpc {
    rpc_url: Url,
    http: HttpClient,
    next_id: AtomicU64,
}

impl HttpRpc {
    pub fn new(rpc_url: &str) -> anyhow::Result<Self> {
        let url =
            Url::parse(rpc_url).with_context(|| format!("Failed to parse RPC url: {rpc_url}"))?;
        Ok(Self::with_url(url))
    }

    pub fn with_url(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            http: HttpClient::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &Url {
        &self.rpc_url
    }

    async fn rpc(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let res = self
            .http
            .post(self.rpc_url.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderRpcError::transport(format!("{method}: {e}")))?;
        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| ProviderRpcError::transport(format!("{method}: {e}")))?;

        let v: Value = match serde_json::from_slice(&bytes) {
            Ok(json) => json,
            Err(e) => {
                let mut sample = String::from_utf8_lossy(&bytes).to_string();
                if sample.len() > 256 {
                    sample.truncate(256);
                }
                let hint = if sample.trim_start().starts_with('<') {
                    "Response looks like HTML; the endpoint is not a JSON-RPC node."
                } else if sample.trim().is_empty() {
                    "Empty body from RPC. Endpoint may be down or require authentication."
                } else {
                    "Non-JSON response from RPC."
                };
                return Err(ProviderRpcError::transport(format!(
                    "decode error ({status}) from {}: {e}. {hint}",
                    self.rpc_url
                )));
            }
        };
        split_response(v)
    }
}

/// Turn a JSON-RPC envelope into its `result` or its `error` object.
pub(crate) fn split_response(v: Value) -> Result<Value, ProviderRpcError> {
    if let Some(err) = v.get("error") {
        return Err(serde_json::from_value::<ProviderRpcError>(err.clone())
            .unwrap_or_else(|_| ProviderRpcError::transport(format!("rpc error: {err}"))));
    }
    Ok(v.get("result").cloned().unwrap_or(Value::Null))
}

#[async_trait]
impl Eip1193 for HttpRpc {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.rpc(method, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_result_and_error() {
        let ok = split_response(json!({"jsonrpc": "2.0", "id": 1, "result": "0x1"})).unwrap();
        assert_eq!(ok, json!("0x1"));

        let err = split_response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "insufficient funds for gas * price + value"}
        }))
        .unwrap_err();
        assert_eq!(err.code, -32000);
        assert!(err.message.contains("insufficient funds"));

        let odd = split_response(json!({"error": "boom"})).unwrap_err();
        assert!(odd.message.contains("boom"));
    }

    #[test]
    fn rejects_bad_url() {
        assert!(HttpRpc::new("not a url").is_err());
        let rpc = HttpRpc::new("http://127.0.0.1:8545").unwrap();
        assert_eq!(rpc.url().port(), Some(8545));
    }
}
