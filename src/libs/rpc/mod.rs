//! JSON-RPC plumbing shared by wallets and the chain readers.
//!
//! Everything that can answer `request(method, params)` implements
//! [`Eip1193`]: the plain HTTP node client, both wallet variants, and the
//! in-memory chain used by the tests. Typed read helpers live in [`spells`].
pub mod http;
pub mod spells;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ProviderRpcError;

pub use http::HttpRpc;

/// The request/response surface of an injected wallet (EIP-1193), reused for
/// plain node access since a node answers the same calls minus the wallet_*
/// family.
#[async_trait]
pub trait Eip1193: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;
}

/// Hex quantity as used on the wire (`0x0`, `0x1a`).
pub fn quantity(n: u64) -> String {
    format!("{n:#x}")
}

pub fn parse_quantity(v: &Value) -> Result<u64, ProviderRpcError> {
    let s = v
        .as_str()
        .ok_or_else(|| ProviderRpcError::transport(format!("expected hex quantity, got {v}")))?;
    u64::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| ProviderRpcError::transport(format!("bad hex quantity `{s}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_round_trip() {
        assert_eq!(quantity(0), "0x0");
        assert_eq!(quantity(11_155_111), "0xaa36a7");
        assert_eq!(parse_quantity(&Value::from("0xaa36a7")).unwrap(), 11_155_111);
        assert!(parse_quantity(&Value::from(12)).is_err());
        assert!(parse_quantity(&Value::from("0xzz")).is_err());
    }
}
