use serde::Deserialize;
use thiserror::Error;

/// EIP-1193 provider error codes the app reacts to.
pub mod codes {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INTERNAL: i64 = -32603;
    /// Generic server error; most nodes report "insufficient funds" with it.
    pub const SERVER: i64 = -32000;
}

/// Error shape shared by wallets and JSON-RPC nodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Error)]
#[error("rpc error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
}

impl ProviderRpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(codes::USER_REJECTED, "User rejected the request.")
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(codes::UNAUTHORIZED, message)
    }

    pub fn unsupported(method: &str) -> Self {
        Self::new(
            codes::UNSUPPORTED_METHOD,
            format!("method `{method}` is not supported by this wallet"),
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == codes::USER_REJECTED
    }
}

/// Form validation failures. Always raised before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("`{0}` is not a 0x-prefixed 20-byte address")]
    BadAddress(String),
    #[error("`{0}` fails the EIP-55 checksum")]
    BadChecksum(String),
    #[error("`{0}` is not a valid amount")]
    BadAmount(String),
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("call data must be 0x-prefixed hex: {0}")]
    BadCallData(String),
    #[error("message must not be empty")]
    EmptyMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DappError {
    #[error("wallet not installed: {0}")]
    WalletNotInstalled(String),
    #[error("request was rejected in the wallet")]
    UserRejected,
    #[error("wallet cannot switch to {network}")]
    NetworkSwitchUnsupported { network: String },
    #[error("no authorized account; connect a wallet first")]
    NoAccount,
    #[error(transparent)]
    InvalidInput(#[from] InputError),
    #[error("rpc unavailable: {0}")]
    RpcUnavailable(String),
    #[error("{skipped} item(s) could not be fetched")]
    PartialFetch { skipped: usize },
    #[error("no message registry deployed on chain {0}")]
    NoRegistry(u64),
    #[error("transaction {0} reverted")]
    Reverted(String),
    #[error("no receipt for {hash} after {polls} polls")]
    ReceiptTimeout { hash: String, polls: u32 },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error(transparent)]
    Wallet(ProviderRpcError),
}

impl From<ProviderRpcError> for DappError {
    fn from(e: ProviderRpcError) -> Self {
        if e.is_user_rejection() {
            DappError::UserRejected
        } else {
            DappError::Wallet(e)
        }
    }
}

impl From<serde_json::Error> for DappError {
    fn from(e: serde_json::Error) -> Self {
        DappError::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_code_maps_to_user_rejected() {
        let e: DappError = ProviderRpcError::user_rejected().into();
        assert_eq!(e, DappError::UserRejected);

        let e: DappError = ProviderRpcError::new(codes::SERVER, "insufficient funds").into();
        assert!(matches!(e, DappError::Wallet(ref inner) if inner.code == codes::SERVER));
    }

    #[test]
    fn rpc_error_object_deserializes() {
        let v = serde_json::json!({ "code": 4902, "message": "Unrecognized chain ID" });
        let e: ProviderRpcError = serde_json::from_value(v).unwrap();
        assert_eq!(e.code, codes::UNRECOGNIZED_CHAIN);
    }
}
