//! Node responses are decoded straight into alloy's RPC types. The helpers
//! here pull out the few fields the views show.
use alloy::{consensus::Transaction as _, primitives::Address};

pub use alloy::rpc::types::eth::{Block, Filter, Log, Transaction, TransactionReceipt};

pub fn timestamp_ms(block: &Block) -> u64 {
    block.header.timestamp.saturating_mul(1_000)
}

/// Full transaction bodies, or an empty slice when the block was fetched
/// with hashes only.
pub fn bodies(block: &Block) -> &[Transaction] {
    block.transactions.as_transactions().unwrap_or_default()
}

pub fn sender(tx: &Transaction) -> Address {
    tx.inner.signer()
}

pub fn recipient(tx: &Transaction) -> Option<Address> {
    tx.inner.inner().to()
}

pub fn touches(tx: &Transaction, address: Address) -> bool {
    sender(tx) == address || recipient(tx) == Some(address)
}
