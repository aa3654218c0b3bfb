//! Read-only chain views: latest transactions, per-address history, latest
//! blocks, balances.
//!
//! There is no indexer behind this. Address history is rebuilt by walking a
//! bounded window of recent blocks backwards from the head, which keeps the
//! request count predictable at the cost of only ever seeing recent activity.
use std::sync::Arc;

use alloy::{
    consensus::Transaction as _,
    primitives::{Address, B256, U256},
};
use futures_util::future::{join_all, try_join_all};

use crate::{
    error::{DappError, ProviderRpcError},
    libs::{
        format::{format_native, wei_to_gwei},
        rpc::{
            spells::{self, BlockTag},
            types::{self, Block, Transaction, TransactionReceipt},
            Eip1193,
        },
        writing::cc,
    },
    log, warn,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanSettings {
    /// How many blocks back from the head an address scan looks.
    pub window_blocks: u64,
    /// Blocks fetched concurrently per batch.
    pub batch_size: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            window_blocks: 200,
            batch_size: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Success,
    Failed,
    Pending,
}

impl TxStatus {
    fn from_receipt(receipt: Option<&TransactionReceipt>) -> Self {
        match receipt {
            Some(r) if r.status() => TxStatus::Success,
            Some(_) => TxStatus::Failed,
            None => TxStatus::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TxStatus::Success => "success",
            TxStatus::Failed => "failed",
            TxStatus::Pending => "pending",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    pub hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub gas_price_gwei: f64,
    pub gas_used: u64,
    pub timestamp_ms: u64,
    pub status: TxStatus,
}

impl TransactionRecord {
    fn build(
        tx: &Transaction,
        block_number: u64,
        timestamp_ms: u64,
        receipt: Option<&TransactionReceipt>,
    ) -> Self {
        let envelope = tx.inner.inner();
        let price = receipt
            .map(|r| r.effective_gas_price)
            .or(tx.effective_gas_price)
            .or(envelope.gas_price())
            .unwrap_or_default();
        Self {
            hash: *envelope.tx_hash(),
            block_number,
            from: types::sender(tx),
            to: types::recipient(tx),
            value: envelope.value(),
            gas_price_gwei: wei_to_gwei(U256::from(price)),
            gas_used: receipt.map(|r| r.gas_used).unwrap_or(0),
            timestamp_ms,
            status: TxStatus::from_receipt(receipt),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    pub number: u64,
    pub hash: B256,
    pub timestamp_ms: u64,
    pub transaction_count: usize,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub miner: Address,
}

impl From<&Block> for BlockRecord {
    fn from(b: &Block) -> Self {
        Self {
            number: b.header.number,
            hash: b.header.hash,
            timestamp_ms: types::timestamp_ms(b),
            transaction_count: b.transactions.len(),
            gas_used: b.header.gas_used,
            gas_limit: b.header.gas_limit,
            miner: b.header.beneficiary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Balance {
    pub address: Address,
    pub wei: U256,
    pub formatted: String,
}

/// Result of a scan that tolerates partial failure. `skipped` counts the
/// blocks or receipts that could not be fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Scanned<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Scanned<T> {
    pub fn partial_error(&self) -> Option<DappError> {
        (self.skipped > 0).then_some(DappError::PartialFetch {
            skipped: self.skipped,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub index: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// Client-side pagination. An out-of-range index lands on the last page;
/// an empty list still has one (empty) page.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, index: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let index = index.min(total_pages - 1);
    let start = index * page_size;
    Page {
        items: items.iter().skip(start).take(page_size).cloned().collect(),
        index,
        page_size,
        total_pages,
        total_items: items.len(),
    }
}

fn unavailable(e: ProviderRpcError) -> DappError {
    DappError::RpcUnavailable(e.message)
}

#[derive(Clone)]
pub struct ChainScanner {
    rpc: Arc<dyn Eip1193>,
    settings: ScanSettings,
}

impl ChainScanner {
    pub fn new(rpc: Arc<dyn Eip1193>, settings: ScanSettings) -> Self {
        Self { rpc, settings }
    }

    /// First `n` transactions of the head block, in block order.
    pub async fn latest_transactions(
        &self,
        n: usize,
    ) -> Result<Scanned<TransactionRecord>, DappError> {
        let rpc = self.rpc.as_ref();
        let block = spells::get_block(rpc, BlockTag::Latest, true)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| DappError::RpcUnavailable("node returned no latest block".into()))?;
        let (number, ts) = (block.header.number, types::timestamp_ms(&block));

        let fetched = join_all(types::bodies(&block).iter().take(n).map(|tx| async move {
            spells::get_receipt(rpc, *tx.inner.inner().tx_hash())
                .await
                .map(|r| TransactionRecord::build(tx, number, ts, r.as_ref()))
        }))
        .await;

        let mut items = Vec::with_capacity(fetched.len());
        let mut skipped = 0;
        for res in fetched {
            match res {
                Ok(rec) => items.push(rec),
                Err(e) => {
                    log!(cc::LIGHT_GRAY, "receipt skipped: {}", e);
                    skipped += 1;
                }
            }
        }
        Ok(Scanned { items, skipped })
    }

    /// Walk `window_blocks` blocks back from the head in sequential batches of
    /// `batch_size` concurrent fetches, keeping transactions sent from or to
    /// `address`. Stops as soon as `limit` matches are found.
    pub async fn transactions_for_address(
        &self,
        address: Address,
        limit: usize,
    ) -> Result<Scanned<TransactionRecord>, DappError> {
        let rpc = self.rpc.as_ref();
        let head = spells::block_number(rpc).await.map_err(unavailable)?;
        let window = self.settings.window_blocks.max(1);
        let lowest = head.saturating_sub(window - 1);
        let numbers: Vec<u64> = (lowest..=head).rev().collect();

        let mut matches: Vec<(Transaction, u64, u64)> = Vec::new();
        let mut skipped = 0;
        for batch in numbers.chunks(self.settings.batch_size.max(1)) {
            if matches.len() >= limit {
                break;
            }
            let fetched = try_join_all(
                batch
                    .iter()
                    .map(|&n| spells::get_block(rpc, BlockTag::Number(n), true)),
            )
            .await;
            match fetched {
                Ok(blocks) => {
                    for block in blocks.into_iter().flatten() {
                        let (number, ts) = (block.header.number, types::timestamp_ms(&block));
                        matches.extend(
                            types::bodies(&block)
                                .iter()
                                .filter(|tx| types::touches(tx, address))
                                .map(|tx| (tx.clone(), number, ts)),
                        );
                    }
                }
                Err(e) => {
                    let (hi, lo) = (batch[0], batch[batch.len() - 1]);
                    warn!("scan: blocks {}..={} skipped: {}", lo, hi, e);
                    skipped += batch.len();
                }
            }
        }
        matches.truncate(limit);

        let fetched = join_all(matches.iter().map(|(tx, number, ts)| async move {
            spells::get_receipt(rpc, *tx.inner.inner().tx_hash())
                .await
                .map(|r| TransactionRecord::build(tx, *number, *ts, r.as_ref()))
        }))
        .await;

        let mut items = Vec::with_capacity(fetched.len());
        for res in fetched {
            match res {
                Ok(rec) => items.push(rec),
                Err(e) => {
                    log!(cc::LIGHT_GRAY, "receipt skipped: {}", e);
                    skipped += 1;
                }
            }
        }
        // stable: same-block transactions keep block order
        items.sort_by(|a, b| {
            b.timestamp_ms
                .cmp(&a.timestamp_ms)
                .then(b.block_number.cmp(&a.block_number))
        });
        items.truncate(limit);
        log!(
            cc::LIGHT_GRAY,
            "scan {}: {} match(es) in blocks {}..={}",
            address,
            items.len(),
            lowest,
            head
        );
        Ok(Scanned { items, skipped })
    }

    /// `n` most recent block headers, newest first.
    pub async fn latest_blocks(&self, n: usize) -> Result<Scanned<BlockRecord>, DappError> {
        let rpc = self.rpc.as_ref();
        let head = spells::block_number(rpc).await.map_err(unavailable)?;
        let numbers: Vec<u64> = (0..n as u64)
            .map_while(|back| head.checked_sub(back))
            .collect();

        let mut items = Vec::with_capacity(numbers.len());
        let mut skipped = 0;
        for batch in numbers.chunks(self.settings.batch_size.max(1)) {
            let fetched = join_all(
                batch
                    .iter()
                    .map(|&n| spells::get_block(rpc, BlockTag::Number(n), false)),
            )
            .await;
            for res in fetched {
                match res {
                    Ok(Some(block)) => items.push(BlockRecord::from(&block)),
                    Ok(None) => skipped += 1,
                    Err(e) => {
                        log!(cc::LIGHT_GRAY, "block skipped: {}", e);
                        skipped += 1;
                    }
                }
            }
        }
        Ok(Scanned { items, skipped })
    }

    pub async fn account_balance(
        &self,
        address: Address,
        symbol: &str,
    ) -> Result<Balance, DappError> {
        let wei = spells::get_balance(self.rpc.as_ref(), address)
            .await
            .map_err(unavailable)?;
        Ok(Balance {
            address,
            wei,
            formatted: format_native(wei, symbol),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::testing::{FakeChain, FakeTx};

    fn scanner(chain: &Arc<FakeChain>, window: u64, batch: usize) -> ChainScanner {
        ChainScanner::new(
            chain.clone(),
            ScanSettings {
                window_blocks: window,
                batch_size: batch,
            },
        )
    }

    #[tokio::test]
    async fn latest_block_statuses() {
        let chain = Arc::new(FakeChain::new(1));
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        chain.push_empty_range(1, 41);
        chain.push_block(
            42,
            1_042,
            vec![
                FakeTx::new(1, a, Some(b)),
                FakeTx::new(2, b, Some(a)).failed(),
                FakeTx::new(3, a, None),
            ],
        );

        let out = scanner(&chain, 10, 5).latest_transactions(10).await.unwrap();
        assert_eq!(out.skipped, 0);
        let statuses: Vec<TxStatus> = out.items.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![TxStatus::Success, TxStatus::Failed, TxStatus::Success]
        );
        assert!(out.items.iter().all(|r| r.block_number == 42));
        assert_eq!(out.items[0].timestamp_ms, 1_042_000);
        assert_eq!(out.items[0].gas_price_gwei, 1.0);
        assert_eq!(out.items[0].gas_used, 21_000);
    }

    #[tokio::test]
    async fn failed_receipt_is_skipped() {
        let chain = Arc::new(FakeChain::new(1));
        let (a, b) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let bad = FakeTx::new(2, a, Some(b));
        chain.fail_receipt(bad.hash);
        chain.push_block(5, 1_005, vec![FakeTx::new(1, a, Some(b)), bad]);

        let out = scanner(&chain, 10, 5).latest_transactions(10).await.unwrap();
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.skipped, 1);
        assert_eq!(
            out.partial_error(),
            Some(DappError::PartialFetch { skipped: 1 })
        );
    }

    #[tokio::test]
    async fn empty_window_is_not_an_error() {
        let chain = Arc::new(FakeChain::new(1));
        chain.push_empty_range(0, 150);
        let out = scanner(&chain, 100, 10)
            .transactions_for_address(Address::repeat_byte(9), 10)
            .await
            .unwrap();
        assert!(out.items.is_empty());
        assert_eq!(out.skipped, 0);
        assert_eq!(chain.count("eth_getBlockByNumber"), 100);
    }

    #[tokio::test]
    async fn address_history_matches_sorts_and_limits() {
        let chain = Arc::new(FakeChain::new(1));
        let me = Address::repeat_byte(0xaa);
        let other = Address::repeat_byte(0xbb);
        chain.push_empty_range(1, 30);
        chain.push_block(10, 1_010, vec![FakeTx::new(10, me, Some(other))]);
        chain.push_block(
            20,
            1_020,
            vec![
                FakeTx::new(20, other, Some(me)),
                FakeTx::new(21, other, Some(other)),
            ],
        );
        chain.push_block(25, 1_025, vec![FakeTx::new(25, other, Some(me)).failed()]);

        let s = scanner(&chain, 30, 4);
        let all = s.transactions_for_address(me, 10).await.unwrap();
        let blocks: Vec<u64> = all.items.iter().map(|r| r.block_number).collect();
        assert_eq!(blocks, vec![25, 20, 10]);
        assert!(all
            .items
            .iter()
            .all(|r| r.from == me || r.to == Some(me)));
        assert_eq!(all.items[0].status, TxStatus::Failed);
        assert!(all
            .items
            .windows(2)
            .all(|w| w[0].timestamp_ms >= w[1].timestamp_ms));

        let two = s.transactions_for_address(me, 2).await.unwrap();
        assert_eq!(two.items.len(), 2);
        assert_eq!(two.items[1].block_number, 20);
    }

    #[tokio::test]
    async fn stops_early_once_limit_is_reached() {
        let chain = Arc::new(FakeChain::new(1));
        let me = Address::repeat_byte(0xaa);
        chain.push_empty_range(1, 99);
        chain.push_block(100, 1_100, vec![FakeTx::new(1, me, None)]);

        scanner(&chain, 100, 5)
            .transactions_for_address(me, 1)
            .await
            .unwrap();
        assert_eq!(chain.count("eth_getBlockByNumber"), 5);
    }

    #[tokio::test]
    async fn failed_batch_is_skipped() {
        let chain = Arc::new(FakeChain::new(1));
        let me = Address::repeat_byte(0xaa);
        chain.push_empty_range(1, 20);
        chain.push_block(18, 1_018, vec![FakeTx::new(1, me, None)]);
        chain.push_block(12, 1_012, vec![FakeTx::new(2, me, None)]);
        chain.fail_block(17);

        let out = scanner(&chain, 20, 5)
            .transactions_for_address(me, 10)
            .await
            .unwrap();
        // blocks 16..=20 were one batch
        assert_eq!(out.skipped, 5);
        assert_eq!(out.items.len(), 1);
        assert_eq!(out.items[0].block_number, 12);
    }

    #[tokio::test]
    async fn unreachable_head_is_hard_error() {
        let chain = Arc::new(FakeChain::new(1));
        chain.go_offline();
        let err = scanner(&chain, 10, 5)
            .transactions_for_address(Address::ZERO, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, DappError::RpcUnavailable(_)));
    }

    #[tokio::test]
    async fn latest_blocks_newest_first() {
        let chain = Arc::new(FakeChain::new(1));
        chain.push_empty_range(0, 3);
        let out = scanner(&chain, 10, 2).latest_blocks(10).await.unwrap();
        let numbers: Vec<u64> = out.items.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![3, 2, 1, 0]);
        assert_eq!(out.items[0].timestamp_ms, 1_003_000);
        assert_eq!(out.items[0].gas_limit, 30_000_000);
    }

    #[tokio::test]
    async fn balance_is_formatted() {
        let chain = Arc::new(FakeChain::new(1));
        let who = Address::repeat_byte(1);
        chain.set_balance(who, U256::from(1_500_000_000_000_000_000u128));
        let bal = scanner(&chain, 10, 2)
            .account_balance(who, "ETH")
            .await
            .unwrap();
        assert_eq!(bal.formatted, "1.5 ETH");
    }

    #[test]
    fn pages() {
        let items: Vec<u32> = (0..23).collect();
        let p = paginate(&items, 10, 1);
        assert_eq!(p.items, (10..20).collect::<Vec<_>>());
        assert_eq!(p.total_pages, 3);
        let last = paginate(&items, 10, 99);
        assert_eq!(last.index, 2);
        assert_eq!(last.items.len(), 3);
        let empty = paginate::<u32>(&[], 10, 0);
        assert_eq!(empty.total_pages, 1);
        assert!(empty.items.is_empty());
    }
}
