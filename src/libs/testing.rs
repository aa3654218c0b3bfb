//! Scripted in-memory chain + wallet for unit tests. Answers the JSON-RPC
//! methods the app uses from canned blocks, receipts and logs, and records
//! every request so tests can assert on what went over the wire.
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Mutex,
};

use alloy::{
    consensus::{
        self, transaction::Recovered, Eip658Value, Receipt, ReceiptEnvelope, ReceiptWithBloom,
        Signed, TxEnvelope, TxLegacy,
    },
    primitives::{keccak256, Address, Bloom, Bytes, Signature, TxKind, B256, U256},
    rpc::types::eth::{BlockTransactions, Header},
};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{
    error::{codes, ProviderRpcError},
    libs::rpc::{
        parse_quantity, quantity,
        types::{Block, Filter, Log, Transaction, TransactionReceipt},
        Eip1193,
    },
};

/// 1 gwei.
const GAS_PRICE: u128 = 1_000_000_000;
const GAS_LIMIT: u64 = 30_000_000;

#[derive(Debug, Clone)]
pub struct FakeTx {
    pub hash: B256,
    pub from: Address,
    pub to: Option<Address>,
    pub value: U256,
    pub success: bool,
}

impl FakeTx {
    pub fn new(seed: u64, from: Address, to: Option<Address>) -> Self {
        Self {
            hash: keccak256(seed.to_be_bytes()),
            from,
            to,
            value: U256::from(seed),
            success: true,
        }
    }

    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }
}

#[derive(Debug, Clone)]
struct FakeBlock {
    number: u64,
    timestamp: u64,
    txs: Vec<FakeTx>,
}

fn block_hash(number: u64) -> B256 {
    keccak256(number.to_le_bytes())
}

fn fake_transaction(t: &FakeTx, block: u64, index: u64) -> Transaction {
    let legacy = TxLegacy {
        chain_id: Some(1),
        nonce: index,
        gas_price: GAS_PRICE,
        gas_limit: 21_000,
        to: t.to.map_or(TxKind::Create, TxKind::Call),
        value: t.value,
        input: Bytes::new(),
    };
    let signature = Signature::new(U256::from(1), U256::from(1), false);
    let envelope = TxEnvelope::Legacy(Signed::new_unchecked(legacy, signature, t.hash));
    Transaction {
        inner: Recovered::new_unchecked(envelope, t.from),
        block_hash: Some(block_hash(block)),
        block_number: Some(block),
        transaction_index: Some(index),
        effective_gas_price: Some(GAS_PRICE),
    }
}

/// Block as a node would return it, with bodies or only hashes.
pub fn fake_block(number: u64, timestamp: u64, txs: &[FakeTx], full: bool) -> Block {
    let header = Header {
        hash: block_hash(number),
        inner: consensus::Header {
            number,
            timestamp,
            gas_used: 21_000 * txs.len() as u64,
            gas_limit: GAS_LIMIT,
            beneficiary: Address::repeat_byte(0x4d),
            ..Default::default()
        },
        total_difficulty: None,
        size: None,
    };
    let transactions = if full {
        BlockTransactions::Full(
            txs.iter()
                .enumerate()
                .map(|(i, t)| fake_transaction(t, number, i as u64))
                .collect(),
        )
    } else {
        BlockTransactions::Hashes(txs.iter().map(|t| t.hash).collect())
    };
    Block {
        header,
        uncles: Vec::new(),
        transactions,
        withdrawals: None,
    }
}

fn fake_receipt(
    hash: B256,
    from: Address,
    to: Option<Address>,
    success: bool,
    block: u64,
) -> TransactionReceipt {
    TransactionReceipt {
        inner: ReceiptEnvelope::Legacy(ReceiptWithBloom {
            receipt: Receipt {
                status: Eip658Value::Eip658(success),
                cumulative_gas_used: 21_000,
                logs: Vec::new(),
            },
            logs_bloom: Bloom::ZERO,
        }),
        transaction_hash: hash,
        transaction_index: Some(0),
        block_hash: Some(block_hash(block)),
        block_number: Some(block),
        gas_used: 21_000,
        effective_gas_price: GAS_PRICE,
        blob_gas_used: None,
        blob_gas_price: None,
        from,
        to,
        contract_address: None,
    }
}

#[derive(Default)]
struct Inner {
    blocks: BTreeMap<u64, FakeBlock>,
    failing_blocks: HashSet<u64>,
    failing_receipts: HashSet<B256>,
    extra_receipts: HashMap<B256, TransactionReceipt>,
    balances: HashMap<Address, U256>,
    logs: Vec<Log>,
    call_results: HashMap<(Address, [u8; 4]), Bytes>,
    calls: Vec<(String, Value)>,
    // wallet side
    chain_id: u64,
    accounts: Vec<Address>,
    authorized: bool,
    known_chains: HashSet<u64>,
    rejected_methods: HashSet<String>,
    switch_unsupported: bool,
    send_error: Option<ProviderRpcError>,
    sends_dropped: bool,
    sent: u64,
    offline: bool,
}

pub struct FakeChain {
    inner: Mutex<Inner>,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Self {
        let inner = Inner {
            chain_id,
            known_chains: HashSet::from([chain_id]),
            ..Default::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut g = self.inner.lock().unwrap();
        f(&mut g)
    }

    pub fn push_block(&self, number: u64, timestamp: u64, txs: Vec<FakeTx>) {
        self.with(|i| {
            i.blocks.insert(
                number,
                FakeBlock {
                    number,
                    timestamp,
                    txs,
                },
            );
        });
    }

    /// Empty blocks `from..=to`, one second apart.
    pub fn push_empty_range(&self, from: u64, to: u64) {
        for n in from..=to {
            self.push_block(n, 1_000 + n, Vec::new());
        }
    }

    pub fn fail_block(&self, number: u64) {
        self.with(|i| i.failing_blocks.insert(number));
    }

    pub fn fail_receipt(&self, hash: B256) {
        self.with(|i| i.failing_receipts.insert(hash));
    }

    pub fn set_balance(&self, who: Address, wei: U256) {
        self.with(|i| i.balances.insert(who, wei));
    }

    pub fn push_log(&self, log: Log) {
        self.with(|i| i.logs.push(log));
    }

    pub fn set_call_result(&self, to: Address, selector: [u8; 4], ret: Bytes) {
        self.with(|i| i.call_results.insert((to, selector), ret));
    }

    pub fn set_accounts(&self, accounts: Vec<Address>, authorized: bool) {
        self.with(|i| {
            i.accounts = accounts;
            i.authorized = authorized;
        });
    }

    pub fn reject(&self, method: &str) {
        self.with(|i| i.rejected_methods.insert(method.to_string()));
    }

    pub fn forbid_switching(&self) {
        self.with(|i| i.switch_unsupported = true);
    }

    pub fn fail_sends_with(&self, err: ProviderRpcError) {
        self.with(|i| i.send_error = Some(err));
    }

    /// Sends return a hash but the transaction never gets a receipt.
    pub fn drop_sends(&self) {
        self.with(|i| i.sends_dropped = true);
    }

    pub fn go_offline(&self) {
        self.with(|i| i.offline = true);
    }

    pub fn current_chain(&self) -> u64 {
        self.with(|i| i.chain_id)
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.with(|i| i.calls.clone())
    }

    pub fn count(&self, method: &str) -> usize {
        self.with(|i| i.calls.iter().filter(|(m, _)| m == method).count())
    }

    fn head(i: &Inner) -> u64 {
        i.blocks.keys().next_back().copied().unwrap_or(0)
    }

    fn handle(i: &mut Inner, method: &str, params: &Value) -> Result<Value, ProviderRpcError> {
        if i.rejected_methods.contains(method) {
            return Err(ProviderRpcError::user_rejected());
        }
        match method {
            "eth_chainId" => Ok(json!(quantity(i.chain_id))),
            "eth_blockNumber" => Ok(json!(quantity(Self::head(i)))),
            "eth_getBlockByNumber" => {
                let n = match params[0].as_str() {
                    Some("latest") => Self::head(i),
                    _ => parse_quantity(&params[0])?,
                };
                if i.failing_blocks.contains(&n) {
                    return Err(ProviderRpcError::transport(format!("block {n} timed out")));
                }
                let full = params[1].as_bool().unwrap_or(false);
                Ok(i
                    .blocks
                    .get(&n)
                    .map(|b| json!(fake_block(b.number, b.timestamp, &b.txs, full)))
                    .unwrap_or(Value::Null))
            }
            "eth_getTransactionReceipt" => {
                let hash: B256 = serde_json::from_value(params[0].clone())
                    .map_err(|e| ProviderRpcError::transport(e.to_string()))?;
                if i.failing_receipts.contains(&hash) {
                    return Err(ProviderRpcError::transport("receipt timed out"));
                }
                if let Some(r) = i.extra_receipts.get(&hash) {
                    return Ok(json!(r));
                }
                Ok(i
                    .blocks
                    .values()
                    .find_map(|b| {
                        b.txs
                            .iter()
                            .find(|t| t.hash == hash)
                            .map(|t| json!(fake_receipt(t.hash, t.from, t.to, t.success, b.number)))
                    })
                    .unwrap_or(Value::Null))
            }
            "eth_getBalance" => {
                let who: Address = serde_json::from_value(params[0].clone())
                    .map_err(|e| ProviderRpcError::transport(e.to_string()))?;
                Ok(json!(i.balances.get(&who).copied().unwrap_or_default()))
            }
            "eth_getLogs" => {
                let filter: Filter = serde_json::from_value(params[0].clone())
                    .map_err(|e| ProviderRpcError::transport(e.to_string()))?;
                let sender = &filter.topics[1];
                let logs: Vec<&Log> = i
                    .logs
                    .iter()
                    .filter(|l| {
                        sender.is_empty() || l.topics().get(1).is_some_and(|t| sender.matches(t))
                    })
                    .collect();
                Ok(json!(logs))
            }
            "eth_call" => {
                let to: Address = serde_json::from_value(params[0]["to"].clone())
                    .map_err(|e| ProviderRpcError::transport(e.to_string()))?;
                let data: Bytes = serde_json::from_value(params[0]["data"].clone())
                    .map_err(|e| ProviderRpcError::transport(e.to_string()))?;
                let mut selector = [0u8; 4];
                if data.len() >= 4 {
                    selector.copy_from_slice(&data[..4]);
                }
                i.call_results
                    .get(&(to, selector))
                    .map(|b| json!(b))
                    .ok_or_else(|| ProviderRpcError::new(codes::SERVER, "execution reverted"))
            }
            "eth_accounts" => Ok(json!(if i.authorized {
                i.accounts.clone()
            } else {
                Vec::new()
            })),
            "eth_requestAccounts" => {
                i.authorized = true;
                Ok(json!(i.accounts))
            }
            "wallet_switchEthereumChain" => {
                if i.switch_unsupported {
                    return Err(ProviderRpcError::unsupported(method));
                }
                let target = parse_quantity(&params[0]["chainId"])?;
                if !i.known_chains.contains(&target) {
                    return Err(ProviderRpcError::new(
                        codes::UNRECOGNIZED_CHAIN,
                        "Unrecognized chain ID",
                    ));
                }
                i.chain_id = target;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let target = parse_quantity(&params[0]["chainId"])?;
                i.known_chains.insert(target);
                Ok(Value::Null)
            }
            "eth_sendTransaction" => {
                if !i.authorized {
                    return Err(ProviderRpcError::unauthorized("not authorized"));
                }
                if let Some(err) = i.send_error.clone() {
                    return Err(err);
                }
                i.sent += 1;
                let hash = keccak256(format!("sent-{}", i.sent));
                if !i.sends_dropped {
                    let from: Address =
                        serde_json::from_value(params[0]["from"].clone()).unwrap_or_default();
                    let to: Option<Address> =
                        serde_json::from_value(params[0]["to"].clone()).unwrap_or_default();
                    let head = Self::head(i);
                    i.extra_receipts
                        .insert(hash, fake_receipt(hash, from, to, true, head));
                }
                Ok(json!(hash))
            }
            other => Err(ProviderRpcError::unsupported(other)),
        }
    }
}

#[async_trait]
impl Eip1193 for FakeChain {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let mut g = self.inner.lock().unwrap();
        g.calls.push((method.to_string(), params.clone()));
        if g.offline {
            return Err(ProviderRpcError::transport("connection refused"));
        }
        Self::handle(&mut g, method, &params)
    }
}
