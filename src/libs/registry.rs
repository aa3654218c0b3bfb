//! The message registry: a contract holding one string, emitting
//! `MessageChanged` on every write.
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use alloy::{
    primitives::{Address, Bytes, B256},
    sol_types::{SolCall, SolEvent},
};
use futures_util::future::join_all;
use serde::Deserialize;

use crate::{
    error::{DappError, InputError},
    libs::{
        rpc::{
            spells::{self, BlockTag},
            types::{timestamp_ms, Filter},
            Eip1193,
        },
        transfer::{submit_transaction, TransferSettings, TransferState, TxPlan},
        writing::cc,
    },
    log, warn,
};

alloy::sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface IMessageRegistry {
        event MessageChanged(address indexed sender, string oldMessage, string newMessage);
        function getMessage() external view returns (string);
        function setMessage(string newMessage) external;
    }
}

const DEPLOYMENTS: &str = include_str!("../../contracts/registry.json");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub address: Address,
    #[serde(default)]
    pub deploy_block: u64,
}

/// Where the registry lives on `chain_id`. An explicit address wins over the
/// bundled artifact and is scanned from genesis.
pub fn deployment_for(chain_id: u64, explicit: Option<Address>) -> Result<Deployment, DappError> {
    if let Some(address) = explicit {
        return Ok(Deployment {
            address,
            deploy_block: 0,
        });
    }
    let all: HashMap<String, Deployment> = serde_json::from_str(DEPLOYMENTS)?;
    all.get(&chain_id.to_string())
        .copied()
        .ok_or(DappError::NoRegistry(chain_id))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChangeEvent {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub log_index: u64,
    pub sender: Address,
    pub old_message: String,
    pub new_message: String,
    pub timestamp_ms: u64,
}

#[derive(Clone)]
pub struct MessageRegistry {
    rpc: Arc<dyn Eip1193>,
    deployment: Deployment,
}

impl MessageRegistry {
    pub fn new(rpc: Arc<dyn Eip1193>, deployment: Deployment) -> Self {
        Self { rpc, deployment }
    }

    pub fn address(&self) -> Address {
        self.deployment.address
    }

    pub async fn read_current_message(&self) -> Result<String, DappError> {
        let data = IMessageRegistry::getMessageCall {}.abi_encode();
        let out = spells::call(self.rpc.as_ref(), self.deployment.address, Bytes::from(data)).await?;
        IMessageRegistry::getMessageCall::abi_decode_returns(&out)
            .map_err(|e| DappError::Decode(format!("getMessage: {e}")))
    }

    /// `setMessage(text)` through the regular transaction flow, zero value.
    pub async fn submit_message<F>(
        &self,
        from: Address,
        text: &str,
        settings: &TransferSettings,
        on_state: F,
    ) -> Result<TransferState, InputError>
    where
        F: FnMut(&TransferState) + Send,
    {
        if text.trim().is_empty() {
            return Err(InputError::EmptyMessage);
        }
        let data = IMessageRegistry::setMessageCall {
            newMessage: text.to_string(),
        }
        .abi_encode();
        let plan = TxPlan {
            to: self.deployment.address,
            value: Default::default(),
            data: Some(Bytes::from(data)),
        };
        Ok(submit_transaction(self.rpc.as_ref(), from, plan, settings, on_state).await)
    }

    /// Every `MessageChanged` since deployment, newest first. Ties on
    /// timestamp fall back to block number, then log index.
    pub async fn list_change_history(
        &self,
        sender: Option<Address>,
    ) -> Result<Vec<MessageChangeEvent>, DappError> {
        let rpc = self.rpc.as_ref();
        let mut filter = Filter::new()
            .address(self.deployment.address)
            .from_block(self.deployment.deploy_block)
            .event_signature(IMessageRegistry::MessageChanged::SIGNATURE_HASH);
        if let Some(s) = sender {
            filter = filter.topic1(s.into_word());
        }
        let logs = spells::get_logs(rpc, &filter)
            .await
            .map_err(|e| DappError::RpcUnavailable(e.message))?;

        let blocks: BTreeSet<u64> = logs
            .iter()
            .filter_map(|l| l.block_number)
            .collect();
        let stamps: HashMap<u64, u64> = join_all(blocks.into_iter().map(|n| async move {
            match spells::get_block(rpc, BlockTag::Number(n), false).await {
                Ok(Some(b)) => (n, timestamp_ms(&b)),
                Ok(None) => (n, 0),
                Err(e) => {
                    log!(cc::LIGHT_GRAY, "timestamp for block {} unavailable: {}", n, e);
                    (n, 0)
                }
            }
        }))
        .await
        .into_iter()
        .collect();

        let mut events: Vec<MessageChangeEvent> = logs
            .iter()
            .filter_map(|l| {
                let decoded = match IMessageRegistry::MessageChanged::decode_raw_log(
                    l.topics().iter().copied(),
                    &l.data().data,
                ) {
                    Ok(ev) => ev,
                    Err(e) => {
                        warn!("undecodable MessageChanged log: {}", e);
                        return None;
                    }
                };
                let block_number = l.block_number.unwrap_or(0);
                Some(MessageChangeEvent {
                    transaction_hash: l.transaction_hash.unwrap_or_default(),
                    block_number,
                    log_index: l.log_index.unwrap_or(0),
                    sender: decoded.sender,
                    old_message: decoded.oldMessage,
                    new_message: decoded.newMessage,
                    timestamp_ms: stamps.get(&block_number).copied().unwrap_or(0),
                })
            })
            .collect();
        events.sort_by(|a, b| {
            b.timestamp_ms
                .cmp(&a.timestamp_ms)
                .then(b.block_number.cmp(&a.block_number))
                .then(b.log_index.cmp(&a.log_index))
        });
        Ok(events)
    }
}
