//! User approval for wallet actions. The local-key wallet has no UI of its
//! own, so it asks through this seam and the terminal UI answers.
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

use crate::libs::format::{ether_decimal, short_addr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Connect {
        accounts: Vec<Address>,
    },
    SwitchChain {
        chain_id: u64,
    },
    AddChain {
        chain_id: u64,
        name: String,
        rpc_url: String,
    },
    SendTransaction {
        from: Address,
        to: Option<Address>,
        value: U256,
        data_len: usize,
    },
}

impl Prompt {
    pub fn title(&self) -> &'static str {
        match self {
            Prompt::Connect { .. } => "Connect wallet",
            Prompt::SwitchChain { .. } => "Switch network",
            Prompt::AddChain { .. } => "Add network",
            Prompt::SendTransaction { .. } => "Confirm transaction",
        }
    }

    pub fn lines(&self) -> Vec<String> {
        match self {
            Prompt::Connect { accounts } => {
                let mut v = vec![format!("Share {} account(s) with dappterm?", accounts.len())];
                v.extend(accounts.iter().map(|a| format!("  {a}")));
                v
            }
            Prompt::SwitchChain { chain_id } => vec![format!("Switch to chain {chain_id}?")],
            Prompt::AddChain {
                chain_id,
                name,
                rpc_url,
            } => vec![
                format!("Allow this app to add {name}?"),
                format!("  chain id: {chain_id}"),
                format!("  rpc: {rpc_url}"),
            ],
            Prompt::SendTransaction {
                from,
                to,
                value,
                data_len,
            } => vec![
                format!("From:  {}", short_addr(from)),
                format!(
                    "To:    {}",
                    to.map(|a| a.to_checksum(None))
                        .unwrap_or_else(|| "contract creation".into())
                ),
                format!("Value: {}", ether_decimal(*value)),
                format!("Data:  {data_len} byte(s)"),
            ],
        }
    }
}

#[async_trait]
pub trait Consent: Send + Sync {
    async fn approve(&self, prompt: Prompt) -> bool;
}

/// Approves everything. For scripted use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoApprove;

#[async_trait]
impl Consent for AutoApprove {
    async fn approve(&self, _prompt: Prompt) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct ConsentRequest {
    pub prompt: Prompt,
    pub reply: oneshot::Sender<bool>,
}

/// Forwards prompts to whoever holds the receiver (the UI loop). A dropped
/// channel or reply counts as a refusal.
#[derive(Debug, Clone)]
pub struct ChannelConsent {
    tx: mpsc::Sender<ConsentRequest>,
}

impl ChannelConsent {
    pub fn new(tx: mpsc::Sender<ConsentRequest>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Consent for ChannelConsent {
    async fn approve(&self, prompt: Prompt) -> bool {
        let (reply, answer) = oneshot::channel();
        if self.tx.send(ConsentRequest { prompt, reply }).await.is_err() {
            return false;
        }
        answer.await.unwrap_or(false)
    }
}
