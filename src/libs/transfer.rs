//! Native transfers (with optional call data) through the connected wallet,
//! tracked as a small state machine the UI renders.
use std::time::Duration;

use alloy::primitives::{utils::parse_ether, Address, Bytes, B256, U256};
use serde_json::json;

use crate::{
    error::{codes, DappError, InputError},
    libs::{
        rpc::{spells, Eip1193},
        wallet::SendTxParams,
        writing::cc,
    },
    log, warn,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    /// Blocks on top of (and including) the one holding the transaction.
    pub confirmations: u64,
    pub poll_interval: Duration,
    /// Receipt polls before giving up on a transaction the node never mines
    /// (dropped from the mempool, replaced).
    pub max_polls: u32,
    /// How long a failure stays on screen before the form resets.
    pub reset_delay: Duration,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            confirmations: 1,
            poll_interval: Duration::from_millis(1_500),
            max_polls: 400,
            reset_delay: Duration::from_secs(5),
        }
    }
}

/// `0x` + 40 hex digits. All-lower and all-upper are accepted as-is; anything
/// mixed-case must match its EIP-55 checksum.
pub fn parse_address(input: &str) -> Result<Address, InputError> {
    let s = input.trim();
    let digits = s
        .strip_prefix("0x")
        .filter(|d| d.len() == 40 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| InputError::BadAddress(s.to_string()))?;
    let addr: Address = s
        .parse()
        .map_err(|_| InputError::BadAddress(s.to_string()))?;

    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper && addr.to_checksum(None) != s {
        return Err(InputError::BadChecksum(s.to_string()));
    }
    Ok(addr)
}

/// Decimal amount in whole native units (`0.01`), converted to wei.
pub fn parse_amount(input: &str) -> Result<U256, InputError> {
    let s = input.trim();
    if s.starts_with('-') {
        return Err(InputError::BadAmount(s.to_string()));
    }
    let wei = parse_ether(s).map_err(|_| InputError::BadAmount(s.to_string()))?;
    if wei.is_zero() {
        return Err(InputError::NonPositiveAmount);
    }
    Ok(wei)
}

/// Empty input means no call data.
pub fn parse_call_data(input: &str) -> Result<Option<Bytes>, InputError> {
    let s = input.trim();
    if s.is_empty() {
        return Ok(None);
    }
    let body = s
        .strip_prefix("0x")
        .ok_or_else(|| InputError::BadCallData("missing 0x prefix".into()))?;
    let raw = hex::decode(body).map_err(|e| InputError::BadCallData(e.to_string()))?;
    Ok((!raw.is_empty()).then(|| Bytes::from(raw)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub recipient: Address,
    pub amount: U256,
    pub call_data: Option<Bytes>,
}

impl TransferRequest {
    pub fn parse(recipient: &str, amount: &str, call_data: &str) -> Result<Self, InputError> {
        Ok(Self {
            recipient: parse_address(recipient)?,
            amount: parse_amount(amount)?,
            call_data: parse_call_data(call_data)?,
        })
    }
}

/// What actually goes to `eth_sendTransaction`. Unlike [`TransferRequest`]
/// the value may be zero (contract calls).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxPlan {
    pub to: Address,
    pub value: U256,
    pub data: Option<Bytes>,
}

impl From<TransferRequest> for TxPlan {
    fn from(r: TransferRequest) -> Self {
        Self {
            to: r.recipient,
            value: r.amount,
            data: r.call_data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UserCancelled,
    InsufficientFundsOrNetwork,
    Other,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::UserCancelled => "Cancelled in wallet",
            FailureKind::InsufficientFundsOrNetwork => "Insufficient funds or network error",
            FailureKind::Other => "Transaction failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransferState {
    #[default]
    Idle,
    Preparing,
    Pending {
        hash: B256,
    },
    Confirmed {
        hash: B256,
        block_number: u64,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl TransferState {
    pub fn can_advance_to(&self, next: &TransferState) -> bool {
        use TransferState::*;
        matches!(
            (self, next),
            (Idle, Preparing)
                | (Preparing, Pending { .. })
                | (Pending { .. }, Confirmed { .. })
                | (Preparing, Failed { .. })
                | (Pending { .. }, Failed { .. })
                | (Failed { .. }, Idle)
                | (Confirmed { .. }, Idle)
        )
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, TransferState::Preparing | TransferState::Pending { .. })
    }

    pub fn label(&self) -> String {
        match self {
            TransferState::Idle => "Idle".into(),
            TransferState::Preparing => "Preparing…".into(),
            TransferState::Pending { hash } => format!("Pending {hash}"),
            TransferState::Confirmed { hash, block_number } => {
                format!("Confirmed {hash} in block {block_number}")
            }
            TransferState::Failed { kind, message } => format!("{}: {}", kind.label(), message),
        }
    }
}

pub fn classify(err: &DappError) -> FailureKind {
    match err {
        DappError::UserRejected => FailureKind::UserCancelled,
        DappError::RpcUnavailable(_) => FailureKind::InsufficientFundsOrNetwork,
        DappError::Wallet(e) => {
            let msg = e.message.to_ascii_lowercase();
            if msg.contains("insufficient funds")
                || matches!(
                    e.code,
                    codes::SERVER | codes::INTERNAL | codes::DISCONNECTED
                )
            {
                FailureKind::InsufficientFundsOrNetwork
            } else {
                FailureKind::Other
            }
        }
        _ => FailureKind::Other,
    }
}

/// Owns the current state and only lets legal transitions through. Every
/// accepted state is handed to `on_state`.
pub struct TransferMachine<F: FnMut(&TransferState)> {
    state: TransferState,
    on_state: F,
}

impl<F: FnMut(&TransferState)> TransferMachine<F> {
    pub fn new(on_state: F) -> Self {
        Self {
            state: TransferState::Idle,
            on_state,
        }
    }

    pub fn state(&self) -> &TransferState {
        &self.state
    }

    fn advance(&mut self, next: TransferState) {
        if !self.state.can_advance_to(&next) {
            warn!("transfer: ignoring {:?} -> {:?}", self.state, next);
            return;
        }
        self.state = next;
        (self.on_state)(&self.state);
    }

    fn fail(&mut self, err: &DappError) {
        let kind = classify(err);
        warn!("transfer failed ({:?}): {}", kind, err);
        self.advance(TransferState::Failed {
            kind,
            message: err.to_string(),
        });
    }
}

/// Validate form input, then run it through [`submit_transaction`]. Invalid
/// input is returned before any request is made.
pub async fn send_transfer<R, F>(
    rpc: &R,
    from: Address,
    recipient: &str,
    amount: &str,
    call_data: &str,
    settings: &TransferSettings,
    on_state: F,
) -> Result<TransferState, InputError>
where
    R: Eip1193 + ?Sized,
    F: FnMut(&TransferState) + Send,
{
    let request = TransferRequest::parse(recipient, amount, call_data)?;
    Ok(submit_transaction(rpc, from, request.into(), settings, on_state).await)
}

/// Drive one transaction from `Preparing` to `Confirmed` or `Failed`.
/// Returns the terminal state; after a failure `on_state` additionally sees
/// `Idle` once `reset_delay` has passed.
pub async fn submit_transaction<R, F>(
    rpc: &R,
    from: Address,
    plan: TxPlan,
    settings: &TransferSettings,
    on_state: F,
) -> TransferState
where
    R: Eip1193 + ?Sized,
    F: FnMut(&TransferState) + Send,
{
    let mut machine = TransferMachine::new(on_state);
    machine.advance(TransferState::Preparing);

    match run(rpc, from, plan, settings, &mut machine).await {
        Ok(()) => machine.state().clone(),
        Err(e) => {
            machine.fail(&e);
            let terminal = machine.state().clone();
            tokio::time::sleep(settings.reset_delay).await;
            machine.advance(TransferState::Idle);
            terminal
        }
    }
}

async fn run<R, F>(
    rpc: &R,
    from: Address,
    plan: TxPlan,
    settings: &TransferSettings,
    machine: &mut TransferMachine<F>,
) -> Result<(), DappError>
where
    R: Eip1193 + ?Sized,
    F: FnMut(&TransferState),
{
    let authorized = spells::accounts(rpc).await?;
    if !authorized.contains(&from) {
        return Err(DappError::NoAccount);
    }

    let params = SendTxParams {
        from,
        to: Some(plan.to),
        value: Some(plan.value),
        data: plan.data,
    };
    let raw = rpc
        .request("eth_sendTransaction", json!([params]))
        .await?;
    let hash: B256 = serde_json::from_value(raw)?;
    log!(cc::CYAN, "transfer pending: {}", hash);
    machine.advance(TransferState::Pending { hash });

    let block_number = wait_for_confirmations(rpc, hash, settings).await?;
    log!(cc::LIGHT_GREEN, "transfer confirmed: {} in block {}", hash, block_number);
    machine.advance(TransferState::Confirmed { hash, block_number });
    Ok(())
}

async fn wait_for_confirmations<R: Eip1193 + ?Sized>(
    rpc: &R,
    hash: B256,
    settings: &TransferSettings,
) -> Result<u64, DappError> {
    let needed = settings.confirmations.max(1);
    let polls = settings.max_polls.max(1);
    for _ in 0..polls {
        if let Some(receipt) = spells::get_receipt(rpc, hash).await? {
            if !receipt.status() {
                return Err(DappError::Reverted(hash.to_string()));
            }
            if let Some(mined) = receipt.block_number {
                let head = spells::block_number(rpc).await?;
                if head.saturating_sub(mined) + 1 >= needed {
                    return Ok(mined);
                }
            }
        }
        tokio::time::sleep(settings.poll_interval).await;
    }
    Err(DappError::ReceiptTimeout {
        hash: hash.to_string(),
        polls,
    })
}
