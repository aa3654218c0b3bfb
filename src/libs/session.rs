//! Connection to a wallet: which provider, which accounts, which chain.
use std::sync::Arc;

use alloy::primitives::Address;
use futures_util::future::join_all;
use serde_json::json;

use crate::{
    constants::{network_by_chain_id, Network},
    error::{codes, DappError, ProviderRpcError},
    libs::{
        config::Config,
        identity::{Identity, IdentityResolver},
        rpc::{quantity, spells, Eip1193},
        wallet::{AddChainParams, Consent, ProviderChoice},
        writing::cc,
    },
    log, warn,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub address: Address,
    pub identity: Identity,
}

impl Account {
    pub fn label(&self) -> String {
        self.identity.label(&self.address)
    }
}

#[derive(Clone)]
pub struct WalletSession {
    pub kind: ProviderChoice,
    provider: Arc<dyn Eip1193>,
    pub accounts: Vec<Account>,
    active: usize,
    pub chain_id: u64,
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("kind", &self.kind)
            .field("accounts", &self.accounts)
            .field("active", &self.active)
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Inject the chosen provider and ask it for accounts.
pub async fn connect(
    choice: ProviderChoice,
    cfg: &Config,
    network: &'static Network,
    consent: Arc<dyn Consent>,
    resolver: &IdentityResolver,
) -> Result<WalletSession, DappError> {
    let provider = choice.inject(cfg, network, consent)?;
    WalletSession::connect_with(choice, provider, resolver).await
}

/// First provider that already has an authorized account wins. Never prompts.
pub async fn restore_session(
    candidates: Vec<(ProviderChoice, Arc<dyn Eip1193>)>,
    resolver: &IdentityResolver,
) -> Option<WalletSession> {
    for (kind, provider) in candidates {
        match WalletSession::restore_with(kind, provider, resolver).await {
            Ok(Some(session)) => return Some(session),
            Ok(None) => {}
            Err(e) => log!(cc::LIGHT_GRAY, "restore via {} skipped: {}", kind.label(), e),
        }
    }
    None
}

impl WalletSession {
    pub async fn connect_with(
        kind: ProviderChoice,
        provider: Arc<dyn Eip1193>,
        resolver: &IdentityResolver,
    ) -> Result<Self, DappError> {
        let addresses = spells::request_accounts(provider.as_ref()).await?;
        if addresses.is_empty() {
            return Err(DappError::NoAccount);
        }
        let chain_id = spells::chain_id(provider.as_ref()).await?;
        let session = Self::build(kind, provider, addresses, chain_id, resolver).await;
        log!(
            cc::LIGHT_GREEN,
            "connected via {}: {} account(s) on chain {}",
            kind.label(),
            session.accounts.len(),
            chain_id
        );
        Ok(session)
    }

    pub async fn restore_with(
        kind: ProviderChoice,
        provider: Arc<dyn Eip1193>,
        resolver: &IdentityResolver,
    ) -> Result<Option<Self>, DappError> {
        let addresses = spells::accounts(provider.as_ref()).await?;
        if addresses.is_empty() {
            return Ok(None);
        }
        let chain_id = spells::chain_id(provider.as_ref()).await?;
        Ok(Some(
            Self::build(kind, provider, addresses, chain_id, resolver).await,
        ))
    }

    async fn build(
        kind: ProviderChoice,
        provider: Arc<dyn Eip1193>,
        addresses: Vec<Address>,
        chain_id: u64,
        resolver: &IdentityResolver,
    ) -> Self {
        let accounts = resolve_all(provider.as_ref(), chain_id, &addresses, resolver).await;
        Self {
            kind,
            provider,
            accounts,
            active: 0,
            chain_id,
        }
    }

    pub fn provider(&self) -> Arc<dyn Eip1193> {
        self.provider.clone()
    }

    pub fn active(&self) -> &Account {
        &self.accounts[self.active]
    }

    pub fn active_address(&self) -> Address {
        self.active().address
    }

    pub fn network(&self) -> Option<&'static Network> {
        network_by_chain_id(self.chain_id)
    }

    pub fn select_address(&mut self, address: Address) -> Result<(), DappError> {
        let idx = self
            .accounts
            .iter()
            .position(|a| a.address == address)
            .ok_or(DappError::NoAccount)?;
        self.active = idx;
        Ok(())
    }

    /// Cycle to the next known account.
    pub fn select_next(&mut self) {
        self.active = (self.active + 1) % self.accounts.len();
    }

    /// Ask the wallet to move to `target`. Unknown chains (4902) are added
    /// and the switch retried once. Returns the updated session; `self` is
    /// left untouched so a failure keeps the old chain.
    pub async fn switch_network(
        &self,
        target: &'static Network,
        resolver: &IdentityResolver,
    ) -> Result<WalletSession, DappError> {
        let switch = json!([{ "chainId": quantity(target.chain_id) }]);
        match self
            .provider
            .request("wallet_switchEthereumChain", switch.clone())
            .await
        {
            Ok(_) => {}
            Err(e) if e.code == codes::UNRECOGNIZED_CHAIN => {
                log!(cc::YELLOW, "{} unknown to wallet, adding it", target.display_name);
                self.provider
                    .request(
                        "wallet_addEthereumChain",
                        json!([AddChainParams::for_network(target)]),
                    )
                    .await
                    .map_err(|e| switch_error(e, target))?;
                self.provider
                    .request("wallet_switchEthereumChain", switch)
                    .await
                    .map_err(|e| switch_error(e, target))?;
            }
            Err(e) => return Err(switch_error(e, target)),
        }

        let chain_id = spells::chain_id(self.provider.as_ref())
            .await
            .unwrap_or(target.chain_id);
        let addresses: Vec<Address> = self.accounts.iter().map(|a| a.address).collect();
        let accounts = resolve_all(self.provider.as_ref(), chain_id, &addresses, resolver).await;
        Ok(WalletSession {
            kind: self.kind,
            provider: self.provider.clone(),
            accounts,
            active: self.active,
            chain_id,
        })
    }

    /// Local state only; the wallet keeps its own authorization.
    pub fn disconnect(self) {
        log!(cc::LIGHT_GRAY, "disconnected from {}", self.kind.label());
    }
}

async fn resolve_all(
    rpc: &dyn Eip1193,
    chain_id: u64,
    addresses: &[Address],
    resolver: &IdentityResolver,
) -> Vec<Account> {
    let network = network_by_chain_id(chain_id);
    join_all(addresses.iter().map(|&address| async move {
        Account {
            address,
            identity: resolver.resolve(rpc, chain_id, network, address).await,
        }
    }))
    .await
}

fn switch_error(e: ProviderRpcError, target: &Network) -> DappError {
    if e.is_user_rejection() {
        return DappError::UserRejected;
    }
    warn!("switch to {} failed: {}", target.display_name, e);
    DappError::NetworkSwitchUnsupported {
        network: target.display_name.to_string(),
    }
}

/// Status line for a failed switch; always names the target network.
pub fn switch_failure_message(err: &DappError, target: &Network) -> String {
    match err {
        DappError::UserRejected => {
            format!("Switch to {} was rejected in the wallet", target.display_name)
        }
        DappError::NetworkSwitchUnsupported { .. } => {
            format!("Your wallet cannot switch to {}", target.display_name)
        }
        other => format!("Could not switch to {}: {}", target.display_name, other),
    }
}
