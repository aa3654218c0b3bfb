//! Human-readable names and avatars for addresses.
//!
//! Resolution is best-effort: ENS reverse records where the chain has an ENS
//! registry, a deterministic placeholder otherwise. Nothing here returns an
//! error to the caller.
use std::sync::Arc;

use alloy::{
    primitives::{address, keccak256, Address, Bytes, B256},
    sol_types::SolCall,
};
use dashmap::DashMap;

use crate::{
    constants::Network,
    error::ProviderRpcError,
    libs::{
        format::short_addr,
        rpc::{spells, Eip1193},
        writing::cc,
    },
    log,
};

/// Canonical ENS registry, same address on mainnet and Sepolia.
pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

alloy::sol! {
    interface IEnsRegistry {
        function resolver(bytes32 node) external view returns (address);
    }

    interface IEnsResolver {
        function name(bytes32 node) external view returns (string);
        function addr(bytes32 node) external view returns (address);
        function text(bytes32 node, string key) external view returns (string);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: Option<String>,
    pub avatar: Option<String>,
    /// Stable 6-hex-digit colour tag derived from the address, shown in place
    /// of an avatar.
    pub tag: String,
}

impl Identity {
    pub fn placeholder(address: Address) -> Self {
        let digest = keccak256(address);
        Self {
            name: None,
            avatar: None,
            tag: format!("#{}", hex::encode(&digest[..3])),
        }
    }

    pub fn label(&self, address: &Address) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => short_addr(address),
        }
    }
}

/// EIP-137 namehash.
pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}

/// Caches identities per (chain, address); shared by clones.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    cache: Arc<DashMap<(u64, Address), Identity>>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(
        &self,
        rpc: &dyn Eip1193,
        chain_id: u64,
        network: Option<&Network>,
        address: Address,
    ) -> Identity {
        if let Some(hit) = self.cache.get(&(chain_id, address)) {
            return hit.clone();
        }
        let mut identity = Identity::placeholder(address);
        if network.is_some_and(|n| n.has_ens) {
            match reverse_lookup(rpc, address).await {
                Ok(Some((name, avatar))) => {
                    identity.name = Some(name);
                    identity.avatar = avatar;
                }
                Ok(None) => {}
                // not cached, the next resolve tries again
                Err(e) => {
                    log!(cc::LIGHT_GRAY, "ens lookup for {} skipped: {}", address, e);
                    return identity;
                }
            }
        }
        self.cache.insert((chain_id, address), identity.clone());
        identity
    }
}

async fn ens_call<C: SolCall>(
    rpc: &dyn Eip1193,
    to: Address,
    call: C,
) -> Result<C::Return, ProviderRpcError> {
    let out = spells::call(rpc, to, Bytes::from(call.abi_encode())).await?;
    C::abi_decode_returns(&out)
        .map_err(|e| ProviderRpcError::transport(format!("ens decode: {e}")))
}

async fn resolver_of(rpc: &dyn Eip1193, node: B256) -> Result<Address, ProviderRpcError> {
    ens_call(rpc, ENS_REGISTRY, IEnsRegistry::resolverCall { node }).await
}

/// Reverse record, accepted only if the name resolves forward to the same
/// address.
async fn reverse_lookup(
    rpc: &dyn Eip1193,
    address: Address,
) -> Result<Option<(String, Option<String>)>, ProviderRpcError> {
    let reverse = namehash(&format!("{}.addr.reverse", hex::encode(address)));
    let resolver = resolver_of(rpc, reverse).await?;
    if resolver == Address::ZERO {
        return Ok(None);
    }
    let name = ens_call(rpc, resolver, IEnsResolver::nameCall { node: reverse }).await?;
    if name.is_empty() {
        return Ok(None);
    }

    let forward = namehash(&name);
    let fwd_resolver = resolver_of(rpc, forward).await?;
    if fwd_resolver == Address::ZERO {
        return Ok(None);
    }
    let resolved = ens_call(rpc, fwd_resolver, IEnsResolver::addrCall { node: forward }).await?;
    if resolved != address {
        return Ok(None);
    }

    let avatar = ens_call(
        rpc,
        fwd_resolver,
        IEnsResolver::textCall {
            node: forward,
            key: "avatar".to_string(),
        },
    )
    .await
    .ok()
    .filter(|a| !a.is_empty());
    Ok(Some((name, avatar)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::network_by_id, libs::testing::FakeChain};
    use alloy::{primitives::b256, sol_types::SolValue};

    #[test]
    fn namehash_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
    }

    #[test]
    fn placeholder_is_deterministic() {
        let a = Address::repeat_byte(0x42);
        assert_eq!(Identity::placeholder(a), Identity::placeholder(a));
        assert_ne!(
            Identity::placeholder(a).tag,
            Identity::placeholder(Address::repeat_byte(0x43)).tag
        );
        assert_eq!(Identity::placeholder(a).tag.len(), 7);
    }

    #[tokio::test]
    async fn chain_without_ens_never_calls() {
        let chain = FakeChain::new(31_337);
        let resolver = IdentityResolver::new();
        let who = Address::repeat_byte(1);
        let id = resolver
            .resolve(&chain, 31_337, network_by_id("localhost"), who)
            .await;
        assert_eq!(id, Identity::placeholder(who));
        assert_eq!(chain.count("eth_call"), 0);
    }

    #[tokio::test]
    async fn lookup_failure_falls_back_silently() {
        // No canned eth_call results: every call reverts.
        let chain = FakeChain::new(11_155_111);
        let resolver = IdentityResolver::new();
        let who = Address::repeat_byte(2);
        let id = resolver
            .resolve(&chain, 11_155_111, network_by_id("sepolia"), who)
            .await;
        assert!(id.name.is_none());
        assert_eq!(chain.count("eth_call"), 1);

        // failures are retried, not remembered
        resolver
            .resolve(&chain, 11_155_111, network_by_id("sepolia"), who)
            .await;
        assert_eq!(chain.count("eth_call"), 2);
    }

    #[tokio::test]
    async fn reverse_record_with_avatar() {
        let chain = FakeChain::new(11_155_111);
        let who = Address::repeat_byte(3);
        let resolver_addr = Address::repeat_byte(0xee);
        chain.set_call_result(
            ENS_REGISTRY,
            IEnsRegistry::resolverCall::SELECTOR,
            resolver_addr.abi_encode().into(),
        );
        chain.set_call_result(
            resolver_addr,
            IEnsResolver::nameCall::SELECTOR,
            ("alice.eth".to_string(),).abi_encode_params().into(),
        );
        chain.set_call_result(
            resolver_addr,
            IEnsResolver::addrCall::SELECTOR,
            who.abi_encode().into(),
        );
        chain.set_call_result(
            resolver_addr,
            IEnsResolver::textCall::SELECTOR,
            ("ipfs://avatar".to_string(),).abi_encode_params().into(),
        );

        let resolver = IdentityResolver::new();
        let sepolia = network_by_id("sepolia");
        let id = resolver.resolve(&chain, 11_155_111, sepolia, who).await;
        assert_eq!(id.name.as_deref(), Some("alice.eth"));
        assert_eq!(id.avatar.as_deref(), Some("ipfs://avatar"));
        assert_eq!(id.label(&who), "alice.eth");

        // second resolve is served from cache
        let before = chain.count("eth_call");
        resolver.resolve(&chain, 11_155_111, sepolia, who).await;
        assert_eq!(chain.count("eth_call"), before);
    }

    #[tokio::test]
    async fn forward_mismatch_is_ignored() {
        let chain = FakeChain::new(1);
        let who = Address::repeat_byte(4);
        let resolver_addr = Address::repeat_byte(0xee);
        chain.set_call_result(
            ENS_REGISTRY,
            IEnsRegistry::resolverCall::SELECTOR,
            resolver_addr.abi_encode().into(),
        );
        chain.set_call_result(
            resolver_addr,
            IEnsResolver::nameCall::SELECTOR,
            ("spoof.eth".to_string(),).abi_encode_params().into(),
        );
        chain.set_call_result(
            resolver_addr,
            IEnsResolver::addrCall::SELECTOR,
            Address::repeat_byte(5).abi_encode().into(),
        );
        let id = IdentityResolver::new()
            .resolve(&chain, 1, network_by_id("mainnet"), who)
            .await;
        assert!(id.name.is_none());
    }
}
