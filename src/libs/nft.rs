//! Optional NFT listing through Alchemy's NFT REST API (v3).
use alloy::primitives::Address;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;

use crate::{constants::Network, error::DappError, libs::writing::cc, log};

const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedNft {
    pub contract: Address,
    pub collection: Option<String>,
    pub token_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub token_type: String,
    pub balance: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnedPage {
    #[serde(default)]
    owned_nfts: Vec<RawNft>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNft {
    contract: RawContract,
    token_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    balance: Option<String>,
    #[serde(default)]
    image: Option<RawImage>,
}

#[derive(Debug, Deserialize)]
struct RawContract {
    address: Address,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImage {
    #[serde(default)]
    cached_url: Option<String>,
    #[serde(default)]
    original_url: Option<String>,
}

pub fn parse_owned_nfts(v: Value) -> Result<Vec<OwnedNft>, DappError> {
    let page: OwnedPage = serde_json::from_value(v)?;
    Ok(page
        .owned_nfts
        .into_iter()
        .map(|n| OwnedNft {
            contract: n.contract.address,
            collection: n.contract.name.filter(|s| !s.is_empty()),
            token_id: n.token_id,
            name: n.name.filter(|s| !s.is_empty()),
            image: n.image.and_then(|i| i.cached_url.or(i.original_url)),
            token_type: n.token_type.unwrap_or_else(|| "UNKNOWN".into()),
            balance: n.balance.unwrap_or_else(|| "1".into()),
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct NftClient {
    http: HttpClient,
    api_key: String,
}

impl NftClient {
    /// `None` without an API key; the NFT view is then disabled.
    pub fn from_key(api_key: Option<&str>) -> Option<Self> {
        api_key.map(|k| Self {
            http: HttpClient::new(),
            api_key: k.to_string(),
        })
    }

    pub fn endpoint(&self, network: &Network, owner: Address) -> Option<String> {
        network.nft_api_slug.map(|slug| {
            format!(
                "https://{slug}.g.alchemy.com/nft/v3/{}/getNFTsForOwner?owner={owner}&withMetadata=true&pageSize={PAGE_SIZE}",
                self.api_key
            )
        })
    }

    /// First page of NFTs held by `owner`. `Ok(None)` when the network has no
    /// NFT API.
    pub async fn list_nfts(
        &self,
        owner: Address,
        network: &Network,
    ) -> Result<Option<Vec<OwnedNft>>, DappError> {
        let Some(url) = self.endpoint(network, owner) else {
            return Ok(None);
        };
        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DappError::RpcUnavailable(format!("nft api: {e}")))?;
        let status = res.status();
        if !status.is_success() {
            return Err(DappError::RpcUnavailable(format!("nft api returned {status}")));
        }
        let body: Value = res
            .json()
            .await
            .map_err(|e| DappError::Decode(format!("nft api: {e}")))?;
        let nfts = parse_owned_nfts(body)?;
        log!(cc::LIGHT_GRAY, "nft api: {} item(s) for {}", nfts.len(), owner);
        Ok(Some(nfts))
    }
}
