#[macro_export]
macro_rules! env_lazy {
    ($( $vis:vis $name:ident : $ty:ty = ($key:literal, $default:expr); )* ) => {
        $(
            $vis static $name: ::std::sync::LazyLock<$ty> = ::std::sync::LazyLock::new(|| {
                $crate::libs::config::load_env();
                $crate::libs::config::Config::get_var_t::<$ty>($key, $default)
            });
        )*
    };
}

env_lazy! {
    pub MIN_TERMINAL_HEIGHT: u16 = ("MIN_TERMINAL_HEIGHT", 24);
    pub PAGE_SIZE: usize         = ("PAGE_SIZE", 10);
    pub LATEST_TX_COUNT: usize   = ("LATEST_TX_COUNT", 10);
    pub LATEST_BLOCK_COUNT: usize = ("LATEST_BLOCK_COUNT", 10);
    pub HISTORY_LIMIT: usize     = ("HISTORY_LIMIT", 50);
}

/// A chain the app knows how to talk to. Selected by the user, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    pub id: &'static str,
    pub display_name: &'static str,
    pub chain_id: u64,
    pub rpc_url: &'static str,
    pub native_symbol: &'static str,
    pub explorer_url: Option<&'static str>,
    /// ENS registry is deployed at the canonical address.
    pub has_ens: bool,
    /// Subdomain used by the NFT listing API, if it covers this chain.
    pub nft_api_slug: Option<&'static str>,
}

pub const NETWORKS: [Network; 6] = [
    Network {
        id: "mainnet",
        display_name: "Ethereum Mainnet",
        chain_id: 1,
        rpc_url: "https://ethereum-rpc.publicnode.com",
        native_symbol: "ETH",
        explorer_url: Some("https://etherscan.io"),
        has_ens: true,
        nft_api_slug: Some("eth-mainnet"),
    },
    Network {
        id: "sepolia",
        display_name: "Sepolia",
        chain_id: 11_155_111,
        rpc_url: "https://ethereum-sepolia-rpc.publicnode.com",
        native_symbol: "SepoliaETH",
        explorer_url: Some("https://sepolia.etherscan.io"),
        has_ens: true,
        nft_api_slug: Some("eth-sepolia"),
    },
    Network {
        id: "bsc",
        display_name: "BNB Smart Chain",
        chain_id: 56,
        rpc_url: "https://bsc-dataseed.binance.org",
        native_symbol: "BNB",
        explorer_url: Some("https://bscscan.com"),
        has_ens: false,
        nft_api_slug: None,
    },
    Network {
        id: "bsc-testnet",
        display_name: "BNB Smart Chain Testnet",
        chain_id: 97,
        rpc_url: "https://data-seed-prebsc-1-s1.binance.org:8545",
        native_symbol: "tBNB",
        explorer_url: Some("https://testnet.bscscan.com"),
        has_ens: false,
        nft_api_slug: None,
    },
    Network {
        id: "polygon",
        display_name: "Polygon",
        chain_id: 137,
        rpc_url: "https://polygon-rpc.com",
        native_symbol: "POL",
        explorer_url: Some("https://polygonscan.com"),
        has_ens: false,
        nft_api_slug: Some("polygon-mainnet"),
    },
    Network {
        id: "localhost",
        display_name: "Localhost 8545",
        chain_id: 31_337,
        rpc_url: "http://127.0.0.1:8545",
        native_symbol: "ETH",
        explorer_url: None,
        has_ens: false,
        nft_api_slug: None,
    },
];

pub fn network_by_chain_id(chain_id: u64) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.chain_id == chain_id)
}

pub fn network_by_id(id: &str) -> Option<&'static Network> {
    NETWORKS.iter().find(|n| n.id.eq_ignore_ascii_case(id))
}

impl Network {
    pub fn tx_url(&self, hash: &str) -> Option<String> {
        self.explorer_url.map(|base| format!("{base}/tx/{hash}"))
    }

    pub fn address_url(&self, address: &str) -> Option<String> {
        self.explorer_url
            .map(|base| format!("{base}/address/{address}"))
    }
}
