use {
    crate::libs::{scanner::ScanSettings, transfer::TransferSettings},
    alloy::primitives::Address,
    dotenv::dotenv,
    std::{fmt::Debug, str::FromStr, time::Duration},
};

pub fn load_env() {
    dotenv().ok();
}

/// Everything read from the environment at startup. Nothing here is required:
/// a missing key only disables the wallet variant or feature that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Comma separated hex keys for the local-key wallet.
    pub private_keys: Vec<String>,
    /// JSON-RPC endpoint whose node manages unlocked accounts.
    pub node_wallet_rpc: Option<String>,
    pub default_network: String,
    pub scan: ScanSettings,
    pub transfer: TransferSettings,
    pub registry_address: Option<Address>,
    pub nft_api_key: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        load_env();
        let private_keys = std::env::var("PRIVATE_KEY")
            .map(|raw| split_keys(&raw))
            .unwrap_or_default();

        Self {
            private_keys,
            node_wallet_rpc: non_empty_var("NODE_WALLET_RPC"),
            default_network: Self::get_var_t("DEFAULT_NETWORK", "sepolia".to_string()),
            scan: ScanSettings {
                window_blocks: Self::get_var_t("SCAN_WINDOW_BLOCKS", 200),
                batch_size: Self::get_var_t("SCAN_BATCH_SIZE", 10),
            },
            transfer: TransferSettings {
                confirmations: Self::get_var_t("CONFIRMATIONS", 1),
                poll_interval: Duration::from_millis(Self::get_var_t("RECEIPT_POLL_MS", 1_500)),
                max_polls: Self::get_var_t("RECEIPT_MAX_POLLS", 400),
                reset_delay: Duration::from_secs(Self::get_var_t("FAILED_RESET_SECS", 5)),
            },
            registry_address: non_empty_var("MESSAGE_REGISTRY_ADDRESS")
                .and_then(|s| s.parse().ok()),
            nft_api_key: non_empty_var("NFT_API_KEY"),
        }
    }

    /// Parse env var to T; fall back to typed default.
    pub fn get_var_t<T>(key: &str, default: T) -> T
    where
        T: FromStr,
        <T as FromStr>::Err: Debug,
    {
        std::env::var(key)
            .ok()
            .and_then(|s| s.trim().parse::<T>().ok())
            .unwrap_or(default)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_split_and_trimmed() {
        assert_eq!(split_keys(" 0xaa, ,0xbb "), vec!["0xaa", "0xbb"]);
        assert!(split_keys("").is_empty());
    }

    #[test]
    fn typed_var_falls_back_on_garbage() {
        std::env::set_var("DAPPTERM_TEST_WINDOW", "not-a-number");
        assert_eq!(Config::get_var_t::<u64>("DAPPTERM_TEST_WINDOW", 200), 200);
        std::env::set_var("DAPPTERM_TEST_WINDOW", " 64 ");
        assert_eq!(Config::get_var_t::<u64>("DAPPTERM_TEST_WINDOW", 200), 64);
        std::env::remove_var("DAPPTERM_TEST_WINDOW");
    }
}
