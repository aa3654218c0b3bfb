//! Display helpers: native amounts, gwei, short addresses, timestamps.
use alloy::primitives::{
    utils::{format_ether, format_units},
    Address, U256,
};

/// `1.5 ETH`, `0 BNB`. Trailing fractional zeros are trimmed.
pub fn format_native(wei: U256, symbol: &str) -> String {
    format!("{} {symbol}", trim_decimal(format_ether(wei)))
}

/// Human decimal without the symbol, e.g. `0.000021`.
pub fn ether_decimal(wei: U256) -> String {
    trim_decimal(format_ether(wei))
}

fn trim_decimal(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn wei_to_gwei(wei: U256) -> f64 {
    format_units(wei, "gwei")
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// `0x5aAe…eAed`
pub fn short_addr(addr: &Address) -> String {
    let full = addr.to_checksum(None);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

/// `0x1234ab…cdef` for hashes and other long hex strings.
pub fn short_hex(s: &str) -> String {
    if s.len() > 14 {
        format!("{}…{}", &s[..8], &s[s.len() - 4..])
    } else {
        s.to_string()
    }
}

pub fn format_timestamp_ms(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(chrono::DateTime::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_amounts() {
        let one_and_half = U256::from(1_500_000_000_000_000_000u128);
        assert_eq!(format_native(one_and_half, "ETH"), "1.5 ETH");
        assert_eq!(format_native(U256::ZERO, "BNB"), "0 BNB");
        assert_eq!(ether_decimal(U256::from(21_000_000_000_000u64)), "0.000021");
        assert_eq!(
            format_native(U256::from(2_000_000_000_000_000_000u128), "POL"),
            "2 POL"
        );
    }

    #[test]
    fn gwei() {
        assert_eq!(wei_to_gwei(U256::from(1_000_000_000u64)), 1.0);
        assert_eq!(wei_to_gwei(U256::from(1_500_000_000u64)), 1.5);
    }

    #[test]
    fn shortening() {
        let a: Address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".parse().unwrap();
        assert_eq!(short_addr(&a), "0x5aAe…eAed");
        assert_eq!(short_hex("0xabc"), "0xabc");
        assert_eq!(short_hex("0x0123456789abcdef0123"), "0x012345…0123");
    }

    #[test]
    fn timestamps() {
        assert_eq!(format_timestamp_ms(0), "1970-01-01 00:00:00");
        assert_eq!(format_timestamp_ms(1_700_000_000_000), "2023-11-14 22:13:20");
    }
}
