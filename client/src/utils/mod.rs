pub mod error;

use std::time::{SystemTime, UNIX_EPOCH};

/// Client-side capture time, not the block timestamp.
pub fn millis_since_unix_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or_default()
}

/// Shortens an address to `0x1234...abcd` for notices and the ledger view.
///
/// Strings too short to abbreviate are returned unchanged.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 10 {
        return address.to_owned();
    }

    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

#[cfg(test)]
mod tests {
    use super::short_address;

    #[test]
    fn shortens_full_addresses() {
        assert_eq!(
            short_address("0x4c675eBFBF0BE454d0632a28e167F78b9F775D90"),
            "0x4c67...5D90"
        );
    }

    #[test]
    fn leaves_short_strings_alone() {
        assert_eq!(short_address("0xabc"), "0xabc");
    }
}
