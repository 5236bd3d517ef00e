//! Address records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One (hardware address, network address) pair seen in the ARP table.
///
/// `hardware_address` identifies the record; storage upserts on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    /// MAC address as printed by the device.
    pub hardware_address: String,

    /// IPv4 address as printed by the device.
    pub network_address: String,

    /// Last address component, zero-padded to 3 digits.
    pub order_key: String,

    /// When the table was collected.
    pub observed_at: DateTime<Utc>,
}

/// Sort key for a network address: its last dot-separated component,
/// leading zeros dropped, then zero-padded to 3 digits. Longer components
/// are kept whole.
///
/// Returns `None` if the last component is not a decimal number.
///
/// ```rust
/// assert_eq!(arpscrape::extract::order_key("10.0.0.5").as_deref(), Some("005"));
/// assert_eq!(arpscrape::extract::order_key("10.0.0.x"), None);
/// ```
pub fn order_key(network_address: &str) -> Option<String> {
    let last = network_address.rsplit('.').next()?;
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = last.trim_start_matches('0');
    let digits = if digits.is_empty() { "0" } else { digits };
    Some(format!("{digits:0>3}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_is_three_chars_in_octet_range() {
        for octet in 0..=255u32 {
            let key = order_key(&format!("192.168.1.{octet}")).unwrap();
            assert_eq!(key.len(), 3, "octet {octet}");
        }
    }

    #[test]
    fn test_order_key_sorts_numerically() {
        let keys: Vec<(u32, String)> = (0..=255u32)
            .map(|octet| (octet, order_key(&format!("10.0.0.{octet}")).unwrap()))
            .collect();

        for (a, ka) in &keys {
            for (b, kb) in keys.iter().step_by(17) {
                assert_eq!(a.cmp(b), ka.cmp(kb), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_order_key_normalizes_leading_zeros() {
        assert_eq!(order_key("10.0.0.007").as_deref(), Some("007"));
        assert_eq!(order_key("10.0.0.0").as_deref(), Some("000"));
        assert_eq!(order_key("10.0.0.000").as_deref(), Some("000"));
    }

    #[test]
    fn test_order_key_rejects_non_numeric() {
        assert!(order_key("10.0.0.").is_none());
        assert!(order_key("10.0.0.-1").is_none());
        assert!(order_key("fe80::1").is_none());
    }
}
