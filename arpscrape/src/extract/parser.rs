//! Parser for the console's `arp -a` table.
//!
//! The table arrives as carriage-return separated lines such as
//!
//! ```text
//! ? (192.168.1.20) at 00:1b:21:3a:4f:10 on em1 expires in 1185 seconds [ethernet]
//! ```
//!
//! A `?` means the hostname did not resolve; only those lines are kept.
//! Malformed lines are skipped and reported, never fatal for the batch.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;

use super::record::{AddressRecord, order_key};

/// At least four dot-separated decimal components.
static NETWORK_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]+(?:\.[0-9]+){3,}$").expect("network address pattern is valid")
});

/// Why a retained line produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No `(` opening the network address.
    MissingOpenParen,

    /// No `)` closing the network address.
    MissingCloseParen,

    /// No `at ` after the network address.
    MissingAt,

    /// Nothing after `at `.
    EmptyHardwareAddress,

    /// The device has not resolved the hardware address yet.
    IncompleteEntry,

    /// Network address is not dotted decimal with four or more parts.
    InvalidNetworkAddress,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            SkipReason::MissingOpenParen => "missing '('",
            SkipReason::MissingCloseParen => "missing ')'",
            SkipReason::MissingAt => "missing 'at'",
            SkipReason::EmptyHardwareAddress => "empty hardware address",
            SkipReason::IncompleteEntry => "incomplete entry",
            SkipReason::InvalidNetworkAddress => "invalid network address",
        };
        f.write_str(reason)
    }
}

/// A retained line that was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// The line, filler character removed.
    pub line: String,

    /// Why it was dropped.
    pub reason: SkipReason,
}

/// Result of parsing one capture.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Records in the order the device printed them.
    pub records: Vec<AddressRecord>,

    /// Lines that looked like entries but could not be parsed.
    pub skipped: Vec<SkippedLine>,
}

impl Extraction {
    /// Number of records extracted.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was extracted.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of skipped lines.
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Records ordered by `order_key`, then network address.
    pub fn sorted(&self) -> Vec<AddressRecord> {
        let mut records = self.records.clone();
        records.sort_by(|a, b| {
            a.order_key
                .cmp(&b.order_key)
                .then_with(|| a.network_address.cmp(&b.network_address))
        });
        records
    }
}

/// Parse captured output, stamping records with the current time.
pub fn parse(raw: &str) -> Extraction {
    parse_at(raw, Utc::now())
}

/// Parse captured output, stamping records with `observed_at`.
pub fn parse_at(raw: &str, observed_at: DateTime<Utc>) -> Extraction {
    let mut extraction = Extraction::default();

    for line in raw.split('\r').filter(|line| line.contains('?')) {
        let line = strip_filler(line);
        match parse_line(line, observed_at) {
            Ok(record) => extraction.records.push(record),
            Err(reason) => {
                debug!("skipping {:?}: {}", line, reason);
                extraction.skipped.push(SkippedLine {
                    line: line.to_string(),
                    reason,
                });
            }
        }
    }

    debug!(
        "extracted {} records, skipped {} lines",
        extraction.records.len(),
        extraction.skipped.len()
    );
    extraction
}

/// Parse one table line (filler already removed).
///
/// `network_address` is the text between the first `(` and the following
/// `)`; `hardware_address` is the token after `at `.
pub fn parse_line(line: &str, observed_at: DateTime<Utc>) -> Result<AddressRecord, SkipReason> {
    let (_, rest) = line.split_once('(').ok_or(SkipReason::MissingOpenParen)?;
    let (network_address, rest) = rest.split_once(')').ok_or(SkipReason::MissingCloseParen)?;
    let after_at = rest
        .trim_start()
        .strip_prefix("at ")
        .ok_or(SkipReason::MissingAt)?;

    let hardware_address = after_at
        .split(char::is_whitespace)
        .next()
        .unwrap_or_default();
    if hardware_address.is_empty() {
        return Err(SkipReason::EmptyHardwareAddress);
    }
    if hardware_address.starts_with('(') {
        return Err(SkipReason::IncompleteEntry);
    }

    if !NETWORK_ADDRESS.is_match(network_address) {
        return Err(SkipReason::InvalidNetworkAddress);
    }
    let order_key = order_key(network_address).ok_or(SkipReason::InvalidNetworkAddress)?;

    Ok(AddressRecord {
        hardware_address: hardware_address.to_string(),
        network_address: network_address.to_string(),
        order_key,
        observed_at,
    })
}

/// Drop the formatter's leading filler character.
fn strip_filler(line: &str) -> &str {
    let mut chars = line.chars();
    chars.next();
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_no_question_marks_yields_nothing() {
        let raw = "arp -a ; exit\r\n 8) Shell\r\nEnter an option: ";
        let extraction = parse_at(raw, at());
        assert!(extraction.is_empty());
        assert_eq!(extraction.skipped_count(), 0);
    }

    #[test]
    fn test_single_line_with_filler() {
        let extraction = parse_at("?F (10.0.0.5) at aa:bb:cc:dd:ee:ff on em0", at());

        assert_eq!(extraction.len(), 1);
        let record = &extraction.records[0];
        assert_eq!(record.network_address, "10.0.0.5");
        assert_eq!(record.hardware_address, "aa:bb:cc:dd:ee:ff");
        assert_eq!(record.order_key, "005");
        assert_eq!(record.observed_at, at());
    }

    #[test]
    fn test_console_capture() {
        let raw = "arp -a ; exit\r\n\
            ? (192.168.1.1) at 00:0c:29:aa:bb:01 on em1 permanent [ethernet]\r\n\
            ? (192.168.1.20) at 00:1b:21:3a:4f:10 on em1 expires in 1185 seconds [ethernet]\r\n\
            ? (192.168.1.50) at (incomplete) on em1 expired [ethernet]\r\n\
            nas.lan (192.168.1.9) at 00:11:32:aa:bb:cc on em1 [ethernet]\r\n\
            \r\n\
            pfSense - Netgate Device ID: 0123456789\r\n\
            Enter an option: ";
        let extraction = parse_at(raw, at());

        let pairs: Vec<_> = extraction
            .records
            .iter()
            .map(|r| (r.hardware_address.as_str(), r.network_address.as_str(), r.order_key.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("00:0c:29:aa:bb:01", "192.168.1.1", "001"),
                ("00:1b:21:3a:4f:10", "192.168.1.20", "020"),
            ]
        );
        assert_eq!(extraction.skipped.len(), 1);
        assert_eq!(extraction.skipped[0].reason, SkipReason::IncompleteEntry);
    }

    #[test]
    fn test_malformed_line_does_not_abort_batch() {
        let raw = "\n? 10.0.0.7 at aa:aa:aa:aa:aa:aa on em0\r\
                   \n? (10.0.0.8) at bb:bb:bb:bb:bb:bb on em0";
        let extraction = parse_at(raw, at());

        assert_eq!(extraction.len(), 1);
        assert_eq!(extraction.records[0].hardware_address, "bb:bb:bb:bb:bb:bb");
        assert_eq!(extraction.skipped[0].reason, SkipReason::MissingOpenParen);
    }

    #[test]
    fn test_skip_reasons() {
        let cases = [
            ("? 10.0.0.1 at aa", SkipReason::MissingOpenParen),
            ("? (10.0.0.1 at aa", SkipReason::MissingCloseParen),
            ("? (10.0.0.1) on em0", SkipReason::MissingAt),
            ("? (10.0.0.1) at  on em0", SkipReason::EmptyHardwareAddress),
            ("? (10.0.0.1) at (incomplete) on em0", SkipReason::IncompleteEntry),
            ("? (10.0.1) at aa:bb on em0", SkipReason::InvalidNetworkAddress),
            ("? (host) at aa:bb on em0", SkipReason::InvalidNetworkAddress),
        ];

        for (line, expected) in cases {
            assert_eq!(parse_line(line, at()).unwrap_err(), expected, "{line}");
        }
    }

    #[test]
    fn test_hardware_address_at_end_of_line() {
        let record = parse_line("? (10.0.0.9) at aa:bb:cc:dd:ee:09", at()).unwrap();
        assert_eq!(record.hardware_address, "aa:bb:cc:dd:ee:09");
        assert_eq!(record.order_key, "009");
    }

    #[test]
    fn test_long_last_component_is_kept() {
        let raw = "\n? (10.0.0.1000) at aa on em0\r\
                   \n? (10.0.0.99999999999) at bb on em0";
        let extraction = parse_at(raw, at());

        assert_eq!(extraction.skipped_count(), 0);
        let keys: Vec<_> = extraction.records.iter().map(|r| r.order_key.as_str()).collect();
        assert_eq!(keys, vec!["1000", "99999999999"]);
    }

    #[test]
    fn test_sorted_by_order_key() {
        let raw = "\n? (10.0.0.100) at aa on em0\r\
                   \n? (10.0.0.9) at bb on em0\r\
                   \n? (10.0.0.20) at cc on em0";
        let sorted: Vec<_> = parse_at(raw, at())
            .sorted()
            .into_iter()
            .map(|r| r.network_address)
            .collect();
        assert_eq!(sorted, vec!["10.0.0.9", "10.0.0.20", "10.0.0.100"]);
    }
}
