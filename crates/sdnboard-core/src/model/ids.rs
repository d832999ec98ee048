// ── Identifier types ──
//
// MAC addresses key hosts, datapath ids key switches on the OpenFlow side.
// Both are normalized on construction so lookups never depend on the
// casing or padding a particular service happened to use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Accepts colon- or dash-separated input in any case.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let normalized = raw.as_ref().trim().to_lowercase().replace('-', ":");
        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for MacAddress {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ── Dpid ────────────────────────────────────────────────────────────

/// OpenFlow datapath id.
///
/// The backend stores it as a 16-digit hex string while path hops carry
/// the integer form; both resolve to the same `Dpid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dpid(pub u64);

impl Dpid {
    /// Parse the hex form (`"000000000000000a"`, optionally `0x`-prefixed).
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(Self)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Dpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_address_normalizes_case_and_separators() {
        assert_eq!(MacAddress::new("AA-BB-CC-00-00-01").as_str(), "aa:bb:cc:00:00:01");
        assert_eq!(MacAddress::new(" 00:00:00:00:00:0A "), MacAddress::new("00:00:00:00:00:0a"));
    }

    #[test]
    fn dpid_parses_backend_hex() {
        assert_eq!(Dpid::parse_hex("000000000000000a"), Some(Dpid(10)));
        assert_eq!(Dpid::parse_hex("0x1f"), Some(Dpid(31)));
        assert_eq!(Dpid::parse_hex(""), None);
        assert_eq!(Dpid::parse_hex("zz"), None);
    }

    #[test]
    fn dpid_displays_padded_hex() {
        assert_eq!(Dpid(10).to_string(), "000000000000000a");
    }
}
