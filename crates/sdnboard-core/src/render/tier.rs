// ── Bandwidth tiers ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Colour class of a link, ordered from weakest to strongest.
///
/// `Low < Moderate < Elevated < High`, and [`BandwidthTier::from_mbps`] is
/// monotonic in bandwidth.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BandwidthTier {
    /// Below 10 Mbps.
    Low,
    /// 10 to 99 Mbps.
    Moderate,
    /// 100 to 999 Mbps.
    Elevated,
    /// 1000 Mbps and above.
    High,
}

impl BandwidthTier {
    pub fn from_mbps(mbps: u32) -> Self {
        match mbps {
            0..10 => Self::Low,
            10..100 => Self::Moderate,
            100..1000 => Self::Elevated,
            _ => Self::High,
        }
    }

    /// Colour name used by every frontend.
    pub fn hue(self) -> &'static str {
        match self {
            Self::Low => "red",
            Self::Moderate => "orange",
            Self::Elevated => "yellow",
            Self::High => "green",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_match_table() {
        assert_eq!(BandwidthTier::from_mbps(0), BandwidthTier::Low);
        assert_eq!(BandwidthTier::from_mbps(9), BandwidthTier::Low);
        assert_eq!(BandwidthTier::from_mbps(10), BandwidthTier::Moderate);
        assert_eq!(BandwidthTier::from_mbps(99), BandwidthTier::Moderate);
        assert_eq!(BandwidthTier::from_mbps(100), BandwidthTier::Elevated);
        assert_eq!(BandwidthTier::from_mbps(500), BandwidthTier::Elevated);
        assert_eq!(BandwidthTier::from_mbps(999), BandwidthTier::Elevated);
        assert_eq!(BandwidthTier::from_mbps(1000), BandwidthTier::High);
        assert_eq!(BandwidthTier::from_mbps(u32::MAX), BandwidthTier::High);
    }

    #[test]
    fn tier_is_monotonic() {
        let samples: Vec<u32> = (0..2_000).step_by(7).chain([u32::MAX]).collect();
        for pair in samples.windows(2) {
            assert!(BandwidthTier::from_mbps(pair[0]) <= BandwidthTier::from_mbps(pair[1]));
        }
    }

    #[test]
    fn hues_follow_tier_order() {
        use strum::IntoEnumIterator;
        let hues: Vec<&str> = BandwidthTier::iter().map(BandwidthTier::hue).collect();
        assert_eq!(hues, ["red", "orange", "yellow", "green"]);
    }
}
