// ── Operational read models ──
//
// Algorithm configuration, statistics, and flow rules. These are fetched
// on demand rather than cached in the store.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Server selection policy for new clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
pub enum BalancingAlgorithm {
    /// Round robin over active servers.
    #[strum(to_string = "RR", serialize = "round-robin", ascii_case_insensitive)]
    #[serde(rename = "RR")]
    RoundRobin,
    /// Round robin weighted by each server's weight.
    #[strum(to_string = "WRR", serialize = "weighted-round-robin", ascii_case_insensitive)]
    #[serde(rename = "WRR")]
    WeightedRoundRobin,
}

impl BalancingAlgorithm {
    /// Value the backend stores.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::RoundRobin => "RR",
            Self::WeightedRoundRobin => "WRR",
        }
    }
}

/// Path computation used by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAlgorithm {
    /// Bandwidth-weighted shortest path.
    #[strum(to_string = "dijkstra", ascii_case_insensitive)]
    Dijkstra,
    /// Fewest hops.
    #[strum(to_string = "shortest_path", serialize = "shortest-path", ascii_case_insensitive)]
    ShortestPath,
}

impl RoutingAlgorithm {
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Dijkstra => "dijkstra",
            Self::ShortestPath => "shortest_path",
        }
    }
}

/// Active load-balancing and routing algorithms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    pub balancing: Option<String>,
    pub routing: Option<String>,
    pub activated_at: Option<String>,
}

impl AlgorithmConfig {
    /// Weighted round robin is the only balancing mode that reads the
    /// per-server weights.
    pub fn uses_weights(&self) -> bool {
        self.balancing
            .as_deref()
            .and_then(|b| b.parse::<BalancingAlgorithm>().ok())
            == Some(BalancingAlgorithm::WeightedRoundRobin)
    }
}

/// Event count for one event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummaryRow {
    pub kind: String,
    pub total: i64,
}

/// One backend event log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub origin: Option<String>,
    pub event_type: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyMetrics {
    pub avg_rtt_ms: Option<f64>,
    pub avg_jitter_ms: Option<f64>,
}

/// Latency averages for the two routing algorithms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmComparison {
    pub dijkstra: LatencyMetrics,
    pub shortest_path: LatencyMetrics,
}

/// An OpenFlow rule stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRule {
    pub rule_id: i64,
    pub dpid: Option<i64>,
    pub priority: Option<i64>,
    pub eth_type: Option<i64>,
    pub ip_proto: Option<i64>,
    pub ipv4_src: Option<String>,
    pub ipv4_dst: Option<String>,
    pub tcp_src: Option<i64>,
    pub tcp_dst: Option<i64>,
    pub in_port: Option<i64>,
    pub actions: serde_json::Value,
}

/// One entry of the rule change history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowRuleLog {
    pub timestamp: Option<String>,
    pub dpid: Option<i64>,
    pub rule_id: Option<i64>,
    pub action: Option<String>,
    pub priority: Option<i64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn algorithms_parse_wire_and_friendly_names() {
        assert_eq!("wrr".parse::<BalancingAlgorithm>().unwrap(), BalancingAlgorithm::WeightedRoundRobin);
        assert_eq!("round-robin".parse::<BalancingAlgorithm>().unwrap(), BalancingAlgorithm::RoundRobin);
        assert_eq!("Shortest-Path".parse::<RoutingAlgorithm>().unwrap(), RoutingAlgorithm::ShortestPath);
        assert!("random".parse::<RoutingAlgorithm>().is_err());
        assert_eq!(RoutingAlgorithm::ShortestPath.wire_name(), "shortest_path");
    }

    #[test]
    fn weights_only_matter_for_wrr() {
        let mut config = AlgorithmConfig {
            balancing: Some("WRR".into()),
            ..AlgorithmConfig::default()
        };
        assert!(config.uses_weights());
        config.balancing = Some("RR".into());
        assert!(!config.uses_weights());
        config.balancing = None;
        assert!(!config.uses_weights());
    }
}
