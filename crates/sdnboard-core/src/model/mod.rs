// ── Domain model ──
//
// Canonical types shared by the store, renderer, and UI layers. Wire
// shapes live in `sdnboard-api`; `crate::convert` maps between them.

pub mod ids;
pub mod operations;
pub mod routing;
pub mod streaming;
pub mod topology;

pub use ids::{Dpid, MacAddress};
pub use operations::{
    AlgorithmComparison, AlgorithmConfig, BalancingAlgorithm, EventLogEntry, FlowRule, FlowRuleLog, LatencyMetrics,
    RoutingAlgorithm, StatsSummaryRow,
};
pub use routing::{PathHop, RoutePath};
pub use streaming::{
    ActiveClient, ActiveServer, ClientStarted, ServerStarted, StreamAssignment, parse_timestamp,
};
pub use topology::{GeoPoint, Host, Link, Switch, SwitchStatus, Topology};
