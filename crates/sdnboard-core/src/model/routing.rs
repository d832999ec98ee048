// ── Route types ──

use serde::{Deserialize, Serialize};

use super::ids::{Dpid, MacAddress};

/// One switch on a computed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathHop {
    pub dpid: Dpid,
    pub out_port: Option<i64>,
    pub in_port: Option<i64>,
}

/// Path between two hosts as computed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePath {
    pub src_mac: MacAddress,
    pub dst_mac: MacAddress,
    pub hops: Vec<PathHop>,
    pub dst_switch_port_to_host: Option<i64>,
}

impl RoutePath {
    pub fn src_dpid(&self) -> Option<Dpid> {
        self.hops.first().map(|h| h.dpid)
    }

    pub fn dst_dpid(&self) -> Option<Dpid> {
        self.hops.last().map(|h| h.dpid)
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Hops in the `[dpid, out_port, in_port]` form the controller expects.
    pub fn ryu_hops(&self) -> Vec<(u64, Option<i64>, Option<i64>)> {
        self.hops
            .iter()
            .map(|h| (h.dpid.as_u64(), h.out_port, h.in_port))
            .collect()
    }
}
