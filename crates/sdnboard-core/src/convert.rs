// ── API-to-domain type conversions ──
//
// Bridges raw `sdnboard_api` payloads into canonical `sdnboard_core::model`
// types. Each `From` impl normalizes field names, parses identifiers into
// strong types, and fills display defaults for missing optional data.

use sdnboard_api::backend::models::{
    ActiveClientDto, ActiveServerDto, AlgorithmComparisonDto, AlgorithmConfigDto, EventLogDto,
    FlowRuleDto, FlowRuleLogDto, HostDto, LatencyMetricsDto, LinkDto, PathPayload, StreamInfoDto,
    SummaryRowDto, SwitchDto, TopologyPayload,
};

use crate::model::{
    ActiveClient, ActiveServer, AlgorithmComparison, AlgorithmConfig, Dpid, EventLogEntry,
    FlowRule, FlowRuleLog, Host, LatencyMetrics, Link, MacAddress, PathHop, RoutePath,
    StatsSummaryRow, StreamAssignment, Switch, SwitchStatus, Topology,
};

// ── Topology ───────────────────────────────────────────────────────

impl From<SwitchDto> for Switch {
    fn from(s: SwitchDto) -> Self {
        Self {
            name: s.name.unwrap_or_else(|| format!("switch-{}", s.id)),
            id: s.id,
            dpid_hex: s.dpid.filter(|d| !d.trim().is_empty()),
            latitude: s.latitude,
            longitude: s.longitude,
            status: SwitchStatus::from_backend(s.status.as_deref()),
        }
    }
}

impl From<HostDto> for Host {
    fn from(h: HostDto) -> Self {
        let mac = MacAddress::new(&h.mac);
        Self {
            name: h.name.unwrap_or_else(|| mac.to_string()),
            mac,
            ip: h.ip,
            switch_id: h.switch_id,
        }
    }
}

impl From<LinkDto> for Link {
    fn from(l: LinkDto) -> Self {
        Self {
            source: l.source,
            dest: l.dest,
            bandwidth_mbps: l.bandwidth,
        }
    }
}

impl From<TopologyPayload> for Topology {
    fn from(t: TopologyPayload) -> Self {
        Self {
            switches: t.switches.into_iter().map(Switch::from).collect(),
            hosts: t.hosts.into_iter().map(Host::from).collect(),
            links: t.links.into_iter().map(Link::from).collect(),
        }
    }
}

// ── Streaming ──────────────────────────────────────────────────────

impl From<ActiveServerDto> for ActiveServer {
    fn from(s: ActiveServerDto) -> Self {
        Self {
            host_name: s.host_name,
            video_path: s.video_path,
            multicast_ip: s.multicast_ip,
            multicast_port: s.multicast_port,
            weight: s.server_weight,
            status: s.status,
            last_updated: s.last_updated,
        }
    }
}

impl From<ActiveClientDto> for ActiveClient {
    fn from(c: ActiveClientDto) -> Self {
        Self {
            host: c.host,
            server: c.server_display_name,
            destination_ip: c.destination_ip,
            port: c.port,
            video: c.video,
            started_at: c.started_at,
        }
    }
}

impl From<StreamInfoDto> for StreamAssignment {
    fn from(s: StreamInfoDto) -> Self {
        Self {
            server_host: s.host_name,
            multicast_ip: s.multicast_ip,
            multicast_port: s.multicast_port,
        }
    }
}

// ── Routing ────────────────────────────────────────────────────────

/// Attach the requesting MACs to a path payload.
pub(crate) fn route_from_payload(
    src_mac: &MacAddress,
    dst_mac: &MacAddress,
    payload: PathPayload,
) -> RoutePath {
    RoutePath {
        src_mac: src_mac.clone(),
        dst_mac: dst_mac.clone(),
        hops: payload
            .path
            .iter()
            .map(|hop| PathHop {
                dpid: Dpid(hop.dpid()),
                out_port: hop.out_port(),
                in_port: hop.in_port(),
            })
            .collect(),
        dst_switch_port_to_host: payload.dst_switch_port_to_host,
    }
}

// ── Operations ─────────────────────────────────────────────────────

impl From<AlgorithmConfigDto> for AlgorithmConfig {
    fn from(c: AlgorithmConfigDto) -> Self {
        Self {
            balancing: c.balancing,
            routing: c.routing,
            activated_at: c.activated_at,
        }
    }
}

impl From<SummaryRowDto> for StatsSummaryRow {
    fn from(r: SummaryRowDto) -> Self {
        Self {
            kind: r.kind,
            total: r.total,
        }
    }
}

impl From<EventLogDto> for EventLogEntry {
    fn from(e: EventLogDto) -> Self {
        Self {
            origin: e.origin,
            event_type: e.event_type,
            date: e.date,
        }
    }
}

impl From<LatencyMetricsDto> for LatencyMetrics {
    fn from(m: LatencyMetricsDto) -> Self {
        Self {
            avg_rtt_ms: m.avg_rtt,
            avg_jitter_ms: m.avg_jitter,
        }
    }
}

impl From<AlgorithmComparisonDto> for AlgorithmComparison {
    fn from(c: AlgorithmComparisonDto) -> Self {
        Self {
            dijkstra: c.dijkstra.into(),
            shortest_path: c.shortest_path.into(),
        }
    }
}

impl From<FlowRuleDto> for FlowRule {
    fn from(r: FlowRuleDto) -> Self {
        Self {
            rule_id: r.rule_id,
            dpid: r.dpid,
            priority: r.priority,
            eth_type: r.eth_type,
            ip_proto: r.ip_proto,
            ipv4_src: r.ipv4_src,
            ipv4_dst: r.ipv4_dst,
            tcp_src: r.tcp_src,
            tcp_dst: r.tcp_dst,
            in_port: r.in_port,
            actions: r.actions,
        }
    }
}

impl From<FlowRuleLogDto> for FlowRuleLog {
    fn from(l: FlowRuleLogDto) -> Self {
        Self {
            timestamp: l.timestamp,
            dpid: l.dpid,
            rule_id: l.rule_id,
            action: l.action,
            priority: l.priority,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn topology_payload_converts_with_defaults() {
        let payload: TopologyPayload = serde_json::from_value(json!({
            "switches": [{"id_switch": 3, "dpid_str": "", "latitud": null, "longitud": 4.0}],
            "hosts": [{"mac": "00:00:00:00:00:0A", "id_switch_conectado": 3}],
            "enlaces": []
        }))
        .unwrap();

        let topo = Topology::from(payload);
        assert_eq!(topo.switches[0].name, "switch-3");
        assert!(topo.switches[0].dpid_hex.is_none());
        assert!(topo.switches[0].location().is_none());
        assert_eq!(topo.hosts[0].name, "00:00:00:00:00:0a");
        assert_eq!(topo.hosts[0].switch_id, Some(3));
    }

    #[test]
    fn route_keeps_hop_order() {
        let payload: PathPayload = serde_json::from_value(json!({
            "path": [[1, 2, null], [10, 1, 3]]
        }))
        .unwrap();
        let route = route_from_payload(&"a".into(), &"b".into(), payload);
        assert_eq!(route.src_dpid(), Some(Dpid(1)));
        assert_eq!(route.dst_dpid(), Some(Dpid(10)));
        assert_eq!(route.ryu_hops(), vec![(1, Some(2), None), (10, Some(1), Some(3))]);
    }
}
