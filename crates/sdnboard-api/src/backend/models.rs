// Backend response and request types
//
// Wire models for the Flask backend. Field names follow the backend's own
// (Spanish) JSON keys via `#[serde(rename)]`; Rust-side names are English.
// Every endpoint gets an explicit type so malformed payloads fail at the
// boundary instead of leaking half-parsed data into rendering.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

// ── Message envelope ─────────────────────────────────────────────────

/// The `{message}` / `{error}` shape returned by every mutating endpoint.
///
/// Some handlers add extra keys (e.g. `rule_id`); those are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

// ── Topology ─────────────────────────────────────────────────────────

/// `GET /topology/get`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyPayload {
    #[serde(default)]
    pub switches: Vec<SwitchDto>,
    #[serde(default)]
    pub hosts: Vec<HostDto>,
    #[serde(default, rename = "enlaces")]
    pub links: Vec<LinkDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchDto {
    #[serde(rename = "id_switch")]
    pub id: i64,
    #[serde(default, rename = "nombre")]
    pub name: Option<String>,
    #[serde(default, rename = "dpid_str")]
    pub dpid: Option<String>,
    /// Coordinates arrive as numbers, numeric strings, or null depending on
    /// how the row was inserted. Anything non-numeric becomes `None`.
    #[serde(default, rename = "latitud", deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, rename = "longitud", deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostDto {
    pub mac: String,
    #[serde(default, rename = "nombre")]
    pub name: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, rename = "id_switch_conectado")]
    pub switch_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDto {
    #[serde(rename = "id_origen")]
    pub source: i64,
    #[serde(rename = "id_destino")]
    pub dest: i64,
    #[serde(rename = "ancho_banda")]
    pub bandwidth: u32,
}

/// Body for `POST`/`PUT /topology/enlace`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkBody {
    #[serde(rename = "id_origen")]
    pub source: i64,
    #[serde(rename = "id_destino")]
    pub dest: i64,
    #[serde(rename = "ancho_banda")]
    pub bandwidth: u32,
}

/// Body for `DELETE /topology/enlace`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkKeyBody {
    #[serde(rename = "id_origen")]
    pub source: i64,
    #[serde(rename = "id_destino")]
    pub dest: i64,
}

// ── Servers ──────────────────────────────────────────────────────────

/// One row of `GET /servers/active_servers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveServerDto {
    pub host_name: String,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default, rename = "ip_destino")]
    pub multicast_ip: Option<String>,
    #[serde(default, rename = "puerto")]
    pub multicast_port: Option<u16>,
    #[serde(default)]
    pub server_weight: Option<u32>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Body for `POST /servers/add`.
#[derive(Debug, Clone, Serialize)]
pub struct StartServerBody<'a> {
    pub host_name: &'a str,
    pub video_path: &'a str,
    pub server_weight: u32,
}

/// Response of `POST /servers/add`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerStartedDto {
    #[serde(default)]
    pub message: Option<String>,
    pub multicast_ip: String,
    pub multicast_port: u16,
}

/// Body for `POST /servers/remove`.
#[derive(Debug, Clone, Serialize)]
pub struct HostNameBody<'a> {
    pub host_name: &'a str,
}

// ── Clients ──────────────────────────────────────────────────────────

/// `GET /client/active_clients`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveClientsPayload {
    #[serde(default)]
    pub active_clients: Vec<ActiveClientDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveClientDto {
    pub host: String,
    #[serde(default)]
    pub server_display_name: Option<String>,
    #[serde(default, rename = "ip_destino_raw")]
    pub destination_ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default, rename = "timestamp_inicio")]
    pub started_at: Option<String>,
}

/// `GET /client/get_multicast_stream_info`: the server a new client
/// should join, picked by the backend's balancing algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamInfoDto {
    pub host_name: String,
    pub multicast_ip: String,
    pub multicast_port: u16,
}

/// `GET /client/hosts`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostCatalogPayload {
    #[serde(default)]
    pub hosts: Vec<HostNameDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostNameDto {
    pub name: String,
}

// ── Routing ──────────────────────────────────────────────────────────

/// Body for `POST /dijkstra/calculate_path`.
#[derive(Debug, Clone, Serialize)]
pub struct PathRequestBody<'a> {
    pub src_mac: &'a str,
    pub dst_mac: &'a str,
}

/// Response of `POST /dijkstra/calculate_path`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathPayload {
    #[serde(default)]
    pub path: Vec<PathHopDto>,
    #[serde(default)]
    pub dst_switch_port_to_host: Option<i64>,
}

/// A hop is either `{dpid, out_port, in_port}` or `[dpid, out_port, in_port]`.
///
/// Ports are nullable; the first hop has no ingress port.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PathHopDto {
    Object {
        dpid: u64,
        #[serde(default)]
        out_port: Option<i64>,
        #[serde(default)]
        in_port: Option<i64>,
    },
    Tuple(u64, Option<i64>, Option<i64>),
}

impl PathHopDto {
    pub fn dpid(&self) -> u64 {
        match self {
            Self::Object { dpid, .. } | Self::Tuple(dpid, _, _) => *dpid,
        }
    }

    pub fn out_port(&self) -> Option<i64> {
        match self {
            Self::Object { out_port, .. } | Self::Tuple(_, out_port, _) => *out_port,
        }
    }

    pub fn in_port(&self) -> Option<i64> {
        match self {
            Self::Object { in_port, .. } | Self::Tuple(_, _, in_port) => *in_port,
        }
    }
}

// ── Algorithm configuration ──────────────────────────────────────────

/// `GET /config/current` and each row of `GET /config/history`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmConfigDto {
    #[serde(default, rename = "algoritmo_balanceo")]
    pub balancing: Option<String>,
    #[serde(default, rename = "algoritmo_enrutamiento")]
    pub routing: Option<String>,
    #[serde(default, rename = "fecha_activacion")]
    pub activated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalancingBody<'a> {
    #[serde(rename = "algoritmo_balanceo")]
    pub algorithm: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoutingBody<'a> {
    #[serde(rename = "algoritmo_enrutamiento")]
    pub algorithm: &'a str,
}

/// Body for `POST /config/weights`: server name to weight.
pub type WeightsBody = BTreeMap<String, u32>;

// ── Statistics ───────────────────────────────────────────────────────

/// One row of `GET /stats/resumen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRowDto {
    #[serde(rename = "tipo")]
    pub kind: String,
    pub total: i64,
}

/// One row of `GET /stats/logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogDto {
    #[serde(default, rename = "origen")]
    pub origin: Option<String>,
    #[serde(default, rename = "tipo_evento")]
    pub event_type: Option<String>,
    #[serde(default, rename = "fecha")]
    pub date: Option<String>,
}

/// `GET /stats/comparar_algoritmos`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmComparisonDto {
    #[serde(default)]
    pub dijkstra: LatencyMetricsDto,
    #[serde(default)]
    pub shortest_path: LatencyMetricsDto,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatencyMetricsDto {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_rtt: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_jitter: Option<f64>,
}

// ── Flow rules ───────────────────────────────────────────────────────

/// A flow rule as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRuleDto {
    #[serde(default)]
    pub dpid: Option<i64>,
    pub rule_id: i64,
    #[serde(default)]
    pub priority: Option<i64>,
    #[serde(default)]
    pub eth_type: Option<i64>,
    #[serde(default)]
    pub ip_proto: Option<i64>,
    #[serde(default)]
    pub ipv4_src: Option<String>,
    #[serde(default)]
    pub ipv4_dst: Option<String>,
    #[serde(default)]
    pub tcp_src: Option<i64>,
    #[serde(default)]
    pub tcp_dst: Option<i64>,
    #[serde(default)]
    pub in_port: Option<i64>,
    #[serde(default)]
    pub actions: serde_json::Value,
}

/// `GET /reglas/` returns `{switches: [...]}`, or `{message}` when empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowRuleListPayload {
    #[serde(default)]
    pub switches: Vec<FlowRuleDto>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Body for `POST /reglas/{dpid}` and `PUT /reglas/modificar/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct FlowRuleBody {
    pub rule_id: i64,
    pub priority: i64,
    pub eth_type: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_proto: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_dst: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_src: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tcp_dst: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_port: Option<i64>,
    pub actions: serde_json::Value,
}

/// One row of `GET /reglas/logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRuleLogDto {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub dpid: Option<i64>,
    #[serde(default)]
    pub rule_id: Option<i64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub priority: Option<i64>,
}

/// `GET /reglas/max_rule_id`
#[derive(Debug, Clone, Deserialize)]
pub struct NextRuleIdDto {
    pub next_rule_id: i64,
}

// ── Lenient number parsing ───────────────────────────────────────────

/// Accept a JSON number, a numeric string, or null. Anything else (or a
/// non-finite value) maps to `None` rather than failing the whole payload.
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    let value = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn switch_coordinates_accept_numbers_strings_and_null() {
        let payload: TopologyPayload = serde_json::from_value(json!({
            "switches": [
                {"id_switch": 1, "nombre": "s1", "dpid_str": "0000000000000001",
                 "latitud": 52.37, "longitud": "4.89", "status": "conectado"},
                {"id_switch": 2, "nombre": "s2", "dpid_str": "0000000000000002",
                 "latitud": null, "longitud": "n/a", "status": "desconectado"}
            ],
            "hosts": [],
            "enlaces": []
        }))
        .unwrap();

        assert_eq!(payload.switches[0].latitude, Some(52.37));
        assert_eq!(payload.switches[0].longitude, Some(4.89));
        assert_eq!(payload.switches[1].latitude, None);
        assert_eq!(payload.switches[1].longitude, None);
    }

    #[test]
    fn path_hops_accept_objects_and_tuples() {
        let payload: PathPayload = serde_json::from_value(json!({
            "path": [
                {"dpid": 1, "out_port": 2, "in_port": null},
                [3, 1, 4]
            ]
        }))
        .unwrap();

        assert_eq!(payload.path.len(), 2);
        assert_eq!(payload.path[0].dpid(), 1);
        assert_eq!(payload.path[0].in_port(), None);
        assert_eq!(payload.path[1].dpid(), 3);
        assert_eq!(payload.path[1].out_port(), Some(1));
        assert_eq!(payload.path[1].in_port(), Some(4));
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let payload: TopologyPayload = serde_json::from_value(json!({})).unwrap();
        assert!(payload.switches.is_empty());
        assert!(payload.hosts.is_empty());
        assert!(payload.links.is_empty());
    }

    #[test]
    fn link_with_negative_bandwidth_is_rejected() {
        let result: Result<LinkDto, _> = serde_json::from_value(json!({
            "id_origen": 1, "id_destino": 2, "ancho_banda": -5
        }));
        assert!(result.is_err());
    }
}
