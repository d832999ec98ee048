#![allow(clippy::unwrap_used)]
// Integration tests for `BackendClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sdnboard_api::backend::models::FlowRuleBody;
use sdnboard_api::{BackendClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BackendClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Topology tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_topology() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/topology/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "switches": [
                {"id_switch": 1, "nombre": "Amsterdam", "dpid_str": "0000000000000001",
                 "latitud": 52.37, "longitud": 4.89, "status": "conectado"},
                {"id_switch": 2, "nombre": "Berlin", "dpid_str": "000000000000000a",
                 "latitud": "52.52", "longitud": "13.40", "status": "desconectado"}
            ],
            "hosts": [
                {"mac": "00:00:00:00:00:01", "nombre": "h1", "ip": "10.0.0.1",
                 "id_switch_conectado": 1}
            ],
            "enlaces": [
                {"id_origen": 1, "id_destino": 2, "ancho_banda": 500}
            ]
        })))
        .mount(&server)
        .await;

    let topo = client.get_topology().await.unwrap();
    assert_eq!(topo.switches.len(), 2);
    assert_eq!(topo.switches[1].latitude, Some(52.52));
    assert_eq!(topo.hosts[0].switch_id, Some(1));
    assert_eq!(topo.links[0].bandwidth, 500);
}

#[tokio::test]
async fn test_get_topology_malformed_payload() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/topology/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "switches": [{"nombre": "missing id"}]
        })))
        .mount(&server)
        .await;

    let result = client.get_topology().await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_create_link_sends_backend_field_names() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/topology/enlace"))
        .and(body_json(json!({"id_origen": 1, "id_destino": 2, "ancho_banda": 500})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"message": "Enlace creado"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message = client.create_link(1, 2, 500).await.unwrap();
    assert_eq!(message, "Enlace creado");
}

#[tokio::test]
async fn test_delete_link_sends_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/topology/enlace"))
        .and(body_json(json!({"id_origen": 1, "id_destino": 2})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Enlace eliminado"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let message = client.delete_link(1, 2).await.unwrap();
    assert_eq!(message, "Enlace eliminado");
}

#[tokio::test]
async fn test_update_link_error_is_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/topology/enlace"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "El enlace no existe"})),
        )
        .mount(&server)
        .await;

    let err = client.update_link(1, 9, 100).await.unwrap_err();
    match err {
        Error::Backend { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "El enlace no existe");
        }
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_payload_with_success_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/config/balanceo"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"error": "Falta el algoritmo"})),
        )
        .mount(&server)
        .await;

    let result = client.set_balancing_algorithm("").await;
    assert!(
        matches!(result, Err(Error::Backend { status: 200, .. })),
        "expected Backend error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_plain_text_failure_becomes_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/servers/active_servers"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client.list_active_servers().await.unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(err, Error::Http { status: 502, .. }));
}

// ── Server tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_start_server_returns_multicast_group() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/servers/add"))
        .and(body_json(
            json!({"host_name": "h1", "video_path": "v.mp4", "server_weight": 2}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Servidor iniciado",
            "multicast_ip": "239.0.0.1",
            "multicast_port": 5004
        })))
        .mount(&server)
        .await;

    let started = client.start_server("h1", "v.mp4", 2).await.unwrap();
    assert_eq!(started.multicast_ip, "239.0.0.1");
    assert_eq!(started.multicast_port, 5004);
}

#[tokio::test]
async fn test_list_active_servers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/servers/active_servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"host_name": "h1", "video_path": "v.mp4", "ip_destino": "239.0.0.1",
             "puerto": 5004, "server_weight": 2, "status": "activo",
             "last_updated": "2024-05-01T10:00:00"}
        ])))
        .mount(&server)
        .await;

    let servers = client.list_active_servers().await.unwrap();
    assert_eq!(servers.len(), 1);
    assert_eq!(servers[0].multicast_ip.as_deref(), Some("239.0.0.1"));
    assert_eq!(servers[0].server_weight, Some(2));
}

// ── Client tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_active_clients_unwraps_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/client/active_clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active_clients": [
                {"host": "h3", "server_display_name": "h1", "ip_destino_raw": "239.0.0.1",
                 "port": 5004, "video": "v.mp4", "timestamp_inicio": "2024-05-01 10:00:00"}
            ]
        })))
        .mount(&server)
        .await;

    let clients = client.list_active_clients().await.unwrap();
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].host, "h3");
    assert_eq!(clients[0].destination_ip.as_deref(), Some("239.0.0.1"));
}

#[tokio::test]
async fn test_stream_assignment_without_servers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/client/get_multicast_stream_info"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({
            "error": "No hay servidores activos disponibles para streaming."
        })))
        .mount(&server)
        .await;

    let err = client.get_stream_assignment().await.unwrap_err();
    assert_eq!(
        err.remote_message(),
        Some("No hay servidores activos disponibles para streaming.")
    );
}

// ── Routing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_calculate_path() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/dijkstra/calculate_path"))
        .and(body_json(
            json!({"src_mac": "00:00:00:00:00:01", "dst_mac": "00:00:00:00:00:02"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": [
                {"dpid": 1, "out_port": 2, "in_port": null},
                {"dpid": 10, "out_port": 1, "in_port": 3}
            ]
        })))
        .mount(&server)
        .await;

    let payload = client
        .calculate_path("00:00:00:00:00:01", "00:00:00:00:00:02")
        .await
        .unwrap();
    let dpids: Vec<u64> = payload.path.iter().map(|h| h.dpid()).collect();
    assert_eq!(dpids, vec![1, 10]);
}

// ── Configuration & stats tests ─────────────────────────────────────

#[tokio::test]
async fn test_algorithm_config_tolerates_nulls() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/config/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "algoritmo_balanceo": null,
            "algoritmo_enrutamiento": "dijkstra",
            "fecha_activacion": null
        })))
        .mount(&server)
        .await;

    let config = client.get_algorithm_config().await.unwrap();
    assert!(config.balancing.is_none());
    assert_eq!(config.routing.as_deref(), Some("dijkstra"));
}

#[tokio::test]
async fn test_stats_summary() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/stats/resumen"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"tipo": "ping", "total": 12},
            {"tipo": "stream", "total": 3}
        ])))
        .mount(&server)
        .await;

    let rows = client.get_stats_summary().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].kind, "ping");
    assert_eq!(rows[1].total, 3);
}

// ── Flow rule tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_list_flow_rules_empty_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reglas/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "No rules registered."})),
        )
        .mount(&server)
        .await;

    let rules = client.list_flow_rules().await.unwrap();
    assert!(rules.is_empty());
}

#[tokio::test]
async fn test_create_flow_rule_targets_dpid() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/reglas/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Rule added successfully",
            "rule_id": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rule = FlowRuleBody {
        rule_id: 7,
        priority: 100,
        eth_type: 2048,
        ip_proto: None,
        ipv4_src: Some("10.0.0.1".into()),
        ipv4_dst: None,
        tcp_src: None,
        tcp_dst: None,
        in_port: None,
        actions: json!([{"type": "OUTPUT", "port": 2}]),
    };
    let message = client.create_flow_rule(1, &rule).await.unwrap();
    assert_eq!(message, "Rule added successfully");
}

#[tokio::test]
async fn test_flow_rule_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reglas/buscar/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Rule not found"})))
        .mount(&server)
        .await;

    let err = client.get_flow_rule(99).await.unwrap_err();
    assert!(err.is_not_found());
}
