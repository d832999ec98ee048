#![allow(clippy::unwrap_used)]
// Integration tests for `Controller` against a wiremock backend and agent.
//
// The backend mocks are stateful so that a write followed by a refresh
// observes the change, the way the real service behaves.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{Value, json};
use tokio::sync::broadcast;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use sdnboard_core::{
    BandwidthTier, Command, CommandResult, ConnectionState, Controller, CoreError,
    DashboardConfig, LinkRequest, MacAddress, PingEnd, PingEvent, PingSession, ReconcileEvent,
    RefreshSet, RefreshTarget, StartServerRequest,
};

// ── Fake backend ────────────────────────────────────────────────────

#[derive(Default)]
struct Testbed {
    links: Vec<(i64, i64, u32)>,
    servers: Vec<String>,
}

type Shared = Arc<Mutex<Testbed>>;

struct TopologyResponder(Shared);

impl Respond for TopologyResponder {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        let state = self.0.lock().unwrap();
        let links: Vec<Value> = state
            .links
            .iter()
            .map(|(s, d, bw)| json!({"id_origen": s, "id_destino": d, "ancho_banda": bw}))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({
            "switches": [
                {"id_switch": 1, "nombre": "Amsterdam", "dpid_str": "0000000000000001",
                 "latitud": 52.37, "longitud": 4.89, "status": "conectado"},
                {"id_switch": 2, "nombre": "Berlin", "dpid_str": "0000000000000002",
                 "latitud": 52.52, "longitud": 13.40, "status": "conectado"}
            ],
            "hosts": [
                {"mac": "00:00:00:00:00:01", "nombre": "h1", "ip": "10.0.0.1", "id_switch_conectado": 1},
                {"mac": "00:00:00:00:00:02", "nombre": "h2", "ip": "10.0.0.2", "id_switch_conectado": 2},
                {"mac": "00:00:00:00:00:03", "nombre": "h3", "ip": "10.0.0.3", "id_switch_conectado": 1},
                {"mac": "00:00:00:00:00:04", "nombre": "h4", "ip": "10.0.0.4", "id_switch_conectado": 2}
            ],
            "enlaces": links
        }))
    }
}

struct CreateLinkResponder(Shared);

impl Respond for CreateLinkResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap();
        let source = body["id_origen"].as_i64().unwrap();
        let dest = body["id_destino"].as_i64().unwrap();
        let bandwidth = u32::try_from(body["ancho_banda"].as_u64().unwrap()).unwrap();
        let mut state = self.0.lock().unwrap();
        if state.links.iter().any(|(s, d, _)| *s == source && *d == dest) {
            return ResponseTemplate::new(400).set_body_json(json!({"error": "El enlace ya existe"}));
        }
        state.links.push((source, dest, bandwidth));
        ResponseTemplate::new(201).set_body_json(json!({"message": "Enlace creado"}))
    }
}

struct DeleteLinkResponder(Shared);

impl Respond for DeleteLinkResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap();
        let source = body["id_origen"].as_i64().unwrap();
        let dest = body["id_destino"].as_i64().unwrap();
        self.0
            .lock()
            .unwrap()
            .links
            .retain(|(s, d, _)| !(*s == source && *d == dest));
        ResponseTemplate::new(200).set_body_json(json!({"message": "Enlace eliminado"}))
    }
}

struct ServersResponder(Shared);

impl Respond for ServersResponder {
    fn respond(&self, _: &Request) -> ResponseTemplate {
        let rows: Vec<Value> = self
            .0
            .lock()
            .unwrap()
            .servers
            .iter()
            .map(|host| {
                json!({"host_name": host, "video_path": "v.mp4", "ip_destino": "239.0.0.1",
                       "puerto": 5004, "server_weight": 1, "status": "activo"})
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(Value::Array(rows))
    }
}

struct StartServerResponder(Shared);

impl Respond for StartServerResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap();
        let host = body["host_name"].as_str().unwrap().to_owned();
        if host == "h4" {
            return ResponseTemplate::new(400)
                .set_body_json(json!({"error": "El host h4 no tiene video disponible"}));
        }
        self.0.lock().unwrap().servers.push(host);
        ResponseTemplate::new(200).set_body_json(json!({
            "message": "Servidor iniciado",
            "multicast_ip": "239.0.0.1",
            "multicast_port": 5004
        }))
    }
}

struct StopServerResponder(Shared);

impl Respond for StopServerResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = request.body_json().unwrap();
        let host = body["host_name"].as_str().unwrap();
        self.0.lock().unwrap().servers.retain(|h| h != host);
        ResponseTemplate::new(200).set_body_json(json!({"message": "Servidor detenido"}))
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

struct Harness {
    backend: MockServer,
    agent: MockServer,
    state: Shared,
}

async fn harness() -> Harness {
    let backend = MockServer::start().await;
    let agent = MockServer::start().await;
    let state = Shared::default();

    Mock::given(method("GET"))
        .and(path("/topology/get"))
        .respond_with(TopologyResponder(Arc::clone(&state)))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/topology/enlace"))
        .respond_with(CreateLinkResponder(Arc::clone(&state)))
        .mount(&backend)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/topology/enlace"))
        .respond_with(DeleteLinkResponder(Arc::clone(&state)))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/servers/active_servers"))
        .respond_with(ServersResponder(Arc::clone(&state)))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/servers/add"))
        .respond_with(StartServerResponder(Arc::clone(&state)))
        .mount(&backend)
        .await;
    Mock::given(method("POST"))
        .and(path("/servers/remove"))
        .respond_with(StopServerResponder(Arc::clone(&state)))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/client/active_clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active_clients": []})))
        .mount(&backend)
        .await;

    Harness {
        backend,
        agent,
        state,
    }
}

fn config(backend: &MockServer, agent: &MockServer) -> DashboardConfig {
    let mut config = DashboardConfig::new(
        Url::parse(&backend.uri()).unwrap(),
        Url::parse(&agent.uri()).unwrap(),
    )
    .without_polling();
    config.timeout = Duration::from_secs(5);
    config
}

async fn connected(h: &Harness) -> Controller {
    let controller = Controller::new(config(&h.backend, &h.agent));
    controller.connect().await.unwrap();
    controller
}

async fn wait_refreshed(events: &mut broadcast::Receiver<ReconcileEvent>, wanted: RefreshTarget) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await.unwrap() {
                ReconcileEvent::Refreshed { target } if target == wanted => break,
                _ => {}
            }
        }
    })
    .await
    .unwrap();
}

async fn drain(session: &mut PingSession) -> Vec<PingEvent> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(event) = session.next_event().await {
            let done = event == PingEvent::Finished;
            events.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .unwrap();
    events
}

fn sse(lines: &[&str]) -> String {
    lines.iter().map(|l| format!("data: {l}\n\n")).collect()
}

// ── Connection tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_loads_every_view() {
    let h = harness().await;
    let controller = connected(&h).await;
    let store = controller.store();

    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);
    assert_eq!(store.switch_count(), 2);
    assert_eq!(store.host_count(), 4);
    assert!(store.controller_online());

    let scene = store.scene();
    assert_eq!(scene.switches.len(), 2);
    assert_eq!(scene.hosts.len(), 4);
    assert!(scene.warnings.is_empty());
    assert!(!scene.viewport.is_default());

    assert_eq!(*store.client_candidates(), vec!["h1", "h2", "h3", "h4"]);
    assert!(controller.take_warnings().await.is_empty());
    controller.disconnect().await;
}

#[tokio::test]
async fn test_lifecycle_state_is_kept_without_watchers() {
    let h = harness().await;
    let controller = Controller::new(config(&h.backend, &h.agent));

    controller.connect().await.unwrap();
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);

    let result = controller
        .execute(Command::StopServer {
            host_name: "h1".into(),
        })
        .await;
    assert!(result.is_ok(), "got: {result:?}");

    controller.disconnect().await;
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_connect_tolerates_partial_failure() {
    let backend = MockServer::start().await;
    let agent = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topology/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "switches": [], "hosts": [], "enlaces": []
        })))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/servers/active_servers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/client/active_clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active_clients": []})))
        .mount(&backend)
        .await;

    let controller = Controller::new(config(&backend, &agent));
    controller.connect().await.unwrap();

    let warnings = controller.take_warnings().await;
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("servers"), "got: {warnings:?}");

    let scene = controller.store().scene();
    assert!(scene.is_empty());
    assert!(scene.viewport.is_default());
    assert!(!scene.controller_online);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_connect_fails_when_nothing_loads() {
    let backend = MockServer::start().await;
    let agent = MockServer::start().await;

    let controller = Controller::new(config(&backend, &agent));
    let result = controller.connect().await;

    assert!(result.is_err());
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_execute_requires_connection() {
    let h = harness().await;
    let controller = Controller::new(config(&h.backend, &h.agent));

    let result = controller
        .execute(Command::StopServer {
            host_name: "h1".into(),
        })
        .await;
    assert!(matches!(result, Err(CoreError::ControllerDisconnected)));
}

#[tokio::test]
async fn test_each_view_refreshes_independently() {
    let h = harness().await;
    let controller = connected(&h).await;
    let store = controller.store();
    assert_eq!(store.link_count(), 0);

    {
        let mut state = h.state.lock().unwrap();
        state.links.push((1, 2, 100));
        state.servers.push("h1".into());
    }

    controller.refresh_active_links().await.unwrap();
    assert_eq!(store.link_count(), 1);
    assert!(store.scene().links.is_empty());

    controller.load_topology().await.unwrap();
    assert_eq!(store.scene().links.len(), 1);

    assert!(!store.is_active_server("h1"));
    controller.refresh_active_servers().await.unwrap();
    assert!(store.is_active_server("h1"));
    assert_eq!(*store.client_candidates(), vec!["h2", "h3", "h4"]);

    controller.refresh_active_clients().await.unwrap();
    assert_eq!(store.client_count(), 0);
    controller.disconnect().await;
}

// ── Link tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_link_create_and_delete_refresh_the_scene() {
    let h = harness().await;
    let controller = connected(&h).await;
    let mut events = controller.reconcile_events();

    let result = controller
        .execute(Command::CreateLink(LinkRequest {
            source: 1,
            dest: 2,
            bandwidth_mbps: 500,
        }))
        .await
        .unwrap();
    assert_eq!(result.summary(), "Enlace creado");

    wait_refreshed(&mut events, RefreshTarget::Topology).await;
    let scene = controller.store().scene();
    assert_eq!(scene.links.len(), 1);
    assert_eq!(scene.links[0].tier, BandwidthTier::Elevated);

    controller
        .execute(Command::DeleteLink { source: 1, dest: 2 })
        .await
        .unwrap();
    wait_refreshed(&mut events, RefreshTarget::Topology).await;
    assert!(controller.store().scene().links.is_empty());

    controller.disconnect().await;
}

#[tokio::test]
async fn test_rejected_command_keeps_backend_message_and_state() {
    let h = harness().await;
    h.state.lock().unwrap().links.push((1, 2, 50));
    let controller = connected(&h).await;
    let before = controller.store().scene();

    let err = controller
        .execute(Command::CreateLink(LinkRequest {
            source: 1,
            dest: 2,
            bandwidth_mbps: 50,
        }))
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "El enlace ya existe");
    assert_eq!(controller.store().scene(), before);
    assert_eq!(before.links[0].tier, BandwidthTier::Moderate);
    controller.disconnect().await;
}

#[tokio::test]
async fn test_invalid_link_never_reaches_backend() {
    let h = harness().await;
    let controller = connected(&h).await;

    let err = controller
        .execute(Command::CreateLink(LinkRequest {
            source: 1,
            dest: 1,
            bandwidth_mbps: 100,
        }))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert!(h.state.lock().unwrap().links.is_empty());
    controller.disconnect().await;
}

// ── Server tests ────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_start_and_stop_update_client_candidates() {
    let h = harness().await;
    let controller = connected(&h).await;
    let mut events = controller.reconcile_events();

    let result = controller
        .execute(Command::StartServer(StartServerRequest {
            host_name: "h1".into(),
            video_path: "v.mp4".into(),
            weight: 1,
        }))
        .await
        .unwrap();
    match result {
        CommandResult::ServerStarted(started) => {
            assert_eq!(started.host_name, "h1");
            assert_eq!(started.multicast_port, 5004);
        }
        other => panic!("expected ServerStarted, got: {other:?}"),
    }

    wait_refreshed(&mut events, RefreshTarget::Servers).await;
    let store = controller.store();
    assert!(store.is_active_server("h1"));
    assert_eq!(*store.client_candidates(), vec!["h2", "h3", "h4"]);

    controller
        .execute(Command::StopServer {
            host_name: "h1".into(),
        })
        .await
        .unwrap();
    wait_refreshed(&mut events, RefreshTarget::Servers).await;
    assert!(!store.is_active_server("h1"));
    assert_eq!(*store.client_candidates(), vec!["h1", "h2", "h3", "h4"]);

    controller.disconnect().await;
}

#[tokio::test]
async fn test_batch_start_reports_each_host() {
    let h = harness().await;
    let controller = connected(&h).await;

    let report = controller
        .start_servers(vec!["h1".into(), "h4".into(), "h3".into()], "v.mp4", 2)
        .await
        .unwrap();

    assert_eq!(report.succeeded().count(), 2);
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].host, "h4");
    assert_eq!(
        failed[0].outcome.as_ref().unwrap_err(),
        "El host h4 no tiene video disponible"
    );
    assert_eq!(h.state.lock().unwrap().servers, vec!["h1", "h3"]);
    controller.disconnect().await;
}

// ── Reconcile tests ─────────────────────────────────────────────────

#[tokio::test]
async fn test_manual_refresh_reports_failure_generically() {
    let h = harness().await;
    let controller = connected(&h).await;
    let mut events = controller.reconcile_events();

    h.backend.reset().await;
    Mock::given(method("GET"))
        .and(path("/client/active_clients"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&h.backend)
        .await;

    controller
        .request_refresh(RefreshSet::only(RefreshTarget::Clients))
        .await;

    let event = tokio::time::timeout(Duration::from_secs(5), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        event,
        ReconcileEvent::Failed {
            target: RefreshTarget::Clients,
            message: "connection error".into(),
        }
    );
    assert_eq!(controller.store().host_count(), 4);
    controller.disconnect().await;
}

// ── Ping tests ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping_sentinel_triggers_one_path_request() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/mininet/ping_between_hosts_stream"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse(&[
                    "Ejecutando Ping entre h1 y h2",
                    "64 bytes from 10.0.0.2: icmp_seq=1 ttl=64 time=0.1 ms",
                    "Fin del ping",
                    "late line after the sentinel",
                ])),
        )
        .mount(&h.agent)
        .await;
    Mock::given(method("POST"))
        .and(path("/dijkstra/calculate_path"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "path": [
                {"dpid": 1, "out_port": 2, "in_port": null},
                {"dpid": 2, "out_port": 1, "in_port": 3}
            ]
        })))
        .expect(1)
        .mount(&h.backend)
        .await;

    let controller = connected(&h).await;
    let mut session = controller.ping("h1", "00:00:00:00:00:02").await.unwrap();
    assert_eq!(session.destination().mac, MacAddress::new("00:00:00:00:00:02"));

    let events = drain(&mut session).await;
    let lines: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            PingEvent::Line(l) => Some(l.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "Fin del ping");
    assert!(events.contains(&PingEvent::Closed(PingEnd::Sentinel)));

    let overlay = events
        .iter()
        .find_map(|e| match e {
            PingEvent::Route { overlay, .. } => Some(overlay.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(overlay.switch_ids, vec![1, 2]);
    assert_eq!(overlay.points.len(), 4);
    assert!(overlay.unresolved.is_empty());

    controller.disconnect().await;
    h.backend.verify().await;
}

#[tokio::test]
async fn test_ping_stream_error_still_requests_path_once() {
    let h = harness().await;

    Mock::given(method("GET"))
        .and(path("/mininet/ping_between_hosts_stream"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_string("data: ERROR: No se encontró información para el host\n\n"),
        )
        .mount(&h.agent)
        .await;
    Mock::given(method("POST"))
        .and(path("/dijkstra/calculate_path"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Ruta no encontrada"})))
        .expect(1)
        .mount(&h.backend)
        .await;

    let controller = connected(&h).await;
    let mut session = controller.ping("h1", "h2").await.unwrap();
    let events = drain(&mut session).await;

    assert!(
        events
            .iter()
            .any(|e| matches!(e, PingEvent::Closed(PingEnd::StreamError(_))))
    );
    assert!(events.contains(&PingEvent::RouteFailed("Ruta no encontrada".into())));
    assert_eq!(events.last(), Some(&PingEvent::Finished));

    controller.disconnect().await;
    h.backend.verify().await;
}

#[tokio::test]
async fn test_ping_rejects_unknown_and_identical_hosts() {
    let h = harness().await;
    let controller = connected(&h).await;

    let unknown = controller.ping("h1", "h9").await.err().unwrap();
    assert!(matches!(unknown, CoreError::NotFound { .. }));

    let same = controller.ping("h1", "00:00:00:00:00:01").await.err().unwrap();
    assert!(matches!(same, CoreError::ValidationFailed { .. }));

    controller.disconnect().await;
}
