//! Integration tests for the `sdnboard` CLI binary.
//!
//! Argument parsing, help output, and completions run without any
//! testbed. Commands that need one run against a wiremock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `sdnboard` binary with env isolation.
///
/// Clears all `SDNBOARD_*` env vars and points the config file at a
/// fresh temp dir so tests never touch the user's real configuration.
fn sdnboard_cmd(config_dir: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("sdnboard");
    cmd.env("HOME", config_dir.path())
        .env("XDG_CONFIG_HOME", config_dir.path())
        .env("SDNBOARD_CONFIG", config_dir.path().join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("SDNBOARD_PROFILE")
        .env_remove("SDNBOARD_BACKEND")
        .env_remove("SDNBOARD_AGENT")
        .env_remove("SDNBOARD_RYU")
        .env_remove("SDNBOARD_OUTPUT")
        .env_remove("SDNBOARD_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn isolated() -> (tempfile::TempDir, assert_cmd::Command) {
    let dir = tempfile::tempdir().unwrap();
    let cmd = sdnboard_cmd(&dir);
    (dir, cmd)
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Backend with two placed switches joined by a 500 Mbps link.
async fn testbed() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topology/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "switches": [
                {"id_switch": 1, "nombre": "Madrid", "dpid_str": "0000000000000001",
                 "latitud": 40.42, "longitud": -3.70, "status": "conectado"},
                {"id_switch": 2, "nombre": "Paris", "dpid_str": "0000000000000002",
                 "latitud": 48.86, "longitud": 2.35, "status": "conectado"}
            ],
            "hosts": [
                {"mac": "00:00:00:00:00:01", "nombre": "h1", "ip": "10.0.0.1",
                 "id_switch_conectado": 1},
                {"mac": "00:00:00:00:00:02", "nombre": "h2", "ip": "10.0.0.2",
                 "id_switch_conectado": 2}
            ],
            "enlaces": [
                {"id_origen": 1, "id_destino": 2, "ancho_banda": 500}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/servers/active_servers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"host_name": "h1", "video_path": "v.mp4", "ip_destino": "239.0.0.1",
             "puerto": 5004, "server_weight": 1, "status": "activo"}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/client/active_clients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"active_clients": []})))
        .mount(&server)
        .await;

    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let (_dir, mut cmd) = isolated();
    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--help").assert().success().stdout(
        predicate::str::contains("SDN")
            .and(predicate::str::contains("topology"))
            .and(predicate::str::contains("links"))
            .and(predicate::str::contains("ping")),
    );
}

#[test]
fn test_version_flag() {
    let (_dir, mut cmd) = isolated();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sdnboard"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let (_dir, mut cmd) = isolated();
    cmd.args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_unknown_balancing_algorithm_is_usage_error() {
    let (_dir, mut cmd) = isolated();
    let output = cmd.args(["algorithms", "balancing", "random"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_server_weight_must_be_positive() {
    let (_dir, mut cmd) = isolated();
    let output = cmd
        .args(["servers", "start", "h1", "--video", "v.mp4", "--weight", "0"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_override() {
    let (dir, mut cmd) = isolated();
    cmd.args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            dir.path().join("config.toml").to_string_lossy().into_owned(),
        ));
}

#[test]
fn test_config_set_then_show() {
    let dir = tempfile::tempdir().unwrap();
    sdnboard_cmd(&dir)
        .args(["config", "set", "backend_url", "http://lab:5000"])
        .assert()
        .success();
    sdnboard_cmd(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("backend_url = \"http://lab:5000\""));
}

#[test]
fn test_unknown_profile_exits_not_found() {
    let (_dir, mut cmd) = isolated();
    let output = cmd.args(["-p", "nope", "topology", "show"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("nope"));
}

// ── Against a backend ───────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_links_list_json() {
    let server = testbed().await;
    let (_dir, mut cmd) = isolated();
    cmd.args(["--backend", &server.uri(), "links", "list", "-o", "json"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    let links: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(links[0]["bandwidth_mbps"], 500);
    assert_eq!(links[0]["tier"], "elevated");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_client_candidates_exclude_servers() {
    let server = testbed().await;
    let (_dir, mut cmd) = isolated();
    cmd.args(["--backend", &server.uri(), "clients", "candidates", "-o", "plain"]);

    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "h2");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_link_create_shows_backend_message() {
    let server = testbed().await;
    Mock::given(method("POST"))
        .and(path("/topology/enlace"))
        .and(body_json(json!({"id_origen": 1, "id_destino": 2, "ancho_banda": 100})))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "El enlace ya existe"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, mut cmd) = isolated();
    cmd.args(["--backend", &server.uri(), "links", "create", "1", "2", "100"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(6));
    assert!(String::from_utf8_lossy(&output.stderr).contains("El enlace ya existe"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_self_link_is_rejected_locally() {
    let server = testbed().await;
    Mock::given(method("POST"))
        .and(path("/topology/enlace"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"message": "Enlace creado"})))
        .expect(0)
        .mount(&server)
        .await;

    let (_dir, mut cmd) = isolated();
    cmd.args(["--backend", &server.uri(), "links", "create", "2", "2", "100"]);

    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unreachable_backend_exits_with_connection_code() {
    let (_dir, mut cmd) = isolated();
    let output = cmd
        .args(["--backend", "http://127.0.0.1:1", "--timeout", "5", "topology", "show"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}
