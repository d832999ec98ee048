// Agent request and response types

use serde::{Deserialize, Serialize};

/// Body for `POST /mininet/start_ffmpeg_client`.
#[derive(Debug, Clone, Serialize)]
pub struct StartPlayerBody<'a> {
    pub host: &'a str,
    pub multicast_ip: &'a str,
    #[serde(rename = "puerto")]
    pub port: u16,
}

/// Body for `POST /mininet/stop_ffmpeg_client`.
#[derive(Debug, Clone, Serialize)]
pub struct StopPlayerBody<'a> {
    pub host: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffplay_pid: Option<u32>,
}

/// The `{success, message, ...}` reply every agent command returns.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentReply {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub ffplay_client_pid: Option<u32>,
}
