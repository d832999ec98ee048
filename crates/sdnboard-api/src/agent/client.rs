// Agent HTTP client
//
// The agent lives on its own base URL, separate from the backend.

use tracing::debug;
use url::Url;

use crate::agent::models::{AgentReply, StartPlayerBody, StopPlayerBody};
use crate::agent::ping::PingLines;
use crate::error::Error;
use crate::response::{decode_json, embedded_error, preview};
use crate::transport::TransportConfig;

/// Outcome of a successful player launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerStarted {
    pub message: String,
    pub pid: Option<u32>,
}

/// Raw HTTP client for the Mininet emulation agent.
#[derive(Clone)]
pub struct AgentClient {
    http: reqwest::Client,
    /// Separate client without an overall timeout for the ping stream.
    stream_http: reqwest::Client,
    base_url: Url,
}

impl AgentClient {
    /// Create a new agent client.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            stream_http: transport.build_streaming_client()?,
            base_url,
        })
    }

    /// Create an agent client with a pre-built `reqwest::Client`, used for
    /// both ordinary requests and streams.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            stream_http: http.clone(),
            http,
            base_url,
        }
    }

    /// The agent base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn agent_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{base}/mininet/{path}"))?)
    }

    // ── Player control ───────────────────────────────────────────────

    /// Launch a multicast player on `host`.
    ///
    /// `POST /mininet/start_ffmpeg_client`
    pub async fn start_player(
        &self,
        host: &str,
        multicast_ip: &str,
        port: u16,
    ) -> Result<PlayerStarted, Error> {
        let url = self.agent_url("start_ffmpeg_client")?;
        debug!("POST {}", url);
        debug!(host, multicast_ip, port, "starting player");

        let body = StartPlayerBody {
            host,
            multicast_ip,
            port,
        };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;
        let reply = Self::check(decode_json::<AgentReply>(resp).await?)?;

        Ok(PlayerStarted {
            message: reply
                .message
                .unwrap_or_else(|| format!("player started on {host}")),
            pid: reply.ffplay_client_pid,
        })
    }

    /// Stop the player on `host`. Without a pid the agent kills whatever
    /// player it finds for that host.
    ///
    /// `POST /mininet/stop_ffmpeg_client`
    pub async fn stop_player(&self, host: &str, pid: Option<u32>) -> Result<String, Error> {
        let url = self.agent_url("stop_ffmpeg_client")?;
        debug!("POST {}", url);
        debug!(host, ?pid, "stopping player");

        let body = StopPlayerBody {
            host,
            ffplay_pid: pid,
        };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;
        let reply = Self::check(decode_json::<AgentReply>(resp).await?)?;

        Ok(reply
            .message
            .unwrap_or_else(|| format!("player stopped on {host}")))
    }

    // ── Ping stream ──────────────────────────────────────────────────

    /// Open the ping event stream between two hosts.
    ///
    /// `GET /mininet/ping_between_hosts_stream?origen=&destino=`
    ///
    /// Fails on a non-success status; the agent reports bad parameters as a
    /// single `data: ERROR: ...` event, which becomes the error message.
    pub async fn ping_stream(&self, origin: &str, destination: &str) -> Result<PingLines, Error> {
        let mut url = self.agent_url("ping_between_hosts_stream")?;
        url.query_pairs_mut()
            .append_pair("origen", origin)
            .append_pair("destino", destination);
        debug!("GET {}", url);

        let resp = self
            .stream_http
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = embedded_error(&body)
                .or_else(|| first_event(&body))
                .unwrap_or_else(|| preview(&body).to_owned());
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        Ok(PingLines::new(resp))
    }

    fn check(reply: AgentReply) -> Result<AgentReply, Error> {
        if reply.success {
            Ok(reply)
        } else {
            Err(Error::Agent {
                message: reply
                    .message
                    .unwrap_or_else(|| "agent reported failure".into()),
            })
        }
    }
}

/// First `data:` payload in a buffered SSE body.
fn first_event(body: &str) -> Option<String> {
    let mut decoder = super::sse::SseDecoder::new();
    decoder.push(body.as_bytes());
    decoder.finish();
    decoder.next_event()
}
