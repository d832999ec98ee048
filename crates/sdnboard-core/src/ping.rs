//! Ping sessions.
//!
//! A session streams the agent's ping transcript line by line. It ends on
//! a sentinel line, a stream error, or end of stream; in each of those
//! cases the stream is closed and exactly one path calculation follows,
//! so the route between the two hosts can be drawn. Cancelling a session
//! closes the stream without asking for a path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sdnboard_api::{AgentClient, BackendClient, RyuClient};

use crate::convert::route_from_payload;
use crate::error::CoreError;
use crate::model::{Host, RoutePath};
use crate::render::RouteOverlay;
use crate::store::DataStore;

// ── Sentinels ──────────────────────────────────────────────────────

/// Case-insensitive substrings that mark the last line of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingSentinels(Vec<String>);

impl PingSentinels {
    pub fn new(phrases: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self(
            phrases
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        )
    }

    pub fn is_terminal(&self, line: &str) -> bool {
        let line = line.to_lowercase();
        self.0.iter().any(|s| line.contains(s.as_str()))
    }
}

// ── Events ─────────────────────────────────────────────────────────

/// Why the transcript stream stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PingEnd {
    Sentinel,
    EndOfStream,
    StreamError(String),
    Cancelled,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PingEvent {
    Line(String),
    /// The stream has been closed.
    Closed(PingEnd),
    Route {
        path: RoutePath,
        overlay: RouteOverlay,
    },
    RouteFailed(String),
    RouteInstalled(String),
    RouteInstallFailed(String),
    /// Last event of every session.
    Finished,
}

// ── Session ────────────────────────────────────────────────────────

/// Handle to a running ping. Dropping it cancels the ping.
pub struct PingSession {
    source: Arc<Host>,
    destination: Arc<Host>,
    events: mpsc::UnboundedReceiver<PingEvent>,
    cancel: CancellationToken,
}

impl PingSession {
    pub fn source(&self) -> &Host {
        &self.source
    }

    pub fn destination(&self) -> &Host {
        &self.destination
    }

    /// Next event, or `None` after [`PingEvent::Finished`] was delivered.
    pub async fn next_event(&mut self) -> Option<PingEvent> {
        self.events.recv().await
    }

    /// Close the stream. No path is requested afterwards.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

impl Drop for PingSession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Everything a ping task needs, captured at start.
pub(crate) struct PingJob {
    pub backend: BackendClient,
    pub agent: AgentClient,
    pub ryu: Option<RyuClient>,
    pub store: Arc<DataStore>,
    pub source: Arc<Host>,
    pub destination: Arc<Host>,
    pub sentinels: PingSentinels,
    pub install_routes: bool,
}

pub(crate) fn spawn_ping(job: PingJob, parent: &CancellationToken) -> PingSession {
    let (tx, events) = mpsc::unbounded_channel();
    let cancel = parent.child_token();
    let source = Arc::clone(&job.source);
    let destination = Arc::clone(&job.destination);
    tokio::spawn(run_ping(job, tx, cancel.clone()));

    PingSession {
        source,
        destination,
        events,
        cancel,
    }
}

async fn run_ping(job: PingJob, tx: mpsc::UnboundedSender<PingEvent>, cancel: CancellationToken) {
    let emit = |event: PingEvent| {
        let _ = tx.send(event);
    };

    info!(src = %job.source.name, dst = %job.destination.name, "starting ping");
    let end = stream_transcript(&job, &emit, &cancel).await;
    debug!(?end, "ping stream closed");
    let cancelled = end == PingEnd::Cancelled;
    emit(PingEvent::Closed(end));

    if !cancelled {
        match request_route(&job).await {
            Ok(path) => {
                let overlay = job.store.scene().route_overlay(&path);
                let install = job.install_routes && !path.is_empty();
                emit(PingEvent::Route {
                    path: path.clone(),
                    overlay,
                });
                if install {
                    emit(install_route(&job, &path).await);
                }
            }
            Err(e) => {
                warn!(error = %e, "path calculation failed");
                emit(PingEvent::RouteFailed(e.user_message()));
            }
        }
    }

    emit(PingEvent::Finished);
}

async fn stream_transcript(
    job: &PingJob,
    emit: &impl Fn(PingEvent),
    cancel: &CancellationToken,
) -> PingEnd {
    let opened = tokio::select! {
        biased;
        () = cancel.cancelled() => return PingEnd::Cancelled,
        opened = job.agent.ping_stream(&job.source.name, &job.destination.name) => opened,
    };
    let mut lines = match opened {
        Ok(lines) => lines,
        Err(e) => {
            let message = e.remote_message().map_or_else(|| e.to_string(), str::to_owned);
            emit(PingEvent::Line(message.clone()));
            return PingEnd::StreamError(message);
        }
    };

    let end = loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break PingEnd::Cancelled,
            next = lines.next_line() => match next {
                Some(Ok(line)) => {
                    let terminal = job.sentinels.is_terminal(&line);
                    emit(PingEvent::Line(line));
                    if terminal {
                        break PingEnd::Sentinel;
                    }
                }
                Some(Err(e)) => break PingEnd::StreamError(e.to_string()),
                None => break PingEnd::EndOfStream,
            },
        }
    };
    lines.close();
    end
}

async fn request_route(job: &PingJob) -> Result<RoutePath, CoreError> {
    let payload = job
        .backend
        .calculate_path(job.source.mac.as_str(), job.destination.mac.as_str())
        .await?;
    Ok(route_from_payload(
        &job.source.mac,
        &job.destination.mac,
        payload,
    ))
}

async fn install_route(job: &PingJob, path: &RoutePath) -> PingEvent {
    let (Some(ryu), Some(src), Some(dst)) = (&job.ryu, path.src_dpid(), path.dst_dpid()) else {
        return PingEvent::RouteInstallFailed("no controller endpoint configured".into());
    };
    match ryu
        .add_path(src.as_u64(), dst.as_u64(), &path.ryu_hops())
        .await
    {
        Ok(message) => PingEvent::RouteInstalled(message),
        Err(e) => {
            warn!(error = %e, "route install failed");
            PingEvent::RouteInstallFailed(CoreError::from(e).user_message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PING_SENTINELS;

    #[test]
    fn sentinel_matching_is_substring_and_case_insensitive() {
        let sentinels = PingSentinels::new(DEFAULT_PING_SENTINELS);
        assert!(sentinels.is_terminal("--- Fin del ping ---"));
        assert!(sentinels.is_terminal("ERROR DE CONEXIÓN con el agente"));
        assert!(!sentinels.is_terminal("64 bytes from 10.0.0.2: icmp_seq=1"));
    }

    #[test]
    fn empty_phrases_are_ignored() {
        let sentinels = PingSentinels::new(["", "done"]);
        assert!(!sentinels.is_terminal("anything"));
        assert!(sentinels.is_terminal("DONE"));
    }
}
