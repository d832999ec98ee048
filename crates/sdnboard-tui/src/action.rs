//! All possible UI actions. Actions are the sole mechanism for state
//! mutation; every entity they name is carried by its key (host name,
//! MAC, switch-id pair), never by a callback.

use std::fmt;
use std::sync::Arc;

use sdnboard_core::{
    ActiveClient, ActiveServer, AlgorithmComparison, AlgorithmConfig, EventLogEntry, Link,
    LinkRequest, MacAddress, PingEvent, ReconcileEvent, Scene, StatsSummaryRow, Topology,
};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification. Backend messages are shown verbatim.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Destructive operations waiting for y/n.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteLink { source: i64, dest: i64 },
    StopServer { host_name: String },
    StopClient { host: String },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteLink { source, dest } => write!(f, "Delete link {source} → {dest}?"),
            Self::StopServer { host_name } => write!(f, "Stop video server on {host_name}?"),
            Self::StopClient { host } => write!(f, "Stop client on {host}?"),
        }
    }
}

/// Everything the Stats screen shows, fetched in one go.
#[derive(Debug, Clone, Default)]
pub struct StatsData {
    pub config: Option<AlgorithmConfig>,
    pub summary: Vec<StatsSummaryRow>,
    pub logs: Vec<EventLogEntry>,
    pub comparison: Option<AlgorithmComparison>,
    /// Per-section failures, already reduced to user messages.
    pub errors: Vec<String>,
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,

    // ── Data events (from the store) ──────────────────────────────
    SceneUpdated {
        scene: Arc<Scene>,
        topology: Arc<Topology>,
    },
    LinksUpdated(Arc<Vec<Arc<Link>>>),
    ServersUpdated(Arc<Vec<Arc<ActiveServer>>>),
    ClientsUpdated(Arc<Vec<Arc<ActiveClient>>>),
    CandidatesUpdated(Arc<Vec<String>>),
    Reconciled(ReconcileEvent),

    // ── Connection status ─────────────────────────────────────────
    Connecting,
    Connected,
    Disconnected(String),

    // ── Ping ──────────────────────────────────────────────────────
    RequestPing {
        source: MacAddress,
        destination: MacAddress,
    },
    PingStarted {
        source: String,
        destination: String,
    },
    Ping(PingEvent),
    CancelPing,

    // ── Host roles ────────────────────────────────────────────────
    RequestStartServer {
        host_name: String,
        video_path: String,
        weight: u32,
    },
    RequestStartClient {
        host: String,
    },
    /// Stop whatever role the host currently has.
    RequestStopRole {
        host: String,
    },
    RequestStopServer {
        host_name: String,
    },
    RequestStopClient {
        host: String,
    },

    // ── Links ─────────────────────────────────────────────────────
    RequestCreateLink(LinkRequest),
    RequestUpdateLink(LinkRequest),
    RequestDeleteLink {
        source: i64,
        dest: i64,
    },

    // ── Stats ─────────────────────────────────────────────────────
    RequestStats,
    StatsUpdated(Box<StatsData>),

    // ── Confirm dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
