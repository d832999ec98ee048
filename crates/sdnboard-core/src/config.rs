// ── Runtime dashboard configuration ──
//
// Describes where the services live and how often to reconcile. Core never
// reads config files; the CLI/TUI build a `DashboardConfig` and hand it in.

use std::time::Duration;

use url::Url;

use crate::render::HostLayout;

/// Lines that end a ping transcript when they appear in a stream line.
pub const DEFAULT_PING_SENTINELS: &[&str] = &["Fin del ping", "error de conexión"];

/// Configuration for one testbed.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend REST API root (e.g. `http://127.0.0.1:5000`).
    pub backend_url: Url,
    /// Emulation agent root (e.g. `http://127.0.0.1:5001`).
    pub agent_url: Url,
    /// Ryu REST root. When set together with `install_routes`, computed
    /// ping paths are pushed to the controller.
    pub ryu_url: Option<Url>,
    /// Request timeout.
    pub timeout: Duration,
    /// Topology, server, and client refresh period. Zero disables the timer.
    pub dashboard_poll_interval: Duration,
    /// Link table refresh period. Zero disables the timer.
    pub links_poll_interval: Duration,
    pub host_layout: HostLayout,
    pub install_routes: bool,
    /// Case-insensitive substrings that terminate a ping stream.
    pub ping_sentinels: Vec<String>,
}

impl DashboardConfig {
    pub fn new(backend_url: Url, agent_url: Url) -> Self {
        Self {
            backend_url,
            agent_url,
            ryu_url: None,
            timeout: Duration::from_secs(30),
            dashboard_poll_interval: Duration::from_secs(5),
            links_poll_interval: Duration::from_secs(10),
            host_layout: HostLayout::default(),
            install_routes: false,
            ping_sentinels: DEFAULT_PING_SENTINELS
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
        }
    }

    /// Same endpoints with both timers disabled.
    #[must_use]
    pub fn without_polling(mut self) -> Self {
        self.dashboard_poll_interval = Duration::ZERO;
        self.links_poll_interval = Duration::ZERO;
        self
    }
}
