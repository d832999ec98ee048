//! Reactive data layer between `sdnboard-api` and the dashboard frontends
//! (CLI / TUI).
//!
//! This crate owns the domain model, the topology renderer, host selection,
//! and the reconciliation machinery for one SDN testbed:
//!
//! - **[`Controller`]**: lifecycle facade. [`connect()`](Controller::connect)
//!   loads every view once, then spawns the command processor and the
//!   reconcile scheduler. [`Controller::oneshot()`](Controller::oneshot) runs
//!   a single CLI invocation without polling.
//!
//! - **[`DataStore`]**: `EntityCollection<T>` maps (`DashMap` plus
//!   `tokio::sync::watch`) holding switches, hosts, links, servers and
//!   clients, together with the rendered [`Scene`] and the client
//!   candidate list derived from them.
//!
//! - **[`TopologyRenderer`]**: pure function from a [`Topology`] to a
//!   [`Scene`] of placed markers, tiered link lines, a viewport, and
//!   warnings for the entries it had to skip.
//!
//! - **[`SelectionController`]**: at most two selected hosts, FIFO eviction,
//!   and the role shown for each host.
//!
//! - **[`Command`]**: typed writes routed through an `mpsc` channel. Each
//!   success schedules a refresh of the views it touches; stale refresh
//!   results are dropped by generation.
//!
//! - **[`PingSession`]**: a streamed ping between two hosts, ending in one
//!   path computation.

pub mod command;
pub mod config;
pub mod controller;
mod convert;
pub mod error;
pub mod model;
pub mod ping;
pub mod reconcile;
pub mod render;
pub mod selection;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{BatchReport, Command, CommandResult, HostOutcome};
pub use config::{DEFAULT_PING_SENTINELS, DashboardConfig};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use ping::{PingEnd, PingEvent, PingSentinels, PingSession};
pub use reconcile::{ReconcileEvent, RefreshSet, RefreshTarget};
pub use render::{
    BandwidthTier, Bounds, HostLayout, HostMarker, LinkLine, RenderWarning, RouteOverlay, Scene,
    SwitchMarker, TopologyRenderer, Viewport,
};
pub use selection::{
    DisplayedRole, HostRole, MAX_SELECTION, RoleIndex, SelectionController, SelectionError,
    ToggleOutcome,
};
pub use store::DataStore;
pub use stream::{EntityStream, EntityWatchStream};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ActiveClient, ActiveServer, AlgorithmComparison, AlgorithmConfig, BalancingAlgorithm,
    ClientStarted, Dpid, EventLogEntry, FlowRule, FlowRuleLog, GeoPoint, Host, LatencyMetrics,
    Link, MacAddress, PathHop, RoutePath, RoutingAlgorithm, ServerStarted, StatsSummaryRow,
    StreamAssignment, Switch, SwitchStatus, Topology,
};
