// ── Command API ──
//
// Every write against the backend or the agent flows through `Command`.
// The controller validates, routes, and then schedules the refreshes the
// command affects.

pub mod requests;

use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::model::{BalancingAlgorithm, ClientStarted, RoutingAlgorithm, ServerStarted};
use crate::reconcile::RefreshSet;

pub use requests::{
    FlowRuleRequest, LinkRequest, StartServerRequest, StartServersRequest, validate_host_name,
};

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All write operations.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Link operations ──────────────────────────────────────────────
    CreateLink(LinkRequest),
    UpdateLink(LinkRequest),
    DeleteLink { source: i64, dest: i64 },

    // ── Server operations ────────────────────────────────────────────
    StartServer(StartServerRequest),
    StartServers(StartServersRequest),
    StopServer { host_name: String },

    // ── Client operations ────────────────────────────────────────────
    /// Ask the backend for a stream assignment, then start a player.
    StartClient { host: String },
    StopClient { host: String, pid: Option<u32> },

    // ── Algorithm configuration ──────────────────────────────────────
    SetBalancing(BalancingAlgorithm),
    SetRouting(RoutingAlgorithm),
    SetServerWeights(BTreeMap<String, u32>),

    // ── Flow rules ───────────────────────────────────────────────────
    CreateFlowRule { dpid: u64, rule: FlowRuleRequest },
    UpdateFlowRule { rule_id: i64, rule: FlowRuleRequest },
    DeleteFlowRule { rule_id: i64 },
}

impl Command {
    /// Local checks run before anything is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::CreateLink(req) | Self::UpdateLink(req) => req.validate(),
            Self::DeleteLink { source, dest } => {
                if source == dest {
                    Err(CoreError::ValidationFailed {
                        message: "a link needs two different switches".into(),
                    })
                } else {
                    Ok(())
                }
            }
            Self::StartServer(req) => req.validate(),
            Self::StartServers(req) => req.validate(),
            Self::StopServer { host_name } => validate_host_name(host_name),
            Self::StartClient { host } | Self::StopClient { host, .. } => validate_host_name(host),
            Self::SetServerWeights(weights) => {
                if weights.is_empty() {
                    return Err(CoreError::ValidationFailed {
                        message: "no weights given".into(),
                    });
                }
                for (host, weight) in weights {
                    validate_host_name(host)?;
                    if *weight < 1 {
                        return Err(CoreError::ValidationFailed {
                            message: format!("weight for {host} must be at least 1"),
                        });
                    }
                }
                Ok(())
            }
            Self::SetBalancing(_) | Self::SetRouting(_) | Self::DeleteFlowRule { .. } => Ok(()),
            Self::CreateFlowRule { rule, .. } | Self::UpdateFlowRule { rule, .. } => rule.validate(),
        }
    }

    /// Views to refresh after the command succeeds.
    pub fn refresh_targets(&self) -> RefreshSet {
        match self {
            Self::CreateLink(_)
            | Self::UpdateLink(_)
            | Self::DeleteLink { .. }
            | Self::StartServer(_)
            | Self::StartServers(_)
            | Self::StopServer { .. }
            | Self::StartClient { .. }
            | Self::StopClient { .. } => RefreshSet::all(),
            Self::SetServerWeights(_) => RefreshSet::only(crate::reconcile::RefreshTarget::Servers),
            Self::SetBalancing(_)
            | Self::SetRouting(_)
            | Self::CreateFlowRule { .. }
            | Self::UpdateFlowRule { .. }
            | Self::DeleteFlowRule { .. } => RefreshSet::empty(),
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// Backend or agent confirmation text.
    Message(String),
    ServerStarted(ServerStarted),
    ClientStarted(ClientStarted),
    Batch(BatchReport),
}

impl CommandResult {
    /// One-line summary for notifications.
    pub fn summary(&self) -> String {
        match self {
            Self::Message(m) => m.clone(),
            Self::ServerStarted(s) => format!(
                "{}: streaming on {}:{}",
                s.host_name, s.multicast_ip, s.multicast_port
            ),
            Self::ClientStarted(c) => format!(
                "{}: playing {}:{} from {}",
                c.host, c.assignment.multicast_ip, c.assignment.multicast_port, c.assignment.server_host
            ),
            Self::Batch(report) => report.summary(),
        }
    }
}

/// Per-host outcome of a batch server start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostOutcome {
    pub host: String,
    pub outcome: Result<ServerStarted, String>,
}

/// Results of a batch, in request order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub outcomes: Vec<HostOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &HostOutcome> {
        self.outcomes.iter().filter(|o| o.outcome.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &HostOutcome> {
        self.outcomes.iter().filter(|o| o.outcome.is_err())
    }

    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.succeeded().next().is_none()
    }

    pub fn summary(&self) -> String {
        let ok = self.succeeded().count();
        let mut text = format!("{ok}/{} servers started", self.outcomes.len());
        for failure in self.failed() {
            if let Err(message) = &failure.outcome {
                text.push_str(&format!("; {}: {message}", failure.host));
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::RefreshTarget;

    #[test]
    fn mutations_refresh_everything() {
        let cmd = Command::StopServer {
            host_name: "h1".into(),
        };
        assert_eq!(cmd.refresh_targets(), RefreshSet::all());
        assert!(Command::DeleteFlowRule { rule_id: 1 }.refresh_targets().is_empty());
        assert!(
            Command::SetServerWeights(BTreeMap::from([("h1".into(), 2)]))
                .refresh_targets()
                .contains(RefreshTarget::Servers)
        );
    }

    #[test]
    fn zero_weight_rejected() {
        let cmd = Command::SetServerWeights(BTreeMap::from([("h1".into(), 0)]));
        assert!(cmd.validate().is_err());
    }

    #[test]
    fn batch_summary_lists_failures() {
        let report = BatchReport {
            outcomes: vec![
                HostOutcome {
                    host: "h1".into(),
                    outcome: Ok(ServerStarted {
                        host_name: "h1".into(),
                        message: "ok".into(),
                        multicast_ip: "239.0.0.1".into(),
                        multicast_port: 5004,
                    }),
                },
                HostOutcome {
                    host: "h2".into(),
                    outcome: Err("Host no encontrado".into()),
                },
            ],
        };
        assert!(!report.all_failed());
        assert_eq!(report.summary(), "1/2 servers started; h2: Host no encontrado");
    }
}
