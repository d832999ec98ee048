// ── Host selection ──
//
// The selection is the ordered set of at most two hosts that ping, server,
// and client actions target. Roles (active server / active client) come
// from the store and are independent of selection; the pair of them
// determines how a host is drawn.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use crate::model::{ActiveClient, ActiveServer, MacAddress, Topology};

/// Maximum number of selected hosts.
pub const MAX_SELECTION: usize = 2;

/// What a toggle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
    /// The selection was full; the oldest entry made room.
    Replaced { evicted: MacAddress },
}

/// Wrong number of hosts selected for an action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{action} needs exactly {required} selected host(s), {actual} selected")]
pub struct SelectionError {
    pub action: &'static str,
    pub required: usize,
    pub actual: usize,
}

// ── Roles ───────────────────────────────────────────────────────────

/// Backend-derived role of a host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum HostRole {
    #[default]
    Plain,
    Server,
    Client,
}

/// Host names currently acting as servers or clients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleIndex {
    servers: HashSet<String>,
    clients: HashSet<String>,
}

impl RoleIndex {
    pub fn new<'a>(
        servers: impl IntoIterator<Item = &'a ActiveServer>,
        clients: impl IntoIterator<Item = &'a ActiveClient>,
    ) -> Self {
        Self {
            servers: servers.into_iter().map(|s| s.host_name.clone()).collect(),
            clients: clients.into_iter().map(|c| c.host.clone()).collect(),
        }
    }

    /// The backend keeps the two roles exclusive; should both appear,
    /// server wins.
    pub fn role_of(&self, host_name: &str) -> HostRole {
        if self.servers.contains(host_name) {
            HostRole::Server
        } else if self.clients.contains(host_name) {
            HostRole::Client
        } else {
            HostRole::Plain
        }
    }

    pub fn is_server(&self, host_name: &str) -> bool {
        self.servers.contains(host_name)
    }

    pub fn is_client(&self, host_name: &str) -> bool {
        self.clients.contains(host_name)
    }
}

/// How a host is drawn: selection state crossed with role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum DisplayedRole {
    UnselectedPlain,
    UnselectedServer,
    UnselectedClient,
    SelectedPlain,
    SelectedServer,
    SelectedClient,
}

impl DisplayedRole {
    pub fn new(selected: bool, role: HostRole) -> Self {
        match (selected, role) {
            (false, HostRole::Plain) => Self::UnselectedPlain,
            (false, HostRole::Server) => Self::UnselectedServer,
            (false, HostRole::Client) => Self::UnselectedClient,
            (true, HostRole::Plain) => Self::SelectedPlain,
            (true, HostRole::Server) => Self::SelectedServer,
            (true, HostRole::Client) => Self::SelectedClient,
        }
    }

    pub fn is_selected(self) -> bool {
        matches!(
            self,
            Self::SelectedPlain | Self::SelectedServer | Self::SelectedClient
        )
    }

    pub fn role(self) -> HostRole {
        match self {
            Self::UnselectedPlain | Self::SelectedPlain => HostRole::Plain,
            Self::UnselectedServer | Self::SelectedServer => HostRole::Server,
            Self::UnselectedClient | Self::SelectedClient => HostRole::Client,
        }
    }
}

// ── Controller ──────────────────────────────────────────────────────

/// Owns the selection. A full selection evicts its oldest entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    selected: Vec<MacAddress>,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle_host(&mut self, mac: &MacAddress) -> ToggleOutcome {
        if let Some(pos) = self.selected.iter().position(|m| m == mac) {
            self.selected.remove(pos);
            return ToggleOutcome::Deselected;
        }

        let outcome = if self.selected.len() >= MAX_SELECTION {
            ToggleOutcome::Replaced {
                evicted: self.selected.remove(0),
            }
        } else {
            ToggleOutcome::Selected
        };
        self.selected.push(mac.clone());
        outcome
    }

    /// Selected hosts, oldest first.
    pub fn selection(&self) -> &[MacAddress] {
        &self.selected
    }

    pub fn is_selected(&self, mac: &MacAddress) -> bool {
        self.selected.contains(mac)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Source and destination for a ping.
    pub fn require_pair(&self) -> Result<(MacAddress, MacAddress), SelectionError> {
        match self.selected.as_slice() {
            [a, b] => Ok((a.clone(), b.clone())),
            other => Err(SelectionError {
                action: "ping",
                required: 2,
                actual: other.len(),
            }),
        }
    }

    /// Target of a server or client action.
    pub fn require_single(&self, action: &'static str) -> Result<MacAddress, SelectionError> {
        match self.selected.as_slice() {
            [only] => Ok(only.clone()),
            other => Err(SelectionError {
                action,
                required: 1,
                actual: other.len(),
            }),
        }
    }

    pub fn displayed_role(&self, mac: &MacAddress, host_name: &str, roles: &RoleIndex) -> DisplayedRole {
        DisplayedRole::new(self.is_selected(mac), roles.role_of(host_name))
    }

    /// Drop selected hosts that are no longer in the topology. Returns
    /// what was removed.
    pub fn retain_known(&mut self, topology: &Topology) -> Vec<MacAddress> {
        let mut removed = Vec::new();
        self.selected.retain(|mac| {
            let known = topology.host(mac).is_some();
            if !known {
                removed.push(mac.clone());
            }
            known
        });
        removed
    }
}
