// ── Central reactive data store ──
//
// Holds the latest topology, its rendered scene, and the active server,
// client, and link views. Each view is replaced wholesale by its refresh
// and broadcast to subscribers through `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{ActiveClient, ActiveServer, Host, Link, MacAddress, Switch, Topology};
use crate::render::Scene;
use crate::selection::RoleIndex;
use crate::stream::EntityStream;

/// Central reactive store for the dashboard's cached views.
pub struct DataStore {
    pub(crate) switches: EntityCollection<Switch>,
    pub(crate) hosts: EntityCollection<Host>,
    pub(crate) links: EntityCollection<Link>,
    pub(crate) servers: EntityCollection<ActiveServer>,
    pub(crate) clients: EntityCollection<ActiveClient>,
    pub(crate) topology: watch::Sender<Arc<Topology>>,
    pub(crate) scene: watch::Sender<Arc<Scene>>,
    pub(crate) client_candidates: watch::Sender<Arc<Vec<String>>>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (topology, _) = watch::channel(Arc::new(Topology::default()));
        let (scene, _) = watch::channel(Arc::new(Scene::default()));
        let (client_candidates, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            switches: EntityCollection::new(),
            hosts: EntityCollection::new(),
            links: EntityCollection::new(),
            servers: EntityCollection::new(),
            clients: EntityCollection::new(),
            topology,
            scene,
            client_candidates,
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn switches_snapshot(&self) -> Arc<Vec<Arc<Switch>>> {
        self.switches.snapshot()
    }

    pub fn hosts_snapshot(&self) -> Arc<Vec<Arc<Host>>> {
        self.hosts.snapshot()
    }

    pub fn links_snapshot(&self) -> Arc<Vec<Arc<Link>>> {
        self.links.snapshot()
    }

    pub fn servers_snapshot(&self) -> Arc<Vec<Arc<ActiveServer>>> {
        self.servers.snapshot()
    }

    pub fn clients_snapshot(&self) -> Arc<Vec<Arc<ActiveClient>>> {
        self.clients.snapshot()
    }

    pub fn topology(&self) -> Arc<Topology> {
        self.topology.borrow().clone()
    }

    pub fn scene(&self) -> Arc<Scene> {
        self.scene.borrow().clone()
    }

    /// Host names that may start a client: every topology host that is not
    /// an active server, in natural order.
    pub fn client_candidates(&self) -> Arc<Vec<String>> {
        self.client_candidates.borrow().clone()
    }

    /// Server/client role lookup built from the current views.
    pub fn role_index(&self) -> RoleIndex {
        let servers = self.servers.snapshot();
        let clients = self.clients.snapshot();
        RoleIndex::new(
            servers.iter().map(AsRef::as_ref),
            clients.iter().map(AsRef::as_ref),
        )
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn host_by_mac(&self, mac: &MacAddress) -> Option<Arc<Host>> {
        self.hosts.get_by_key(mac.as_str())
    }

    pub fn host_by_name(&self, name: &str) -> Option<Arc<Host>> {
        self.hosts.snapshot().iter().find(|h| h.name == name).cloned()
    }

    pub fn switch_by_id(&self, id: i64) -> Option<Arc<Switch>> {
        self.switches.get_by_key(&id.to_string())
    }

    pub fn server_by_host(&self, host_name: &str) -> Option<Arc<ActiveServer>> {
        self.servers.get_by_key(host_name)
    }

    pub fn client_by_host(&self, host_name: &str) -> Option<Arc<ActiveClient>> {
        self.clients.get_by_key(host_name)
    }

    pub fn is_active_server(&self, host_name: &str) -> bool {
        self.servers.contains_key(host_name)
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn switch_count(&self) -> usize {
        self.switches.len()
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn server_count(&self) -> usize {
        self.servers.len()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Whether any switch in the last topology reports connected.
    pub fn controller_online(&self) -> bool {
        self.scene.borrow().controller_online
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_links(&self) -> EntityStream<Link> {
        EntityStream::new(self.links.subscribe())
    }

    pub fn subscribe_servers(&self) -> EntityStream<ActiveServer> {
        EntityStream::new(self.servers.subscribe())
    }

    pub fn subscribe_clients(&self) -> EntityStream<ActiveClient> {
        EntityStream::new(self.clients.subscribe())
    }

    pub fn subscribe_scene(&self) -> watch::Receiver<Arc<Scene>> {
        self.scene.subscribe()
    }

    pub fn subscribe_client_candidates(&self) -> watch::Receiver<Arc<Vec<String>>> {
        self.client_candidates.subscribe()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
