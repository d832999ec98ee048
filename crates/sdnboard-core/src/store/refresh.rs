// ── Refresh application logic ──
//
// Each `apply_*` replaces one view wholesale inside a single synchronous
// block. Nothing here awaits, so a view is never observed half-updated.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use super::DataStore;
use super::collection::natural_cmp;
use crate::model::{ActiveClient, ActiveServer, Link, Topology};
use crate::render::Scene;

impl DataStore {
    /// Install a fresh topology and the scene rendered from it.
    pub(crate) fn apply_topology(&self, topology: Topology, scene: Scene) {
        self.switches.replace_all(
            topology
                .switches
                .iter()
                .map(|s| (s.id.to_string(), s.clone())),
        );
        self.hosts.replace_all(
            topology
                .hosts
                .iter()
                .map(|h| (h.mac.as_str().to_owned(), h.clone())),
        );
        self.topology.send_modify(|t| *t = Arc::new(topology));
        self.scene.send_modify(|s| *s = Arc::new(scene));
        self.recompute_client_candidates();
        self.touch();
    }

    pub(crate) fn apply_servers(&self, servers: Vec<ActiveServer>) {
        self.servers
            .replace_all(servers.into_iter().map(|s| (s.host_name.clone(), s)));
        self.recompute_client_candidates();
        self.touch();
    }

    pub(crate) fn apply_clients(&self, clients: Vec<ActiveClient>) {
        self.clients
            .replace_all(clients.into_iter().map(|c| (c.host.clone(), c)));
        self.touch();
    }

    pub(crate) fn apply_links(&self, links: Vec<Link>) {
        self.links.replace_all(links.into_iter().map(|l| (l.key(), l)));
        self.touch();
    }

    /// Topology host names minus active server names.
    ///
    /// Reads and publishes under the candidates channel's write lock, so
    /// concurrent topology and servers refreshes cannot publish a list
    /// computed from an older server set after a newer one.
    fn recompute_client_candidates(&self) {
        self.client_candidates.send_modify(|current| {
            let servers: HashSet<String> = self.servers.keys().into_iter().collect();
            let mut candidates: Vec<String> = self
                .topology
                .borrow()
                .host_names()
                .filter(|name| !servers.contains(*name))
                .map(str::to_owned)
                .collect();
            candidates.sort_by(|a, b| natural_cmp(a, b));
            candidates.dedup();
            *current = Arc::new(candidates);
        });
    }

    fn touch(&self) {
        self.last_refresh.send_modify(|t| *t = Some(Utc::now()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{Host, MacAddress};
    use crate::render::TopologyRenderer;

    fn topology(names: &[&str]) -> Topology {
        Topology {
            hosts: names
                .iter()
                .enumerate()
                .map(|(i, name)| Host {
                    mac: MacAddress::new(format!("00:00:00:00:00:{:02x}", i + 1)),
                    name: (*name).to_owned(),
                    ip: None,
                    switch_id: None,
                })
                .collect(),
            ..Topology::default()
        }
    }

    fn server(name: &str) -> ActiveServer {
        ActiveServer {
            host_name: name.to_owned(),
            video_path: Some("v.mp4".into()),
            multicast_ip: Some("239.0.0.1".into()),
            multicast_port: Some(5004),
            weight: Some(1),
            status: Some("activo".into()),
            last_updated: None,
        }
    }

    fn apply_topo(store: &DataStore, topo: Topology) {
        let scene = TopologyRenderer::default().render(&topo);
        store.apply_topology(topo, scene);
    }

    #[test]
    fn candidates_exclude_active_servers() {
        let store = DataStore::new();
        apply_topo(&store, topology(&["h1", "h2", "h10", "h3"]));
        store.apply_servers(vec![server("h1"), server("h3")]);

        let candidates = store.client_candidates();
        assert_eq!(*candidates, vec!["h2".to_owned(), "h10".to_owned()]);
        for s in store.servers_snapshot().iter() {
            assert!(!candidates.contains(&s.host_name));
        }
    }

    #[test]
    fn candidates_recomputed_when_servers_stop() {
        let store = DataStore::new();
        apply_topo(&store, topology(&["h1", "h2"]));
        store.apply_servers(vec![server("h1")]);
        assert_eq!(*store.client_candidates(), vec!["h2".to_owned()]);
        store.apply_servers(Vec::new());
        assert_eq!(*store.client_candidates(), vec!["h1".to_owned(), "h2".to_owned()]);
    }

    #[test]
    fn candidates_recomputed_after_topology_reload() {
        let store = DataStore::new();
        store.apply_servers(vec![server("h1")]);
        apply_topo(&store, topology(&["h1", "h4"]));
        assert_eq!(*store.client_candidates(), vec!["h4".to_owned()]);
    }

    #[test]
    fn concurrent_topology_and_servers_refreshes_keep_candidates_consistent() {
        use std::sync::Barrier;
        use std::thread;

        for _ in 0..200 {
            let store = Arc::new(DataStore::new());
            apply_topo(&store, topology(&["h1", "h2", "h3"]));
            let barrier = Arc::new(Barrier::new(2));

            let topo_side = {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    apply_topo(&store, topology(&["h1", "h2", "h3"]));
                })
            };
            let servers_side = {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.apply_servers(vec![server("h2")]);
                })
            };
            topo_side.join().unwrap();
            servers_side.join().unwrap();

            assert_eq!(*store.client_candidates(), vec!["h1".to_owned(), "h3".to_owned()]);
        }
    }

    #[test]
    fn repeated_topology_apply_does_not_accumulate() {
        let store = DataStore::new();
        apply_topo(&store, topology(&["h1", "h2"]));
        apply_topo(&store, topology(&["h1", "h2"]));
        assert_eq!(store.host_count(), 2);
        assert!(store.last_refresh().is_some());
    }

    #[test]
    fn role_index_reflects_views() {
        let store = DataStore::new();
        store.apply_servers(vec![server("h1")]);
        store.apply_clients(vec![ActiveClient {
            host: "h2".into(),
            server: Some("h1".into()),
            destination_ip: None,
            port: None,
            video: None,
            started_at: None,
        }]);
        let roles = store.role_index();
        assert!(roles.is_server("h1"));
        assert!(roles.is_client("h2"));
        assert!(!roles.is_client("h1"));
    }
}
