// ── Controller abstraction ──
//
// Lifecycle management for one testbed: initial load, the reconcile
// scheduler, command routing, ping sessions, and on-demand reads.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sdnboard_api::{AgentClient, BackendClient, RyuClient, TransportConfig};

use crate::command::{BatchReport, Command, CommandEnvelope, CommandResult, HostOutcome};
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::model::{
    ActiveClient, ActiveServer, AlgorithmComparison, AlgorithmConfig, ClientStarted,
    EventLogEntry, FlowRule, FlowRuleLog, Host, Link, MacAddress, ServerStarted,
    StatsSummaryRow, StreamAssignment, Topology,
};
use crate::ping::{PingJob, PingSentinels, PingSession, spawn_ping};
use crate::reconcile::{Generations, ReconcileEvent, RefreshSet, RefreshTarget, reconcile_task};
use crate::render::TopologyRenderer;
use crate::store::DataStore;

const COMMAND_CHANNEL_SIZE: usize = 64;
const RECONCILE_EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// HTTP clients for the three services, built on connect.
#[derive(Clone)]
struct Services {
    backend: BackendClient,
    agent: AgentClient,
    ryu: Option<RyuClient>,
}

impl Services {
    fn build(config: &DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::with_timeout(config.timeout);
        let ryu = match &config.ryu_url {
            Some(url) => Some(RyuClient::new(url.clone(), &transport)?),
            None => None,
        };
        Ok(Self {
            backend: BackendClient::new(config.backend_url.clone(), &transport)?,
            agent: AgentClient::new(config.agent_url.clone(), &transport)?,
            ryu,
        })
    }
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the data store, the
/// reconcile scheduler, and the command processor.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DashboardConfig,
    store: Arc<DataStore>,
    renderer: TopologyRenderer,
    generations: Generations,
    connection_state: watch::Sender<ConnectionState>,
    reconcile_tx: broadcast::Sender<ReconcileEvent>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    refresh_tx: Mutex<mpsc::UnboundedSender<RefreshSet>>,
    refresh_rx: Mutex<Option<mpsc::UnboundedReceiver<RefreshSet>>>,
    cancel: CancellationToken,
    /// Child token for the current connection; cancelled on disconnect,
    /// replaced on connect.
    cancel_child: Mutex<CancellationToken>,
    services: Mutex<Option<Services>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Views that failed during the initial load.
    warnings: Mutex<Vec<String>>,
}

impl Controller {
    /// Create a controller. Does NOT connect; call
    /// [`connect()`](Self::connect) to load data and start background tasks.
    pub fn new(config: DashboardConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (reconcile_tx, _) = broadcast::channel(RECONCILE_EVENT_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                renderer: TopologyRenderer::new(config.host_layout),
                config,
                store,
                generations: Generations::new(),
                connection_state,
                reconcile_tx,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                refresh_tx: Mutex::new(refresh_tx),
                refresh_rx: Mutex::new(Some(refresh_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                services: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
                warnings: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Build the HTTP clients, load every view once, and start the
    /// command processor and reconcile scheduler.
    ///
    /// Fails only when every view failed to load; partial failures are
    /// kept as warnings (see [`take_warnings`](Self::take_warnings)).
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let services = match Services::build(&self.inner.config) {
            Ok(services) => services,
            Err(e) => {
                self.inner.connection_state.send_replace(ConnectionState::Failed);
                return Err(e);
            }
        };
        *self.inner.services.lock().await = Some(services);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let failures = self.refresh_all().await;
        let failed = failures
            .iter()
            .fold(RefreshSet::empty(), |acc, (targets, _)| acc.union(*targets));
        if failed == RefreshSet::all() {
            *self.inner.services.lock().await = None;
            self.inner.connection_state.send_replace(ConnectionState::Failed);
            return Err(failures
                .into_iter()
                .map(|(_, e)| e)
                .next()
                .unwrap_or(CoreError::ControllerDisconnected));
        }
        {
            let mut warnings = self.inner.warnings.lock().await;
            for (targets, err) in &failures {
                let names: Vec<String> = targets.iter().map(|t| t.to_string()).collect();
                let names = names.join(", ");
                warn!(targets = %names, error = %err, "initial load failed");
                warnings.push(format!("{names}: {err}"));
            }
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        if let Some(rx) = self.inner.refresh_rx.lock().await.take() {
            let ctrl = self.clone();
            let config = &self.inner.config;
            handles.push(tokio::spawn(reconcile_task(
                ctrl,
                rx,
                config.dashboard_poll_interval,
                config.links_poll_interval,
                child.clone(),
            )));
        }

        self.inner.connection_state.send_replace(ConnectionState::Connected);
        info!(backend = %self.inner.config.backend_url, "connected to testbed");
        Ok(())
    }

    /// Stop background tasks and drop the HTTP clients. The controller can
    /// be connected again afterwards.
    pub async fn disconnect(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.services.lock().await = None;

        // Fresh channels so a reconnect can spawn new receivers.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }
        {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.inner.refresh_tx.lock().await = tx;
            *self.inner.refresh_rx.lock().await = Some(rx);
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Command execution ────────────────────────────────────────

    /// Validate and run a command. On success the views it affects are
    /// queued for refresh; on failure nothing is refreshed and the error
    /// carries the remote message verbatim.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }
        cmd.validate()?;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        rx.await.map_err(|_| CoreError::ControllerDisconnected)?
    }

    /// Start the same video on several hosts. Each host is reported on its
    /// own; one failure does not stop the rest.
    pub async fn start_servers(
        &self,
        hosts: Vec<String>,
        video_path: impl Into<String>,
        weight: u32,
    ) -> Result<BatchReport, CoreError> {
        let cmd = Command::StartServers(crate::command::StartServersRequest {
            hosts,
            video_path: video_path.into(),
            weight,
        });
        match self.execute(cmd).await? {
            CommandResult::Batch(report) => Ok(report),
            other => Err(CoreError::Internal(format!(
                "unexpected batch result: {other:?}"
            ))),
        }
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// Connect, run `f`, disconnect. Polling timers are disabled since a
    /// CLI invocation only needs one request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: DashboardConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config.without_polling());
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── Reconciliation ───────────────────────────────────────────

    /// Queue views for refresh by the scheduler. Views already being
    /// fetched get one follow-up run.
    pub async fn request_refresh(&self, set: RefreshSet) {
        if set.is_empty() {
            return;
        }
        let tx = self.inner.refresh_tx.lock().await.clone();
        if tx.send(set).is_err() {
            debug!(?set, "refresh requested while scheduler is stopped");
        }
    }

    /// Fetch the topology and rebuild the scene.
    pub async fn load_topology(&self) -> Result<(), CoreError> {
        self.refresh_target(RefreshTarget::Topology).await.map(drop)
    }

    pub async fn refresh_active_servers(&self) -> Result<(), CoreError> {
        self.refresh_target(RefreshTarget::Servers).await.map(drop)
    }

    pub async fn refresh_active_clients(&self) -> Result<(), CoreError> {
        self.refresh_target(RefreshTarget::Clients).await.map(drop)
    }

    pub async fn refresh_active_links(&self) -> Result<(), CoreError> {
        self.refresh_target(RefreshTarget::Links).await.map(drop)
    }

    /// Fetch one view and apply it unless a newer result already landed.
    /// Returns whether the result was applied.
    pub(crate) async fn refresh_target(&self, target: RefreshTarget) -> Result<bool, CoreError> {
        let services = self.services().await?;
        let generations = &self.inner.generations;
        let store = &self.inner.store;
        let generation = generations.issue(target);

        let applied = match target {
            RefreshTarget::Topology => {
                let topology = Topology::from(services.backend.get_topology().await?);
                let scene = self.inner.renderer.render(&topology);
                generations.apply_if_fresh(target, generation, || {
                    store.apply_topology(topology, scene);
                })
            }
            RefreshTarget::Servers => {
                let servers: Vec<ActiveServer> = services
                    .backend
                    .list_active_servers()
                    .await?
                    .into_iter()
                    .map(ActiveServer::from)
                    .collect();
                generations.apply_if_fresh(target, generation, || store.apply_servers(servers))
            }
            RefreshTarget::Clients => {
                let clients: Vec<ActiveClient> = services
                    .backend
                    .list_active_clients()
                    .await?
                    .into_iter()
                    .map(ActiveClient::from)
                    .collect();
                generations.apply_if_fresh(target, generation, || store.apply_clients(clients))
            }
            RefreshTarget::Links => {
                let links: Vec<Link> = services
                    .backend
                    .get_topology()
                    .await?
                    .links
                    .into_iter()
                    .map(Link::from)
                    .collect();
                generations.apply_if_fresh(target, generation, || store.apply_links(links))
            }
        };

        if !applied {
            debug!(%target, generation, "dropping superseded refresh");
        }
        Ok(applied)
    }

    /// Initial load. Topology and links share one fetch; the three
    /// requests run concurrently and fail independently.
    async fn refresh_all(&self) -> Vec<(RefreshSet, CoreError)> {
        let (topology, servers, clients) = tokio::join!(
            self.refresh_topology_and_links(),
            self.refresh_target(RefreshTarget::Servers),
            self.refresh_target(RefreshTarget::Clients),
        );

        let mut failures = Vec::new();
        if let Err(e) = topology {
            let targets: RefreshSet = [RefreshTarget::Topology, RefreshTarget::Links]
                .into_iter()
                .collect();
            failures.push((targets, e));
        }
        if let Err(e) = servers {
            failures.push((RefreshSet::only(RefreshTarget::Servers), e));
        }
        if let Err(e) = clients {
            failures.push((RefreshSet::only(RefreshTarget::Clients), e));
        }
        failures
    }

    async fn refresh_topology_and_links(&self) -> Result<(), CoreError> {
        let services = self.services().await?;
        let generations = &self.inner.generations;
        let store = &self.inner.store;
        let topo_gen = generations.issue(RefreshTarget::Topology);
        let links_gen = generations.issue(RefreshTarget::Links);

        let topology = Topology::from(services.backend.get_topology().await?);
        let links = topology.links.clone();
        let scene = self.inner.renderer.render(&topology);
        generations.apply_if_fresh(RefreshTarget::Topology, topo_gen, || {
            store.apply_topology(topology, scene);
        });
        generations.apply_if_fresh(RefreshTarget::Links, links_gen, || store.apply_links(links));
        Ok(())
    }

    /// Subscribe to refresh outcomes from the scheduler.
    pub fn reconcile_events(&self) -> broadcast::Receiver<ReconcileEvent> {
        self.inner.reconcile_tx.subscribe()
    }

    pub(crate) fn emit_reconcile(&self, event: ReconcileEvent) {
        let _ = self.inner.reconcile_tx.send(event);
    }

    // ── Ping ─────────────────────────────────────────────────────

    /// Start a ping between two hosts, each given by MAC or name.
    pub async fn ping(&self, source: &str, destination: &str) -> Result<PingSession, CoreError> {
        self.ensure_connected()?;
        let source = self.resolve_host(source)?;
        let destination = self.resolve_host(destination)?;
        if source.mac == destination.mac {
            return Err(CoreError::ValidationFailed {
                message: "ping needs two different hosts".into(),
            });
        }

        let services = self.services().await?;
        let parent = self.inner.cancel_child.lock().await.clone();
        let config = &self.inner.config;
        Ok(spawn_ping(
            PingJob {
                backend: services.backend,
                agent: services.agent,
                ryu: services.ryu,
                store: Arc::clone(&self.inner.store),
                source,
                destination,
                sentinels: PingSentinels::new(&config.ping_sentinels),
                install_routes: config.install_routes,
            },
            &parent,
        ))
    }

    /// Look a host up by MAC first, then by name.
    pub fn resolve_host(&self, key: &str) -> Result<Arc<Host>, CoreError> {
        let store = &self.inner.store;
        store
            .host_by_mac(&MacAddress::new(key))
            .or_else(|| store.host_by_name(key))
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "Host".into(),
                identifier: key.to_owned(),
            })
    }

    // ── Ad-hoc reads ─────────────────────────────────────────────
    //
    // Display-only data that is not cached in the store.

    pub async fn algorithm_config(&self) -> Result<AlgorithmConfig, CoreError> {
        let services = self.services().await?;
        Ok(services.backend.get_algorithm_config().await?.into())
    }

    pub async fn algorithm_history(&self) -> Result<Vec<AlgorithmConfig>, CoreError> {
        let services = self.services().await?;
        let rows = services.backend.get_algorithm_history().await?;
        Ok(rows.into_iter().map(AlgorithmConfig::from).collect())
    }

    pub async fn stats_summary(&self) -> Result<Vec<StatsSummaryRow>, CoreError> {
        let services = self.services().await?;
        let rows = services.backend.get_stats_summary().await?;
        Ok(rows.into_iter().map(StatsSummaryRow::from).collect())
    }

    pub async fn event_logs(&self) -> Result<Vec<EventLogEntry>, CoreError> {
        let services = self.services().await?;
        let rows = services.backend.get_event_logs().await?;
        Ok(rows.into_iter().map(EventLogEntry::from).collect())
    }

    pub async fn compare_algorithms(&self) -> Result<AlgorithmComparison, CoreError> {
        let services = self.services().await?;
        Ok(services.backend.compare_algorithms().await?.into())
    }

    pub async fn flow_rules(&self) -> Result<Vec<FlowRule>, CoreError> {
        let services = self.services().await?;
        let rules = services.backend.list_flow_rules().await?;
        Ok(rules.into_iter().map(FlowRule::from).collect())
    }

    pub async fn flow_rule(&self, rule_id: i64) -> Result<FlowRule, CoreError> {
        let services = self.services().await?;
        Ok(services.backend.get_flow_rule(rule_id).await?.into())
    }

    pub async fn flow_rule_logs(&self) -> Result<Vec<FlowRuleLog>, CoreError> {
        let services = self.services().await?;
        let logs = services.backend.list_flow_rule_logs().await?;
        Ok(logs.into_iter().map(FlowRuleLog::from).collect())
    }

    pub async fn next_flow_rule_id(&self) -> Result<i64, CoreError> {
        let services = self.services().await?;
        Ok(services.backend.next_flow_rule_id().await?)
    }

    /// Host names known to the backend, independent of the topology view.
    pub async fn host_catalog(&self) -> Result<Vec<String>, CoreError> {
        let services = self.services().await?;
        Ok(services.backend.list_host_names().await?)
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Drain warnings accumulated during connect.
    pub async fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut *self.inner.warnings.lock().await)
    }

    // ── Internal helpers ─────────────────────────────────────────

    fn ensure_connected(&self) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() == ConnectionState::Connected {
            Ok(())
        } else {
            Err(CoreError::ControllerDisconnected)
        }
    }

    async fn services(&self) -> Result<Services, CoreError> {
        self.inner
            .services
            .lock()
            .await
            .clone()
            .ok_or(CoreError::ControllerDisconnected)
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Process commands from the mpsc channel one at a time.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel_child.lock().await.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let services = controller.services().await?;
    let backend = &services.backend;
    let agent = &services.agent;
    let mut refresh = cmd.refresh_targets();

    let result = match cmd {
        // ── Links ──
        Command::CreateLink(req) => backend
            .create_link(req.source, req.dest, req.bandwidth_mbps)
            .await
            .map(CommandResult::Message),
        Command::UpdateLink(req) => backend
            .update_link(req.source, req.dest, req.bandwidth_mbps)
            .await
            .map(CommandResult::Message),
        Command::DeleteLink { source, dest } => backend
            .delete_link(source, dest)
            .await
            .map(CommandResult::Message),

        // ── Servers ──
        Command::StartServer(req) => start_server(backend, &req.host_name, &req.video_path, req.weight)
            .await
            .map(CommandResult::ServerStarted),
        Command::StartServers(batch) => {
            let mut report = BatchReport::default();
            for host in &batch.hosts {
                let req = batch.for_host(host);
                let outcome = start_server(backend, &req.host_name, &req.video_path, req.weight)
                    .await
                    .map_err(|e| CoreError::from(e).user_message());
                if let Err(message) = &outcome {
                    warn!(host = %host, %message, "server start failed");
                }
                report.outcomes.push(HostOutcome {
                    host: host.clone(),
                    outcome,
                });
            }
            if report.all_failed() {
                refresh = RefreshSet::empty();
            }
            Ok(CommandResult::Batch(report))
        }
        Command::StopServer { host_name } => backend
            .stop_server(&host_name)
            .await
            .map(CommandResult::Message),

        // ── Clients ──
        Command::StartClient { host } => {
            let assignment = StreamAssignment::from(backend.get_stream_assignment().await?);
            debug!(%host, server = %assignment.server_host, "stream assigned");
            agent
                .start_player(&host, &assignment.multicast_ip, assignment.multicast_port)
                .await
                .map(|started| {
                    CommandResult::ClientStarted(ClientStarted {
                        host,
                        assignment,
                        message: started.message,
                        player_pid: started.pid,
                    })
                })
        }
        Command::StopClient { host, pid } => agent
            .stop_player(&host, pid)
            .await
            .map(CommandResult::Message),

        // ── Algorithms ──
        Command::SetBalancing(algorithm) => backend
            .set_balancing_algorithm(algorithm.wire_name())
            .await
            .map(CommandResult::Message),
        Command::SetRouting(algorithm) => backend
            .set_routing_algorithm(algorithm.wire_name())
            .await
            .map(CommandResult::Message),
        Command::SetServerWeights(weights) => backend
            .set_server_weights(&weights)
            .await
            .map(CommandResult::Message),

        // ── Flow rules ──
        Command::CreateFlowRule { dpid, rule } => {
            let rule_id = match rule.rule_id {
                Some(id) => id,
                None => backend.next_flow_rule_id().await?,
            };
            backend
                .create_flow_rule(dpid, &rule.to_body(rule_id))
                .await
                .map(CommandResult::Message)
        }
        Command::UpdateFlowRule { rule_id, rule } => backend
            .update_flow_rule(rule_id, &rule.to_body(rule_id))
            .await
            .map(CommandResult::Message),
        Command::DeleteFlowRule { rule_id } => backend
            .delete_flow_rule(rule_id)
            .await
            .map(CommandResult::Message),
    };

    match result {
        Ok(ok) => {
            controller.request_refresh(refresh).await;
            Ok(ok)
        }
        Err(e) => {
            let err = CoreError::from(e);
            warn!(error = %err, "command failed");
            Err(err)
        }
    }
}

async fn start_server(
    backend: &BackendClient,
    host_name: &str,
    video_path: &str,
    weight: u32,
) -> Result<ServerStarted, sdnboard_api::Error> {
    let started = backend.start_server(host_name, video_path, weight).await?;
    Ok(ServerStarted {
        host_name: host_name.to_owned(),
        message: started
            .message
            .unwrap_or_else(|| format!("server started on {host_name}")),
        multicast_ip: started.multicast_ip,
        multicast_port: started.multicast_port,
    })
}
