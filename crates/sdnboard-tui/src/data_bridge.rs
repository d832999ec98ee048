//! Data bridge: connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task. It subscribes to the store's views, the
//! reconcile outcomes, and the connection state, and forwards every change
//! as an [`Action`] through the TUI's action channel.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use sdnboard_core::{ConnectionState, Controller};

use crate::action::{Action, Notification};

/// Connect, push initial snapshots, then forward every change until
/// cancelled. Disconnects the controller on the way out.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::Connecting);

    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to connect to backend");
        let _ = action_tx.send(Action::Disconnected(e.to_string()));
        let _ = action_tx.send(Action::Notify(Notification::error(e.user_message())));
        return;
    }

    let _ = action_tx.send(Action::Connected);

    for warning in controller.take_warnings().await {
        let _ = action_tx.send(Action::Notify(Notification::warning(warning)));
    }

    let store = controller.store();
    let mut scene = store.subscribe_scene();
    let mut links = store.subscribe_links();
    let mut servers = store.subscribe_servers();
    let mut clients = store.subscribe_clients();
    let mut candidates = store.subscribe_client_candidates();
    let mut reconcile = controller.reconcile_events();
    let mut conn_state = controller.connection_state();

    // Initial snapshots so screens have data immediately
    let _ = action_tx.send(Action::SceneUpdated {
        scene: scene.borrow_and_update().clone(),
        topology: store.topology(),
    });
    let _ = action_tx.send(Action::LinksUpdated(links.current().clone()));
    let _ = action_tx.send(Action::ServersUpdated(servers.current().clone()));
    let _ = action_tx.send(Action::ClientsUpdated(clients.current().clone()));
    let _ = action_tx.send(Action::CandidatesUpdated(
        candidates.borrow_and_update().clone(),
    ));

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = scene.changed() => {
                debug!("dispatching SceneUpdated");
                let snapshot = scene.borrow_and_update().clone();
                let _ = action_tx.send(Action::SceneUpdated {
                    scene: snapshot,
                    topology: store.topology(),
                });
            }
            Some(l) = links.changed() => {
                let _ = action_tx.send(Action::LinksUpdated(l));
            }
            Some(s) = servers.changed() => {
                let _ = action_tx.send(Action::ServersUpdated(s));
            }
            Some(c) = clients.changed() => {
                let _ = action_tx.send(Action::ClientsUpdated(c));
            }
            Ok(()) = candidates.changed() => {
                let names = candidates.borrow_and_update().clone();
                let _ = action_tx.send(Action::CandidatesUpdated(names));
            }
            event = reconcile.recv() => match event {
                Ok(event) => {
                    let _ = action_tx.send(Action::Reconciled(event));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "reconcile events lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                let action = match state {
                    ConnectionState::Connected => Action::Connected,
                    ConnectionState::Connecting => Action::Connecting,
                    ConnectionState::Disconnected => Action::Disconnected("disconnected".into()),
                    ConnectionState::Failed => Action::Disconnected("connection failed".into()),
                };
                let _ = action_tx.send(action);
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}
