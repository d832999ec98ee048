// ── Reconcile scheduler task ──

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{ReconcileEvent, RefreshSet, RefreshTarget};
use crate::controller::Controller;
use crate::error::CoreError;

/// Single-flight bookkeeping: which targets are fetching and which have a
/// follow-up queued behind the current fetch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct InFlight {
    running: RefreshSet,
    pending: RefreshSet,
}

impl InFlight {
    /// Register a request. Returns the targets to start now; busy targets
    /// are folded into one queued follow-up each.
    pub(crate) fn request(&mut self, set: RefreshSet) -> RefreshSet {
        let start = set.difference(self.running);
        self.pending = self.pending.union(set.difference(start));
        self.running = self.running.union(start);
        start
    }

    /// Mark `target` finished. Returns `true` if a follow-up was queued,
    /// in which case the target stays marked running.
    pub(crate) fn finish(&mut self, target: RefreshTarget) -> bool {
        if self.pending.contains(target) {
            self.pending.remove(target);
            true
        } else {
            self.running.remove(target);
            false
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        self.running.is_empty() && self.pending.is_empty()
    }
}

/// Spawned refreshes, keyed by task id so a task that panics or is
/// aborted still reports which target it held.
struct RefreshTasks<T> {
    set: JoinSet<T>,
    targets: HashMap<task::Id, RefreshTarget>,
}

impl<T: Send + 'static> RefreshTasks<T> {
    fn new() -> Self {
        Self {
            set: JoinSet::new(),
            targets: HashMap::new(),
        }
    }

    fn spawn(&mut self, target: RefreshTarget, fut: impl Future<Output = T> + Send + 'static) {
        let handle = self.set.spawn(fut);
        self.targets.insert(handle.id(), target);
    }

    async fn join_next(&mut self) -> Option<(RefreshTarget, Result<T, JoinError>)> {
        let (id, result) = match self.set.join_next_with_id().await? {
            Ok((id, value)) => (id, Ok(value)),
            Err(e) => (e.id(), Err(e)),
        };
        let target = self.targets.remove(&id)?;
        Some((target, result))
    }

    fn abort_all(&mut self) {
        self.set.abort_all();
        self.targets.clear();
    }
}

/// Long-running scheduler. Owns every refresh of the cached views until
/// `cancel` fires or the request channel closes.
pub(crate) async fn reconcile_task(
    controller: Controller,
    mut requests: mpsc::UnboundedReceiver<RefreshSet>,
    dashboard_every: Duration,
    links_every: Duration,
    cancel: CancellationToken,
) {
    let mut dashboard_timer = timer(dashboard_every);
    let mut links_timer = timer(links_every);
    let mut running: RefreshTasks<Result<bool, CoreError>> = RefreshTasks::new();
    let mut state = InFlight::default();

    let spawn = |running: &mut RefreshTasks<_>, target: RefreshTarget| {
        let ctrl = controller.clone();
        running.spawn(target, async move { ctrl.refresh_target(target).await });
    };

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            Some((target, joined)) = running.join_next() => {
                let event = match joined {
                    Ok(Ok(true)) => ReconcileEvent::Refreshed { target },
                    Ok(Ok(false)) => ReconcileEvent::Superseded { target },
                    Ok(Err(e)) => {
                        warn!(%target, error = %e, "refresh failed");
                        ReconcileEvent::Failed { target, message: e.user_message() }
                    }
                    Err(e) => {
                        warn!(%target, error = %e, "refresh task aborted");
                        ReconcileEvent::Failed {
                            target,
                            message: "refresh task aborted".into(),
                        }
                    }
                };
                controller.emit_reconcile(event);
                if state.finish(target) {
                    debug!(%target, "running queued follow-up refresh");
                    spawn(&mut running, target);
                }
            }
            request = requests.recv() => {
                let Some(set) = request else { break };
                for target in state.request(set).iter() {
                    spawn(&mut running, target);
                }
            }
            () = tick(&mut dashboard_timer) => {
                for target in state.request(RefreshSet::dashboard()).iter() {
                    spawn(&mut running, target);
                }
            }
            () = tick(&mut links_timer) => {
                for target in state.request(RefreshSet::only(RefreshTarget::Links)).iter() {
                    spawn(&mut running, target);
                }
            }
        }
    }

    running.abort_all();
}

/// A zero period disables the timer. The first tick fires one period
/// after start; the initial load happens in `connect()`.
fn timer(period: Duration) -> Option<Interval> {
    if period.is_zero() {
        return None;
    }
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    Some(interval)
}

async fn tick(timer: &mut Option<Interval>) {
    match timer {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn panicked_refresh_releases_its_target() {
        let mut state = InFlight::default();
        let mut tasks: RefreshTasks<Result<bool, CoreError>> = RefreshTasks::new();

        for target in state.request(RefreshSet::only(RefreshTarget::Servers)).iter() {
            tasks.spawn(target, async {
                if RefreshSet::all().contains(RefreshTarget::Servers) {
                    panic!("refresh blew up");
                }
                Ok(true)
            });
        }

        let (target, joined) = tasks.join_next().await.unwrap();
        assert_eq!(target, RefreshTarget::Servers);
        assert!(joined.unwrap_err().is_panic());
        assert!(!state.finish(target));
        assert!(state.is_idle());
        assert_eq!(state.request(RefreshSet::only(RefreshTarget::Servers)), RefreshSet::only(RefreshTarget::Servers));
        assert!(tasks.join_next().await.is_none());
    }

    #[test]
    fn busy_targets_coalesce_into_one_follow_up() {
        let mut state = InFlight::default();

        let started = state.request(RefreshSet::all());
        assert_eq!(started, RefreshSet::all());

        // Three overlapping triggers for servers while it is in flight.
        for _ in 0..3 {
            assert!(state.request(RefreshSet::only(RefreshTarget::Servers)).is_empty());
        }

        assert!(state.finish(RefreshTarget::Servers));
        assert!(!state.finish(RefreshTarget::Servers));
        assert!(!state.finish(RefreshTarget::Topology));
        assert!(!state.finish(RefreshTarget::Clients));
        assert!(!state.finish(RefreshTarget::Links));
        assert!(state.is_idle());
    }

    #[test]
    fn idle_targets_start_immediately() {
        let mut state = InFlight::default();
        state.request(RefreshSet::only(RefreshTarget::Links));
        let started = state.request(RefreshSet::dashboard().union(RefreshSet::only(RefreshTarget::Links)));
        assert_eq!(started, RefreshSet::dashboard());
    }
}
