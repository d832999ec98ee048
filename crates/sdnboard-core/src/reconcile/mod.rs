// ── Reconciliation ──
//
// One scheduler owns every refresh of the cached views. Timers and
// post-mutation triggers both enqueue a `RefreshSet`; the scheduler runs
// at most one fetch per target at a time and folds overlapping requests
// into a single follow-up run. Generation tokens discard results that
// arrive after a fresher refresh of the same view was applied.

mod generation;
mod scheduler;

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

pub(crate) use generation::Generations;
pub(crate) use scheduler::reconcile_task;

/// A cached view the scheduler can refresh.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
    EnumCount,
)]
#[strum(serialize_all = "lowercase")]
pub enum RefreshTarget {
    Topology,
    Servers,
    Clients,
    Links,
}

impl RefreshTarget {
    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Small set of refresh targets.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RefreshSet(u8);

impl RefreshSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        RefreshTarget::iter().collect()
    }

    /// The views on the dashboard timer: topology, servers, clients.
    pub fn dashboard() -> Self {
        [
            RefreshTarget::Topology,
            RefreshTarget::Servers,
            RefreshTarget::Clients,
        ]
        .into_iter()
        .collect()
    }

    pub fn only(target: RefreshTarget) -> Self {
        Self(target.bit())
    }

    pub fn insert(&mut self, target: RefreshTarget) {
        self.0 |= target.bit();
    }

    pub fn remove(&mut self, target: RefreshTarget) {
        self.0 &= !target.bit();
    }

    pub fn contains(self, target: RefreshTarget) -> bool {
        self.0 & target.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub fn difference(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    pub fn iter(self) -> impl Iterator<Item = RefreshTarget> {
        RefreshTarget::iter().filter(move |t| self.contains(*t))
    }
}

impl FromIterator<RefreshTarget> for RefreshSet {
    fn from_iter<I: IntoIterator<Item = RefreshTarget>>(iter: I) -> Self {
        let mut set = Self::empty();
        for target in iter {
            set.insert(target);
        }
        set
    }
}

impl fmt::Debug for RefreshSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Outcome of one scheduled refresh, broadcast to frontends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileEvent {
    Refreshed { target: RefreshTarget },
    /// A newer refresh of the same view landed first; this result was
    /// dropped.
    Superseded { target: RefreshTarget },
    Failed {
        target: RefreshTarget,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        let mut set = RefreshSet::empty();
        assert!(set.is_empty());
        set.insert(RefreshTarget::Links);
        set.insert(RefreshTarget::Topology);
        assert!(set.contains(RefreshTarget::Links));
        assert!(!set.contains(RefreshTarget::Servers));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            [RefreshTarget::Topology, RefreshTarget::Links]
        );
        set.remove(RefreshTarget::Links);
        assert_eq!(set, RefreshSet::only(RefreshTarget::Topology));
    }

    #[test]
    fn dashboard_excludes_links() {
        let dash = RefreshSet::dashboard();
        assert!(!dash.contains(RefreshTarget::Links));
        assert_eq!(dash.union(RefreshSet::only(RefreshTarget::Links)), RefreshSet::all());
        assert_eq!(RefreshSet::all().difference(dash), RefreshSet::only(RefreshTarget::Links));
    }
}
