// ── Refresh generations ──
//
// Every fetch takes a ticket before it starts. A result is applied only if
// no later ticket for the same view has been applied already.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use strum::EnumCount;

use super::RefreshTarget;

struct Gate {
    issued: AtomicU64,
    applied: Mutex<u64>,
}

impl Gate {
    fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            applied: Mutex::new(0),
        }
    }
}

/// Per-view generation counters.
pub(crate) struct Generations {
    gates: [Gate; RefreshTarget::COUNT],
}

impl Generations {
    pub(crate) fn new() -> Self {
        Self {
            gates: std::array::from_fn(|_| Gate::new()),
        }
    }

    /// Take a ticket for a fetch that is about to start.
    pub(crate) fn issue(&self, target: RefreshTarget) -> u64 {
        self.gates[target.index()].issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Run `apply` if `generation` is newer than the last applied one.
    /// The check and the apply happen under one lock, so two results for
    /// the same view never interleave.
    pub(crate) fn apply_if_fresh(
        &self,
        target: RefreshTarget,
        generation: u64,
        apply: impl FnOnce(),
    ) -> bool {
        let mut applied = self.gates[target.index()]
            .applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if generation <= *applied {
            return false;
        }
        apply();
        *applied = generation;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_result_is_dropped() {
        let gens = Generations::new();
        let older = gens.issue(RefreshTarget::Servers);
        let newer = gens.issue(RefreshTarget::Servers);

        let mut applied = Vec::new();
        assert!(gens.apply_if_fresh(RefreshTarget::Servers, newer, || applied.push(newer)));
        assert!(!gens.apply_if_fresh(RefreshTarget::Servers, older, || applied.push(older)));
        assert_eq!(applied, vec![newer]);
    }

    #[test]
    fn targets_are_independent() {
        let gens = Generations::new();
        let topo = gens.issue(RefreshTarget::Topology);
        let _ = gens.issue(RefreshTarget::Links);
        let _ = gens.issue(RefreshTarget::Links);
        assert!(gens.apply_if_fresh(RefreshTarget::Topology, topo, || {}));
    }
}
