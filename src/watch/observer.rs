//! Rescan coordination state machine.
//!
//! A mutation arriving while a scan runs must not re-enter the scan; it
//! parks in `PendingRescan` and is honored when the pass finishes. Batches
//! produced entirely by the masking engine's own rewrites are ignored, which
//! is what keeps masking from feeding itself.

use crate::dom::{DomMutation, MutationOrigin};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchState {
    #[default]
    Idle,
    Scanning,
    PendingRescan,
}

#[derive(Debug, Default)]
pub struct RescanCoordinator {
    state: WatchState,
}

impl RescanCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    /// Feed an observed mutation batch. Returns true when the caller should
    /// (re)arm the debounced rescan.
    pub fn on_mutations(&mut self, batch: &[DomMutation]) -> bool {
        if batch.is_empty() {
            return false;
        }
        if batch.iter().all(|m| m.origin == MutationOrigin::Masking) {
            return false;
        }
        match self.state {
            WatchState::Idle => true,
            WatchState::Scanning => {
                self.state = WatchState::PendingRescan;
                false
            }
            WatchState::PendingRescan => false,
        }
    }

    pub fn begin_scan(&mut self) {
        self.state = WatchState::Scanning;
    }

    /// Close out a scan pass. Returns true when mutations arrived mid-scan
    /// and another pass is owed.
    pub fn finish_scan(&mut self) -> bool {
        let rescan = self.state == WatchState::PendingRescan;
        self.state = WatchState::Idle;
        rescan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomTree, MutationKind};

    fn mutation(origin: MutationOrigin) -> DomMutation {
        DomMutation {
            origin,
            kind: MutationKind::ChildListChanged,
            target: DomTree::new().root(),
        }
    }

    #[test]
    fn test_external_mutation_schedules_rescan() {
        let mut coordinator = RescanCoordinator::new();
        assert!(coordinator.on_mutations(&[mutation(MutationOrigin::External)]));
        assert_eq!(coordinator.state(), WatchState::Idle);
    }

    #[test]
    fn test_engine_only_batches_are_ignored() {
        let mut coordinator = RescanCoordinator::new();
        assert!(!coordinator.on_mutations(&[]));
        assert!(!coordinator.on_mutations(&[mutation(MutationOrigin::Masking)]));
        // A mixed batch still counts as external churn.
        assert!(coordinator.on_mutations(&[
            mutation(MutationOrigin::Masking),
            mutation(MutationOrigin::External),
        ]));
    }

    #[test]
    fn test_mutation_during_scan_parks_instead_of_reentering() {
        let mut coordinator = RescanCoordinator::new();
        coordinator.begin_scan();
        assert!(!coordinator.on_mutations(&[mutation(MutationOrigin::External)]));
        assert_eq!(coordinator.state(), WatchState::PendingRescan);
        assert!(coordinator.finish_scan());
        assert_eq!(coordinator.state(), WatchState::Idle);
    }

    #[test]
    fn test_clean_scan_owes_nothing() {
        let mut coordinator = RescanCoordinator::new();
        coordinator.begin_scan();
        assert!(!coordinator.finish_scan());
    }
}
