use std::sync::{Arc, RwLock};

use crate::models::holding::Holding;
use crate::models::snapshot::{CacheView, PortfolioSnapshot, Readiness};

struct CacheState {
    snapshot: Arc<PortfolioSnapshot>,
    readiness: Readiness,
}

/// Holds the latest complete snapshot and the readiness state machine.
///
/// COLD → WARMING (first cycle in flight) → WARM (terminal). A failed first
/// cycle drops WARMING back to COLD. Readers copy out an `Arc` under a short
/// read lock and never wait on network I/O; the scheduler is the only writer.
pub struct PortfolioCache {
    state: RwLock<CacheState>,
}

impl PortfolioCache {
    /// Start COLD, serving a placeholder record for every holding.
    pub fn new(holdings: &[Holding]) -> Self {
        Self {
            state: RwLock::new(CacheState {
                snapshot: Arc::new(PortfolioSnapshot::placeholder(holdings)),
                readiness: Readiness::Cold,
            }),
        }
    }

    pub fn get(&self) -> CacheView {
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        CacheView {
            snapshot: Arc::clone(&state.snapshot),
            readiness: state.readiness,
        }
    }

    pub fn readiness(&self) -> Readiness {
        self.state.read().unwrap_or_else(|e| e.into_inner()).readiness
    }

    /// Publish a new snapshot. Rejected (returns `false`) unless its
    /// generation is newer than the current one, so reads stay monotonic.
    pub fn set(&self, snapshot: PortfolioSnapshot) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if snapshot.generation <= state.snapshot.generation {
            tracing::warn!(
                incoming = snapshot.generation,
                current = state.snapshot.generation,
                "out-of-order snapshot discarded"
            );
            return false;
        }
        state.snapshot = Arc::new(snapshot);
        state.readiness = Readiness::Warm;
        true
    }

    /// A refresh cycle has started.
    pub(crate) fn mark_warming(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.readiness == Readiness::Cold {
            state.readiness = Readiness::Warming;
        }
    }

    /// A refresh cycle ended without committing.
    pub(crate) fn mark_cycle_failed(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        if state.readiness == Readiness::Warming {
            state.readiness = Readiness::Cold;
        }
    }

    /// Generation of the snapshot currently served (0 while cold).
    pub fn generation(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .snapshot
            .generation
    }
}
