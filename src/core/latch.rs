//! In-flight latch for mutating operations.
//!
//! At most one mutation may be outstanding. Acquiring the latch while it is held fails
//! immediately; there is no queue. The latch also records which phase the current mutation
//! is in so the view can disable its buttons.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where the current mutation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// No mutation outstanding
    Idle,
    /// Request sent, waiting for the backend
    Sending,
    /// Backend accepted; re-fetching affected collections
    Reconciling,
}

impl MutationPhase {
    const fn from_u8(value: u8) -> Self {
        match value {
            SENDING => Self::Sending,
            RECONCILING => Self::Reconciling,
            _ => Self::Idle,
        }
    }
}

const IDLE: u8 = 0;
const SENDING: u8 = 1;
const RECONCILING: u8 = 2;

/// Mutual-exclusion latch. See the module docs.
#[derive(Debug, Default)]
pub struct MutationLatch {
    phase: AtomicU8,
}

impl MutationLatch {
    /// Takes the latch, moving to [`MutationPhase::Sending`].
    ///
    /// Returns `None` if a mutation is already in flight.
    pub fn try_acquire(&self) -> Option<LatchGuard<'_>> {
        self.phase
            .compare_exchange(IDLE, SENDING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| LatchGuard { latch: self })
    }

    /// Current phase.
    pub fn phase(&self) -> MutationPhase {
        MutationPhase::from_u8(self.phase.load(Ordering::Acquire))
    }

    /// Whether a mutation is outstanding.
    pub fn is_held(&self) -> bool {
        self.phase() != MutationPhase::Idle
    }
}

/// Holds the latch; dropping it returns the latch to [`MutationPhase::Idle`].
#[derive(Debug)]
pub struct LatchGuard<'a> {
    latch: &'a MutationLatch,
}

impl LatchGuard<'_> {
    /// Marks the request as accepted and reconciliation as started.
    pub fn reconciling(&self) {
        self.latch.phase.store(RECONCILING, Ordering::Release);
    }
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.latch.phase.store(IDLE, Ordering::Release);
    }
}
