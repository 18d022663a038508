//! Core client logic - framework-agnostic state synchronization, interaction state and
//! preferences. Nothing in here knows about Discord.

/// Dialog and form state
pub mod interaction;
/// Single in-flight mutation latch
pub mod latch;
/// Persisted client preferences (selected location)
pub mod preferences;
/// The synchronization client and its mirror
pub mod sync;

pub use latch::MutationPhase;
pub use sync::{Collection, Outcome, SyncClient, SyncState};
