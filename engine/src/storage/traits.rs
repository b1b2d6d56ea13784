//! Storage abstraction traits.

use anyhow::Result;
use shared::LedgerSnapshot;

/// Interface for persisting the full engine state as one blob.
///
/// All operations are synchronous; the engine runs in a single-writer
/// execution context and persists after each mutation.
pub trait SnapshotStorage: Send + Sync {
    /// Load the persisted snapshot; `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<LedgerSnapshot>>;

    /// Persist the full snapshot, replacing any previous one.
    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()>;
}
