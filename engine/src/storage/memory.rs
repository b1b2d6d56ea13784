//! In-memory snapshot store for tests and ephemeral sessions.

use std::sync::Mutex;

use anyhow::Result;
use shared::LedgerSnapshot;

use super::traits::SnapshotStorage;

/// Snapshot store that never touches disk.
#[derive(Default)]
pub struct MemoryStorage {
    slot: Mutex<Option<LedgerSnapshot>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self) -> Result<Option<LedgerSnapshot>> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        *self
            .slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(snapshot.clone());
        Ok(())
    }
}
