//! JSON-file snapshot store: one blob under a fixed file name.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use shared::LedgerSnapshot;

use super::traits::SnapshotStorage;

/// Fixed storage identifier: the snapshot file name inside the data directory.
pub const SNAPSHOT_FILE: &str = "bucks-tracker.json";

/// File-backed snapshot store.
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage rooted at `data_dir`. The directory is created on first save.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(SNAPSHOT_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<LedgerSnapshot>> {
        if !self.path.exists() {
            debug!("No snapshot at {}, starting fresh", self.path.display());
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read snapshot file {}", self.path.display()))?;
        let snapshot: LedgerSnapshot = serde_json::from_str(&raw)
            .with_context(|| format!("Snapshot file {} is corrupt", self.path.display()))?;
        info!(
            "Loaded snapshot from {} ({} children, {} transactions)",
            self.path.display(),
            snapshot.children.len(),
            snapshot.transactions.len()
        );
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &LedgerSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write snapshot file {}", self.path.display()))?;
        Ok(())
    }
}
