//! Identifier generation.
//!
//! Ids follow the `<prefix>-<epoch_millis>-<hex4>` format. The provider
//! is injected so tests can use sequential, reproducible ids instead.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Produces unique entity ids.
pub trait IdProvider: Send + Sync {
    /// A fresh id carrying the given entity prefix, e.g. `task-1625846400123-af3c`.
    fn next_id(&self, prefix: &str) -> String;
}

/// Production ids: epoch millis plus a short suffix derived from the
/// sub-millisecond clock.
#[derive(Debug, Default)]
pub struct TimestampIds;

impl IdProvider for TimestampIds {
    fn next_id(&self, prefix: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let millis = now.as_millis() as u64;
        let suffix = (now.as_nanos() % 0x1_0000) as u16;
        format!("{prefix}-{millis}-{suffix:04x}")
    }
}

/// Monotonic counter ids for deterministic tests.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl IdProvider for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{prefix}-{n:04}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ids_carry_prefix() {
        let ids = TimestampIds;
        let id = ids.next_id("task");
        assert!(id.starts_with("task-"));
        assert_eq!(id.split('-').count(), 3);
    }

    #[test]
    fn test_sequential_ids_are_ordered() {
        let ids = SequentialIds::default();
        assert_eq!(ids.next_id("child"), "child-0001");
        assert_eq!(ids.next_id("child"), "child-0002");
        assert_eq!(ids.next_id("strike"), "strike-0003");
    }
}
