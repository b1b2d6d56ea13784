//! # Bucks Engine
//!
//! Rules engine for the household bucks tracker: children earn bucks by
//! completing tasks, lose pending earnings to strikes, grow savings with
//! daily interest, and spend through a parent-approved request workflow.
//! A bounded vault backs every payout.
//!
//! The engine owns no UI and no storage format beyond a single
//! serializable snapshot. Presentation invokes the domain services and
//! renders the result values they return; storage, time and id
//! generation are injected so the engine stays deterministic under test.

pub mod clock;
pub mod config;
pub mod domain;
pub mod ids;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::LedgerConfig;
pub use ids::{IdProvider, SequentialIds, TimestampIds};
pub use storage::{JsonFileStorage, MemoryStorage, SnapshotStorage};
