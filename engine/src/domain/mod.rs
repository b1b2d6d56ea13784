//! # Domain Module
//!
//! Contains all business logic for the bucks tracker.
//!
//! ## Module Organization
//!
//! - **store**: the single owner of ledger state; vault adjustments and
//!   the transaction log live here
//! - **child_service**: child profile management
//! - **task_service**: task catalog and the earn cycle
//! - **strike_service**: per-day strikes and the forfeiture rule
//! - **savings_service**: savings transfers
//! - **spend_service**: spend catalog, request workflow, notifications
//! - **reset_service** / **reset_policy**: the daily cutover orchestrator
//!   and its pure clock policy
//! - **interest**: pure savings interest calculation
//! - **parental_control_service**: the parent-role challenge
//! - **commands** / **rejection**: the operation boundary consumed by the
//!   presentation layer
//!
//! ## Execution model
//!
//! Single writer: every service goes through one `LedgerStore`, which
//! serializes mutations behind a mutex and persists the snapshot after
//! each change. Expected business-rule failures come back inside result
//! values; the error channel is reserved for storage faults and malformed
//! caller input.

pub mod child_service;
pub mod commands;
pub mod interest;
pub mod parental_control_service;
pub mod rejection;
pub mod reset_policy;
pub mod reset_service;
pub mod savings_service;
pub mod spend_service;
pub mod store;
pub mod strike_service;
pub mod task_service;

pub use child_service::ChildService;
pub use parental_control_service::ParentalControlService;
pub use reset_service::ResetService;
pub use savings_service::SavingsService;
pub use spend_service::SpendService;
pub use store::LedgerStore;
pub use strike_service::StrikeService;
pub use task_service::TaskService;
