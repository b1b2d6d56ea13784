//! Shared data model for the bucks tracker.
//!
//! Everything in this crate is plain serializable data: the entities the
//! rules engine mutates, and the snapshot that both the storage layer
//! persists as a single blob and the presentation layer reads. Business
//! rules live in the engine crate; the only logic here is intrinsic to
//! the data (id lookups, the vault's hard bounds).

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A child profile tracked by the ledger.
///
/// All currency fields are whole bucks. `balance`, `savings` and
/// `pending_earnings` are never negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Child {
    pub id: String,
    pub name: String,
    /// Avatar tag rendered by the presentation layer (emoji or asset key).
    pub avatar: String,
    /// Spendable balance.
    pub balance: i64,
    /// Savings sub-account balance.
    pub savings: i64,
    /// Fractional interest left over after flooring, in hundredths of a
    /// buck (0-99). Carried on the profile but not compounded.
    pub savings_interest_accrued: u32,
    /// Earned but not yet released; moves into `balance` at the daily cutover.
    pub pending_earnings: i64,
    /// Lifetime bucks earned.
    pub total_earned: i64,
    /// Lifetime bucks spent.
    pub total_spent: i64,
    /// Day the last interest accrual was applied to this profile.
    pub last_interest_date: Option<NaiveDate>,
}

/// An earnable action in the parent-managed task catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Bucks paid into pending earnings per completion. Always positive.
    pub payout: i64,
    /// Completions allowed per day. Always positive.
    pub daily_max: u32,
    /// Completions recorded today; reset to zero at the daily cutover.
    pub completions: u32,
    pub is_active: bool,
    pub category: String,
}

/// A per-day demerit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strike {
    pub id: String,
    pub child_id: String,
    pub reason: String,
    pub timestamp: NaiveDateTime,
    /// Calendar-day key (`YYYY-MM-DD`) used for per-day grouping. This is
    /// the plain date, independent of the earn-cutover clock.
    pub day: String,
}

/// Catalog entry a child can put on a spend request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendItem {
    pub id: String,
    pub name: String,
    pub icon: String,
    /// Bucks per unit. Always positive.
    pub unit_cost: i64,
    /// Quantity pre-filled in the request form.
    pub default_quantity: u32,
    /// Largest quantity allowed on a single request.
    pub max_quantity: u32,
    pub category: String,
}

/// Line item snapshotted onto a spend request at creation time. Later
/// catalog edits never change a request that has already been made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestItem {
    pub item_id: String,
    pub name: String,
    pub icon: String,
    pub unit_cost: i64,
    pub quantity: u32,
}

/// Lifecycle state of a spend request. `Approved` and `Denied` are
/// terminal; there is no revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

/// A child's request to spend earned balance, resolved by a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRequest {
    pub id: String,
    pub child_id: String,
    pub items: Vec<RequestItem>,
    /// Sum of unit cost times quantity, fixed when the request is created.
    pub total_cost: i64,
    pub status: RequestStatus,
    pub requested_at: NaiveDateTime,
    pub responded_at: Option<NaiveDateTime>,
}

/// Confirmation of an approved request, shown to the child exactly once.
/// Lives independently of the request history: marking it shown does not
/// alter the request record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovedRequestNotification {
    pub id: String,
    pub request_id: String,
    pub child_id: String,
    pub total_cost: i64,
    pub shown_to_child: bool,
}

/// Kind of balance-affecting event recorded in the transaction log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Earn,
    Spend,
    Refund,
    StrikePenalty,
    Interest,
    SavingsDeposit,
    SavingsWithdrawal,
}

/// Immutable audit record of one balance-affecting event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub child_id: String,
    pub transaction_type: TransactionType,
    /// Signed amount from the spendable-balance perspective.
    pub amount: i64,
    pub description: String,
    pub timestamp: NaiveDateTime,
}

/// The bounded reserve backing all payouts. Every buck a child holds was
/// debited from here, and returns here on spending or forfeiture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vault {
    /// Current reserve, always within `[0, max_balance]`.
    pub balance: i64,
    pub max_balance: i64,
}

impl Vault {
    /// A full vault with the given capacity.
    pub fn new(max_balance: i64) -> Self {
        Self {
            balance: max_balance,
            max_balance,
        }
    }

    /// Credit up to capacity; returns the amount actually credited.
    pub fn credit_clamped(&mut self, amount: i64) -> i64 {
        let credited = amount.min(self.max_balance - self.balance).max(0);
        self.balance += credited;
        credited
    }

    /// Debit the reserve. Returns false (and leaves the balance untouched)
    /// when the vault holds less than `amount`.
    pub fn debit(&mut self, amount: i64) -> bool {
        if amount > self.balance {
            return false;
        }
        self.balance -= amount;
        true
    }
}

/// One recorded answer to the parent-role challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentalControlAttempt {
    pub id: String,
    pub attempted_value: String,
    pub timestamp: NaiveDateTime,
    pub success: bool,
}

/// The entire persistable engine state: what the storage layer writes as
/// a single blob and what the presentation layer reads as a read-only
/// view. Pure UI state (current view, selected child) is deliberately not
/// part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub children: Vec<Child>,
    pub tasks: Vec<Task>,
    pub spend_items: Vec<SpendItem>,
    /// Append-only within a day; prior days are cleared by the daily reset.
    pub strikes: Vec<Strike>,
    /// Audit log, newest first. Only a full reset to defaults drops entries.
    pub transactions: Vec<Transaction>,
    pub pending_requests: Vec<SpendRequest>,
    /// Responded requests, newest first.
    pub request_history: Vec<SpendRequest>,
    /// Approval confirmations, oldest first.
    pub notifications: Vec<ApprovedRequestNotification>,
    pub vault: Vault,
    /// Watermark guarding the daily reset against double application.
    pub last_reset_date: NaiveDate,
    pub parental_attempts: Vec<ParentalControlAttempt>,
}

impl LedgerSnapshot {
    pub fn child(&self, child_id: &str) -> Option<&Child> {
        self.children.iter().find(|c| c.id == child_id)
    }

    pub fn child_mut(&mut self, child_id: &str) -> Option<&mut Child> {
        self.children.iter_mut().find(|c| c.id == child_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub fn spend_item(&self, item_id: &str) -> Option<&SpendItem> {
        self.spend_items.iter().find(|i| i.id == item_id)
    }

    pub fn spend_item_mut(&mut self, item_id: &str) -> Option<&mut SpendItem> {
        self.spend_items.iter_mut().find(|i| i.id == item_id)
    }

    /// Number of strikes a child has on the given day key.
    pub fn strikes_on(&self, child_id: &str, day: &str) -> usize {
        self.strikes
            .iter()
            .filter(|s| s.child_id == child_id && s.day == day)
            .count()
    }
}
