//! The single owner of ledger state.
//!
//! `LedgerStore` plays the role a storage connection plays in a
//! database-backed app: every domain service holds an `Arc<LedgerStore>`
//! and goes through it for state access, time, ids and persistence. All
//! mutations are serialized behind one mutex, so intermediate states
//! (for example a reset halfway through the child list) are never
//! observable, and the snapshot is persisted after each change.

use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use chrono::NaiveDateTime;
use log::{info, warn};
use shared::{
    Child, LedgerSnapshot, SpendItem, Task, Transaction, TransactionType, Vault,
};

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::domain::commands::vault::{AddToVaultCommand, RemoveFromVaultCommand, VaultAdjustResult};
use crate::domain::rejection::Rejection;
use crate::domain::reset_policy::day_key;
use crate::ids::IdProvider;
use crate::storage::SnapshotStorage;

/// Mutex-guarded ledger state plus its injected collaborators.
pub struct LedgerStore {
    state: Mutex<LedgerSnapshot>,
    storage: Arc<dyn SnapshotStorage>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdProvider>,
    config: LedgerConfig,
}

impl LedgerStore {
    /// Load the persisted snapshot, or seed a fresh ledger when none
    /// exists yet: one default child, a full vault, and the starter
    /// task/item catalog.
    pub fn open(
        storage: Arc<dyn SnapshotStorage>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdProvider>,
        config: LedgerConfig,
    ) -> Result<Self> {
        let state = match storage.load()? {
            Some(snapshot) => {
                info!(
                    "Opened ledger with {} children, vault at {}/{}",
                    snapshot.children.len(),
                    snapshot.vault.balance,
                    snapshot.vault.max_balance
                );
                snapshot
            }
            None => {
                info!("No persisted ledger found, seeding defaults");
                let snapshot = Self::seeded(clock.as_ref(), ids.as_ref(), &config);
                storage.save(&snapshot)?;
                snapshot
            }
        };
        Ok(Self {
            state: Mutex::new(state),
            storage,
            clock,
            ids,
            config,
        })
    }

    fn seeded(clock: &dyn Clock, ids: &dyn IdProvider, config: &LedgerConfig) -> LedgerSnapshot {
        let now = clock.now();
        let starter_tasks = [
            ("Make your bed", "🛏️", 2, 1, "morning"),
            ("Feed the pet", "🐶", 3, 2, "chores"),
            ("Tidy your room", "🧹", 4, 1, "chores"),
            ("Finish homework", "📚", 5, 1, "school"),
        ];
        let starter_items = [
            ("30 min screen time", "📺", 5, 1, 4, "screen"),
            ("Pick dessert", "🍦", 8, 1, 1, "treats"),
            ("Stay up 30 min late", "🌙", 10, 1, 2, "privileges"),
            ("Small toy", "🧸", 25, 1, 1, "toys"),
        ];
        LedgerSnapshot {
            children: vec![Child {
                id: ids.next_id("child"),
                name: "Kiddo".to_string(),
                avatar: "🦖".to_string(),
                balance: 0,
                savings: 0,
                savings_interest_accrued: 0,
                pending_earnings: 0,
                total_earned: 0,
                total_spent: 0,
                last_interest_date: None,
            }],
            tasks: starter_tasks
                .iter()
                .map(|(name, icon, payout, daily_max, category)| Task {
                    id: ids.next_id("task"),
                    name: name.to_string(),
                    icon: icon.to_string(),
                    payout: *payout,
                    daily_max: *daily_max,
                    completions: 0,
                    is_active: true,
                    category: category.to_string(),
                })
                .collect(),
            spend_items: starter_items
                .iter()
                .map(
                    |(name, icon, unit_cost, default_quantity, max_quantity, category)| SpendItem {
                        id: ids.next_id("item"),
                        name: name.to_string(),
                        icon: icon.to_string(),
                        unit_cost: *unit_cost,
                        default_quantity: *default_quantity,
                        max_quantity: *max_quantity,
                        category: category.to_string(),
                    },
                )
                .collect(),
            strikes: Vec::new(),
            transactions: Vec::new(),
            pending_requests: Vec::new(),
            request_history: Vec::new(),
            notifications: Vec::new(),
            vault: Vault::new(config.vault_max),
            last_reset_date: now.date(),
            parental_attempts: Vec::new(),
        }
    }

    /// Lock the state for the duration of one operation. A poisoned lock
    /// is recovered rather than propagated; the snapshot is always left
    /// consistent between operations.
    pub(crate) fn state(&self) -> MutexGuard<'_, LedgerSnapshot> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Persist the snapshot after a mutation.
    pub(crate) fn persist(&self, state: &LedgerSnapshot) -> Result<()> {
        self.storage.save(state)
    }

    pub(crate) fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    /// Today's calendar-day key for strike grouping.
    pub(crate) fn today_key(&self) -> String {
        day_key(self.clock.now())
    }

    pub(crate) fn next_id(&self, prefix: &str) -> String {
        self.ids.next_id(prefix)
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Build an audit-log entry stamped with the current time.
    pub(crate) fn new_transaction(
        &self,
        child_id: &str,
        transaction_type: TransactionType,
        amount: i64,
        description: String,
    ) -> Transaction {
        Transaction {
            id: self.next_id("txn"),
            child_id: child_id.to_string(),
            transaction_type,
            amount,
            description,
            timestamp: self.clock.now(),
        }
    }

    /// Clone of the full state for read-only presentation.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.state().clone()
    }

    /// Transactions for one child, newest first, optionally limited.
    pub fn list_transactions(&self, child_id: &str, limit: Option<usize>) -> Vec<Transaction> {
        let state = self.state();
        let iter = state
            .transactions
            .iter()
            .filter(|t| t.child_id == child_id)
            .cloned();
        match limit {
            Some(n) => iter.take(n).collect(),
            None => iter.collect(),
        }
    }

    /// Top up the vault, clamped to capacity.
    pub fn add_to_vault(&self, command: AddToVaultCommand) -> Result<VaultAdjustResult> {
        let mut state = self.state();
        if command.amount <= 0 {
            return Ok(VaultAdjustResult {
                success: false,
                message: Rejection::InvalidAmount.to_string(),
                rejection: Some(Rejection::InvalidAmount),
                vault_balance: state.vault.balance,
            });
        }
        let credited = state.vault.credit_clamped(command.amount);
        self.persist(&state)?;
        info!(
            "Vault topped up by {} (requested {}), now {}",
            credited, command.amount, state.vault.balance
        );
        Ok(VaultAdjustResult {
            success: true,
            message: format!("Added {} bucks to the vault", credited),
            rejection: None,
            vault_balance: state.vault.balance,
        })
    }

    /// Withdraw from the vault; fails rather than going negative.
    pub fn remove_from_vault(&self, command: RemoveFromVaultCommand) -> Result<VaultAdjustResult> {
        let mut state = self.state();
        if command.amount <= 0 {
            return Ok(VaultAdjustResult {
                success: false,
                message: Rejection::InvalidAmount.to_string(),
                rejection: Some(Rejection::InvalidAmount),
                vault_balance: state.vault.balance,
            });
        }
        if !state.vault.debit(command.amount) {
            warn!(
                "Vault withdrawal of {} refused, only {} available",
                command.amount, state.vault.balance
            );
            return Ok(VaultAdjustResult {
                success: false,
                message: Rejection::VaultInsufficient.to_string(),
                rejection: Some(Rejection::VaultInsufficient),
                vault_balance: state.vault.balance,
            });
        }
        self.persist(&state)?;
        Ok(VaultAdjustResult {
            success: true,
            message: format!("Removed {} bucks from the vault", command.amount),
            rejection: None,
            vault_balance: state.vault.balance,
        })
    }

    /// Wipe everything and reseed the starter ledger. The only operation
    /// that drops transaction history.
    pub fn reset_to_defaults(&self) -> Result<()> {
        warn!("Resetting ledger to defaults, all history will be dropped");
        let mut state = self.state();
        *state = Self::seeded(self.clock.as_ref(), self.ids.as_ref(), &self.config);
        self.persist(&state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::ids::SequentialIds;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn test_store() -> LedgerStore {
        let clock = FixedClock::new(
            NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        LedgerStore::open(
            Arc::new(MemoryStorage::new()),
            Arc::new(clock),
            Arc::new(SequentialIds::default()),
            LedgerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_seeds_defaults_when_storage_is_empty() {
        let store = test_store();
        let snapshot = store.snapshot();

        assert_eq!(snapshot.children.len(), 1);
        assert_eq!(snapshot.children[0].balance, 0);
        assert!(!snapshot.tasks.is_empty());
        assert!(!snapshot.spend_items.is_empty());
        assert!(snapshot.strikes.is_empty());
        assert!(snapshot.transactions.is_empty());
        assert_eq!(snapshot.vault.balance, snapshot.vault.max_balance);
    }

    #[test]
    fn test_open_prefers_persisted_snapshot() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(FixedClock::new(
            NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        ));
        let ids = Arc::new(SequentialIds::default());

        let first = LedgerStore::open(
            storage.clone(),
            clock.clone(),
            ids.clone(),
            LedgerConfig::default(),
        )
        .unwrap();
        first
            .add_to_vault(AddToVaultCommand { amount: 1 })
            .unwrap();
        first
            .remove_from_vault(RemoveFromVaultCommand { amount: 42 })
            .unwrap();
        let expected = first.snapshot();

        let second =
            LedgerStore::open(storage, clock, ids, LedgerConfig::default()).unwrap();
        assert_eq!(second.snapshot(), expected);
    }

    #[test]
    fn test_add_to_vault_is_clamped_to_capacity() {
        let store = test_store();
        // Seeded full: a top-up credits nothing.
        let result = store.add_to_vault(AddToVaultCommand { amount: 50 }).unwrap();
        assert!(result.success);
        assert_eq!(result.vault_balance, store.config().vault_max);
    }

    #[test]
    fn test_remove_from_vault_refuses_to_go_negative() {
        let store = test_store();
        let max = store.config().vault_max;

        let ok = store
            .remove_from_vault(RemoveFromVaultCommand { amount: max })
            .unwrap();
        assert!(ok.success);
        assert_eq!(ok.vault_balance, 0);

        let refused = store
            .remove_from_vault(RemoveFromVaultCommand { amount: 1 })
            .unwrap();
        assert!(!refused.success);
        assert_eq!(refused.rejection, Some(Rejection::VaultInsufficient));
        assert_eq!(refused.vault_balance, 0);
    }

    #[test]
    fn test_vault_adjustments_reject_non_positive_amounts() {
        let store = test_store();
        let result = store.add_to_vault(AddToVaultCommand { amount: 0 }).unwrap();
        assert_eq!(result.rejection, Some(Rejection::InvalidAmount));
        let result = store
            .remove_from_vault(RemoveFromVaultCommand { amount: -3 })
            .unwrap();
        assert_eq!(result.rejection, Some(Rejection::InvalidAmount));
    }

    #[test]
    fn test_reset_to_defaults_reseeds() {
        let store = test_store();
        store
            .remove_from_vault(RemoveFromVaultCommand { amount: 100 })
            .unwrap();
        assert_ne!(store.snapshot().vault.balance, store.config().vault_max);

        store.reset_to_defaults().unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.vault.balance, store.config().vault_max);
        assert_eq!(snapshot.children.len(), 1);
        assert!(snapshot.transactions.is_empty());
    }

    #[test]
    fn test_list_transactions_filters_and_limits() {
        let store = test_store();
        {
            let mut state = store.state();
            for i in 0..5 {
                let tx = store.new_transaction(
                    "child-0001",
                    TransactionType::Earn,
                    i,
                    format!("tx {i}"),
                );
                state.transactions.insert(0, tx);
            }
            let other = store.new_transaction(
                "child-9999",
                TransactionType::Earn,
                7,
                "other child".to_string(),
            );
            state.transactions.insert(0, other);
        }

        let all = store.list_transactions("child-0001", None);
        assert_eq!(all.len(), 5);
        // Newest first.
        assert_eq!(all[0].amount, 4);

        let limited = store.list_transactions("child-0001", Some(2));
        assert_eq!(limited.len(), 2);
    }
}
