//! Per-day strikes and the forfeiture rule.
//!
//! Strikes are grouped by calendar day. Reaching the daily cap is an
//! edge-triggered event: the child's entire pending earnings go back to
//! the vault exactly once, when the final strike lands. Being at the cap
//! afterwards has no further effect.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use shared::{Strike, TransactionType};

use crate::domain::commands::strikes::{
    AddStrikeCommand, AddStrikeResult, RemoveStrikeCommand, RemoveStrikeResult,
    ResetStrikesCommand, ResetStrikesResult,
};
use crate::domain::rejection::Rejection;
use crate::domain::store::LedgerStore;

/// Service for the per-day strike ledger.
#[derive(Clone)]
pub struct StrikeService {
    store: Arc<LedgerStore>,
}

impl StrikeService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Record a strike. The strike that reaches the daily cap forfeits
    /// the child's pending earnings back to the vault.
    pub fn add_strike(&self, command: AddStrikeCommand) -> Result<AddStrikeResult> {
        info!(
            "Adding strike for child {}: {}",
            command.child_id, command.reason
        );
        let mut state = self.store.state();
        let today = self.store.today_key();
        let max_strikes = self.store.config().max_strikes;

        if state.child(&command.child_id).is_none() {
            return Ok(rejected_strike(
                Rejection::NotFound,
                format!("Child not found: {}", command.child_id),
            ));
        }
        let count = state.strikes_on(&command.child_id, &today) as u32;
        if count >= max_strikes {
            return Ok(rejected_strike(
                Rejection::StrikeCapReached,
                Rejection::StrikeCapReached.to_string(),
            ));
        }

        let strike = Strike {
            id: self.store.next_id("strike"),
            child_id: command.child_id.clone(),
            reason: command.reason,
            timestamp: self.store.now(),
            day: today,
        };
        state.strikes.push(strike.clone());
        let strikes_today = count + 1;

        let mut forfeited = 0;
        if strikes_today == max_strikes {
            if let Some(child) = state.child_mut(&command.child_id) {
                forfeited = child.pending_earnings;
                child.pending_earnings = 0;
            }
            if forfeited > 0 {
                state.vault.credit_clamped(forfeited);
                let tx = self.store.new_transaction(
                    &command.child_id,
                    TransactionType::StrikePenalty,
                    -forfeited,
                    format!("Forfeited {} bucks of pending earnings after {} strikes", forfeited, max_strikes),
                );
                state.transactions.insert(0, tx);
                warn!(
                    "Child {} hit the strike cap, forfeited {} pending bucks",
                    command.child_id, forfeited
                );
            }
        }
        self.store.persist(&state)?;

        let message = if forfeited > 0 {
            format!("Strike {strikes_today} of {max_strikes}: {forfeited} pending bucks forfeited")
        } else {
            format!("Strike {strikes_today} of {max_strikes}")
        };
        Ok(AddStrikeResult {
            success: true,
            message,
            rejection: None,
            strike: Some(strike),
            strikes_today,
            forfeited,
        })
    }

    /// Delete one strike record by id. No side effects: forfeited
    /// earnings are not restored retroactively.
    pub fn remove_strike(&self, command: RemoveStrikeCommand) -> Result<RemoveStrikeResult> {
        info!("Removing strike {}", command.strike_id);
        let mut state = self.store.state();
        let Some(position) = state.strikes.iter().position(|s| s.id == command.strike_id) else {
            return Ok(RemoveStrikeResult {
                success: false,
                message: format!("Strike not found: {}", command.strike_id),
                rejection: Some(Rejection::NotFound),
            });
        };
        state.strikes.remove(position);
        self.store.persist(&state)?;
        Ok(RemoveStrikeResult {
            success: true,
            message: "Strike removed".to_string(),
            rejection: None,
        })
    }

    /// Parent override: clear all of a child's strikes unconditionally.
    pub fn reset_strikes(&self, command: ResetStrikesCommand) -> Result<ResetStrikesResult> {
        info!("Resetting strikes for child {}", command.child_id);
        let mut state = self.store.state();
        let before = state.strikes.len();
        state.strikes.retain(|s| s.child_id != command.child_id);
        let cleared = before - state.strikes.len();
        self.store.persist(&state)?;
        Ok(ResetStrikesResult {
            cleared,
            message: format!("Cleared {cleared} strikes"),
        })
    }

    /// A child's strikes for the current day, oldest first.
    pub fn strikes_today(&self, child_id: &str) -> Vec<Strike> {
        let today = self.store.today_key();
        self.store
            .snapshot()
            .strikes
            .into_iter()
            .filter(|s| s.child_id == child_id && s.day == today)
            .collect()
    }
}

fn rejected_strike(rejection: Rejection, message: String) -> AddStrikeResult {
    AddStrikeResult {
        success: false,
        message,
        rejection: Some(rejection),
        strike: None,
        strikes_today: 0,
        forfeited: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::LedgerConfig;
    use crate::domain::commands::tasks::{AddTaskCommand, CompleteTaskCommand};
    use crate::domain::task_service::TaskService;
    use crate::ids::SequentialIds;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn test_store() -> Arc<LedgerStore> {
        let clock = FixedClock::new(
            NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        Arc::new(
            LedgerStore::open(
                Arc::new(MemoryStorage::new()),
                Arc::new(clock),
                Arc::new(SequentialIds::default()),
                LedgerConfig::default(),
            )
            .unwrap(),
        )
    }

    fn setup_test() -> (Arc<LedgerStore>, StrikeService, String) {
        let store = test_store();
        let service = StrikeService::new(store.clone());
        let child_id = store.snapshot().children[0].id.clone();
        (store, service, child_id)
    }

    fn strike(service: &StrikeService, child_id: &str, reason: &str) -> AddStrikeResult {
        service
            .add_strike(AddStrikeCommand {
                child_id: child_id.to_string(),
                reason: reason.to_string(),
            })
            .unwrap()
    }

    #[test]
    fn test_strikes_accumulate_until_the_cap() {
        let (_store, service, child_id) = setup_test();
        assert_eq!(strike(&service, &child_id, "yelling").strikes_today, 1);
        assert_eq!(strike(&service, &child_id, "hitting").strikes_today, 2);
        assert_eq!(service.strikes_today(&child_id).len(), 2);
    }

    #[test]
    fn test_fourth_strike_is_rejected_and_changes_nothing() {
        let (store, service, child_id) = setup_test();
        for i in 0..3 {
            assert!(strike(&service, &child_id, &format!("strike {i}")).success);
        }
        let before = store.snapshot();

        let result = strike(&service, &child_id, "one too many");
        assert!(!result.success);
        assert_eq!(result.rejection, Some(Rejection::StrikeCapReached));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_third_strike_forfeits_pending_earnings_once() {
        let (store, service, child_id) = setup_test();
        let tasks = TaskService::new(store.clone());
        let task = tasks
            .add_task(AddTaskCommand {
                name: "Rake leaves".to_string(),
                icon: "🍂".to_string(),
                payout: 5,
                daily_max: 1,
                category: "chores".to_string(),
            })
            .unwrap()
            .task;
        tasks
            .complete_task(CompleteTaskCommand {
                child_id: child_id.clone(),
                task_id: task.id,
            })
            .unwrap();
        let vault_before = store.snapshot().vault.balance;

        // Two strikes: no forfeiture yet.
        assert_eq!(strike(&service, &child_id, "first").forfeited, 0);
        assert_eq!(strike(&service, &child_id, "second").forfeited, 0);
        assert_eq!(store.snapshot().child(&child_id).unwrap().pending_earnings, 5);

        // The third strike forfeits everything pending.
        let result = strike(&service, &child_id, "third");
        assert!(result.success);
        assert_eq!(result.forfeited, 5);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.child(&child_id).unwrap().pending_earnings, 0);
        assert_eq!(snapshot.vault.balance, vault_before + 5);
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(
            snapshot.transactions[0].transaction_type,
            TransactionType::StrikePenalty
        );
        assert_eq!(snapshot.transactions[0].amount, -5);
    }

    #[test]
    fn test_forfeiture_with_nothing_pending_logs_no_transaction() {
        let (store, service, child_id) = setup_test();
        for i in 0..3 {
            strike(&service, &child_id, &format!("strike {i}"));
        }
        assert!(store.snapshot().transactions.is_empty());
    }

    #[test]
    fn test_forfeiture_can_trigger_again_after_parent_reset() {
        let (store, service, child_id) = setup_test();
        let tasks = TaskService::new(store.clone());
        let task = tasks
            .add_task(AddTaskCommand {
                name: "Rake leaves".to_string(),
                icon: "🍂".to_string(),
                payout: 4,
                daily_max: 5,
                category: "chores".to_string(),
            })
            .unwrap()
            .task;

        tasks
            .complete_task(CompleteTaskCommand {
                child_id: child_id.clone(),
                task_id: task.id.clone(),
            })
            .unwrap();
        for i in 0..3 {
            strike(&service, &child_id, &format!("strike {i}"));
        }
        assert_eq!(store.snapshot().child(&child_id).unwrap().pending_earnings, 0);

        service
            .reset_strikes(ResetStrikesCommand {
                child_id: child_id.clone(),
            })
            .unwrap();
        assert!(service.strikes_today(&child_id).is_empty());

        // Fresh earnings, three fresh strikes: forfeiture fires again.
        tasks
            .complete_task(CompleteTaskCommand {
                child_id: child_id.clone(),
                task_id: task.id,
            })
            .unwrap();
        for i in 0..2 {
            assert_eq!(strike(&service, &child_id, &format!("again {i}")).forfeited, 0);
        }
        let result = strike(&service, &child_id, "again 2");
        assert_eq!(result.forfeited, 4);
        assert_eq!(store.snapshot().child(&child_id).unwrap().pending_earnings, 0);
    }

    #[test]
    fn test_remove_strike_has_no_side_effects() {
        let (store, service, child_id) = setup_test();
        let first = strike(&service, &child_id, "first").strike.unwrap();
        strike(&service, &child_id, "second");

        let result = service
            .remove_strike(RemoveStrikeCommand {
                strike_id: first.id,
            })
            .unwrap();
        assert!(result.success);
        assert_eq!(service.strikes_today(&child_id).len(), 1);
        // Pending earnings untouched by strike removal.
        assert_eq!(store.snapshot().child(&child_id).unwrap().pending_earnings, 0);
    }

    #[test]
    fn test_remove_unknown_strike_is_rejected() {
        let (_store, service, _child_id) = setup_test();
        let result = service
            .remove_strike(RemoveStrikeCommand {
                strike_id: "nope".to_string(),
            })
            .unwrap();
        assert_eq!(result.rejection, Some(Rejection::NotFound));
    }

    #[test]
    fn test_strike_for_unknown_child_is_rejected() {
        let (_store, service, _child_id) = setup_test();
        let result = strike(&service, "nope", "whatever");
        assert_eq!(result.rejection, Some(Rejection::NotFound));
    }
}
