//! Task catalog and the earn cycle.
//!
//! Completing a task pays into the child's pending earnings, not the
//! spendable balance; pending earnings are released at the next daily
//! cutover (and can still be forfeited by strikes until then). The vault
//! is debited at grant time, so a payout can never exceed the reserve.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use shared::Task;

use crate::domain::commands::tasks::{
    AddTaskCommand, AddTaskResult, CompleteTaskCommand, CompleteTaskResult, DeleteTaskCommand,
    DeleteTaskResult, UndoTaskCompletionCommand, UndoTaskCompletionResult, UpdateTaskCommand,
    UpdateTaskResult,
};
use crate::domain::rejection::Rejection;
use crate::domain::store::LedgerStore;

/// Service for the parent-managed task catalog and task completions.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<LedgerStore>,
}

impl TaskService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Add a task to the catalog. New tasks start active with zero
    /// completions.
    pub fn add_task(&self, command: AddTaskCommand) -> Result<AddTaskResult> {
        info!("Adding task: {}", command.name);
        validate_task_fields(&command.name, command.payout, command.daily_max)?;

        let mut state = self.store.state();
        let task = Task {
            id: self.store.next_id("task"),
            name: command.name.trim().to_string(),
            icon: command.icon,
            payout: command.payout,
            daily_max: command.daily_max,
            completions: 0,
            is_active: true,
            category: command.category,
        };
        state.tasks.push(task.clone());
        self.store.persist(&state)?;

        Ok(AddTaskResult { task })
    }

    /// Update catalog fields. Untouched fields stay as they are; the
    /// completion count is owned by the daily cycle and never edited here.
    pub fn update_task(&self, command: UpdateTaskCommand) -> Result<UpdateTaskResult> {
        info!("Updating task: {}", command.task_id);
        if let Some(ref name) = command.name {
            if name.trim().is_empty() {
                return Err(anyhow::anyhow!("Task name cannot be empty"));
            }
        }
        if let Some(payout) = command.payout {
            if payout <= 0 {
                return Err(anyhow::anyhow!("Task payout must be positive"));
            }
        }
        if let Some(daily_max) = command.daily_max {
            if daily_max == 0 {
                return Err(anyhow::anyhow!("Task daily max must be positive"));
            }
        }

        let mut state = self.store.state();
        let Some(task) = state.task_mut(&command.task_id) else {
            warn!("Task not found: {}", command.task_id);
            return Ok(UpdateTaskResult {
                success: false,
                message: format!("Task not found: {}", command.task_id),
                rejection: Some(Rejection::NotFound),
                task: None,
            });
        };
        if let Some(name) = command.name {
            task.name = name.trim().to_string();
        }
        if let Some(icon) = command.icon {
            task.icon = icon;
        }
        if let Some(payout) = command.payout {
            task.payout = payout;
        }
        if let Some(daily_max) = command.daily_max {
            task.daily_max = daily_max;
        }
        if let Some(is_active) = command.is_active {
            task.is_active = is_active;
        }
        if let Some(category) = command.category {
            task.category = category;
        }
        let updated = task.clone();
        self.store.persist(&state)?;

        Ok(UpdateTaskResult {
            success: true,
            message: format!("Updated task {}", updated.name),
            rejection: None,
            task: Some(updated),
        })
    }

    /// Remove a task from the catalog.
    pub fn delete_task(&self, command: DeleteTaskCommand) -> Result<DeleteTaskResult> {
        info!("Deleting task: {}", command.task_id);
        let mut state = self.store.state();
        let Some(position) = state.tasks.iter().position(|t| t.id == command.task_id) else {
            return Ok(DeleteTaskResult {
                success: false,
                message: format!("Task not found: {}", command.task_id),
                rejection: Some(Rejection::NotFound),
            });
        };
        let task = state.tasks.remove(position);
        self.store.persist(&state)?;
        Ok(DeleteTaskResult {
            success: true,
            message: format!("Deleted task {}", task.name),
            rejection: None,
        })
    }

    /// Record one completion: bump the count, pay the task's payout into
    /// pending earnings, debit the vault. No audit-log entry is written
    /// here; the release at the daily cutover logs the deposit.
    pub fn complete_task(&self, command: CompleteTaskCommand) -> Result<CompleteTaskResult> {
        info!(
            "Completing task {} for child {}",
            command.task_id, command.child_id
        );
        let mut state = self.store.state();
        let today = self.store.today_key();
        let max_strikes = self.store.config().max_strikes;

        let Some(task) = state.task(&command.task_id) else {
            return Ok(rejected_completion(
                Rejection::NotFound,
                format!("Task not found: {}", command.task_id),
            ));
        };
        let payout = task.payout;
        if !task.is_active {
            return Ok(rejected_completion(
                Rejection::Inactive,
                format!("{} is currently inactive", task.name),
            ));
        }
        let daily_cap_reached = task.completions >= task.daily_max;
        let task_name = task.name.clone();
        if state.child(&command.child_id).is_none() {
            return Ok(rejected_completion(
                Rejection::NotFound,
                format!("Child not found: {}", command.child_id),
            ));
        }
        if state.strikes_on(&command.child_id, &today) >= max_strikes as usize {
            warn!(
                "Child {} cannot earn today: strike cap reached",
                command.child_id
            );
            return Ok(rejected_completion(
                Rejection::StrikesExhausted,
                Rejection::StrikesExhausted.to_string(),
            ));
        }
        if daily_cap_reached {
            return Ok(rejected_completion(
                Rejection::DailyCapReached,
                format!("{} is already done for today", task_name),
            ));
        }
        if !state.vault.debit(payout) {
            warn!(
                "Vault cannot cover payout of {} (balance {})",
                payout, state.vault.balance
            );
            return Ok(rejected_completion(
                Rejection::VaultInsufficient,
                Rejection::VaultInsufficient.to_string(),
            ));
        }

        if let Some(task) = state.task_mut(&command.task_id) {
            task.completions += 1;
        }
        let mut pending_earnings = 0;
        if let Some(child) = state.child_mut(&command.child_id) {
            child.pending_earnings += payout;
            pending_earnings = child.pending_earnings;
        }
        self.store.persist(&state)?;

        Ok(CompleteTaskResult {
            success: true,
            message: format!("Earned {} bucks, released at the daily cutover", payout),
            rejection: None,
            pending_earnings: Some(pending_earnings),
        })
    }

    /// Reverse exactly one completion: the count goes back down, the
    /// payout comes out of pending earnings (floored at zero) and the
    /// vault is credited back up to capacity.
    pub fn undo_task_completion(
        &self,
        command: UndoTaskCompletionCommand,
    ) -> Result<UndoTaskCompletionResult> {
        info!(
            "Undoing completion of task {} for child {}",
            command.task_id, command.child_id
        );
        let mut state = self.store.state();

        let Some(task) = state.task(&command.task_id) else {
            return Ok(UndoTaskCompletionResult {
                success: false,
                message: format!("Task not found: {}", command.task_id),
                rejection: Some(Rejection::NotFound),
                restored_to_vault: 0,
            });
        };
        let payout = task.payout;
        if task.completions == 0 {
            return Ok(UndoTaskCompletionResult {
                success: false,
                message: format!("{} has no completions to undo today", task.name),
                rejection: Some(Rejection::NothingToUndo),
                restored_to_vault: 0,
            });
        }
        if state.child(&command.child_id).is_none() {
            return Ok(UndoTaskCompletionResult {
                success: false,
                message: format!("Child not found: {}", command.child_id),
                rejection: Some(Rejection::NotFound),
                restored_to_vault: 0,
            });
        }

        if let Some(task) = state.task_mut(&command.task_id) {
            task.completions -= 1;
        }
        if let Some(child) = state.child_mut(&command.child_id) {
            child.pending_earnings = (child.pending_earnings - payout).max(0);
        }
        let restored = state.vault.credit_clamped(payout);
        self.store.persist(&state)?;

        Ok(UndoTaskCompletionResult {
            success: true,
            message: format!("Undid one completion, {} bucks back in the vault", restored),
            rejection: None,
            restored_to_vault: restored,
        })
    }

    /// The full task catalog.
    pub fn list_tasks(&self) -> Vec<Task> {
        self.store.snapshot().tasks
    }
}

fn rejected_completion(rejection: Rejection, message: String) -> CompleteTaskResult {
    CompleteTaskResult {
        success: false,
        message,
        rejection: Some(rejection),
        pending_earnings: None,
    }
}

fn validate_task_fields(name: &str, payout: i64, daily_max: u32) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow::anyhow!("Task name cannot be empty"));
    }
    if payout <= 0 {
        return Err(anyhow::anyhow!("Task payout must be positive"));
    }
    if daily_max == 0 {
        return Err(anyhow::anyhow!("Task daily max must be positive"));
    }
    Ok(())
}
