//! Child profile management.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use shared::{Child, TransactionType};

use crate::domain::commands::children::{
    CreateChildCommand, CreateChildResult, DeleteChildCommand, DeleteChildResult,
    UpdateChildCommand, UpdateChildResult,
};
use crate::domain::rejection::Rejection;
use crate::domain::store::LedgerStore;

/// Service for managing child profiles.
#[derive(Clone)]
pub struct ChildService {
    store: Arc<LedgerStore>,
}

impl ChildService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Create a new child profile with zeroed balances.
    pub fn create_child(&self, command: CreateChildCommand) -> Result<CreateChildResult> {
        info!("Creating child: name={}", command.name);
        validate_name(&command.name)?;

        let mut state = self.store.state();
        let child = Child {
            id: self.store.next_id("child"),
            name: command.name.trim().to_string(),
            avatar: command.avatar,
            balance: 0,
            savings: 0,
            savings_interest_accrued: 0,
            pending_earnings: 0,
            total_earned: 0,
            total_spent: 0,
            last_interest_date: None,
        };
        state.children.push(child.clone());
        self.store.persist(&state)?;

        info!("Created child {} ({})", child.name, child.id);
        Ok(CreateChildResult { child })
    }

    /// Update name and/or avatar. Untouched fields stay as they are.
    pub fn update_child(&self, command: UpdateChildCommand) -> Result<UpdateChildResult> {
        info!("Updating child: {}", command.child_id);
        if let Some(ref name) = command.name {
            validate_name(name)?;
        }

        let mut state = self.store.state();
        let Some(child) = state.child_mut(&command.child_id) else {
            warn!("Child not found: {}", command.child_id);
            return Ok(UpdateChildResult {
                success: false,
                message: format!("Child not found: {}", command.child_id),
                rejection: Some(Rejection::NotFound),
                child: None,
            });
        };

        if let Some(name) = command.name {
            child.name = name.trim().to_string();
        }
        if let Some(avatar) = command.avatar {
            child.avatar = avatar;
        }
        let updated = child.clone();
        self.store.persist(&state)?;

        Ok(UpdateChildResult {
            success: true,
            message: format!("Updated {}", updated.name),
            rejection: None,
            child: Some(updated),
        })
    }

    /// Delete a child profile. The units it held go back to the vault
    /// (clamped to capacity) and its strikes, pending requests and
    /// notifications are removed; the transaction log is kept as audit
    /// history. The sole remaining profile cannot be deleted.
    pub fn delete_child(&self, command: DeleteChildCommand) -> Result<DeleteChildResult> {
        info!("Deleting child: {}", command.child_id);

        let mut state = self.store.state();
        if state.children.len() <= 1 {
            warn!("Refusing to delete the last child profile");
            return Ok(DeleteChildResult {
                success: false,
                message: Rejection::LastChildProtected.to_string(),
                rejection: Some(Rejection::LastChildProtected),
                returned_to_vault: 0,
            });
        }
        let Some(position) = state.children.iter().position(|c| c.id == command.child_id) else {
            return Ok(DeleteChildResult {
                success: false,
                message: format!("Child not found: {}", command.child_id),
                rejection: Some(Rejection::NotFound),
                returned_to_vault: 0,
            });
        };

        let child = state.children.remove(position);
        let held = child.balance + child.savings + child.pending_earnings;
        let returned = state.vault.credit_clamped(held);
        if returned > 0 {
            let tx = self.store.new_transaction(
                &child.id,
                TransactionType::Refund,
                returned,
                format!("Returned {} bucks to the vault when {} was removed", returned, child.name),
            );
            state.transactions.insert(0, tx);
        }
        state.strikes.retain(|s| s.child_id != child.id);
        state.pending_requests.retain(|r| r.child_id != child.id);
        state.notifications.retain(|n| n.child_id != child.id);
        self.store.persist(&state)?;

        info!("Deleted child {} ({}), {} bucks returned to the vault", child.name, child.id, returned);
        Ok(DeleteChildResult {
            success: true,
            message: format!("Deleted {}", child.name),
            rejection: None,
            returned_to_vault: returned,
        })
    }

    /// All child profiles.
    pub fn list_children(&self) -> Vec<Child> {
        self.store.snapshot().children
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow::anyhow!("Child name cannot be empty"));
    }
    if name.len() > 100 {
        return Err(anyhow::anyhow!("Child name cannot exceed 100 characters"));
    }
    Ok(())
}
