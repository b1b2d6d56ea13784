//! Savings transfers.
//!
//! Deposits and withdrawals move bucks between a child's spendable
//! balance and savings. These are internal transfers: the vault is never
//! touched. Amounts are logged from the balance perspective, so deposits
//! show as negative and withdrawals as positive.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use shared::TransactionType;

use crate::domain::commands::savings::{
    DepositToSavingsCommand, SavingsTransferResult, WithdrawFromSavingsCommand,
};
use crate::domain::rejection::Rejection;
use crate::domain::store::LedgerStore;

/// Service for moving bucks in and out of the savings sub-account.
#[derive(Clone)]
pub struct SavingsService {
    store: Arc<LedgerStore>,
}

impl SavingsService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Move bucks from balance into savings.
    pub fn deposit_to_savings(
        &self,
        command: DepositToSavingsCommand,
    ) -> Result<SavingsTransferResult> {
        info!(
            "Depositing {} to savings for child {}",
            command.amount, command.child_id
        );
        let mut state = self.store.state();
        if command.amount <= 0 {
            return Ok(rejected_transfer(Rejection::InvalidAmount));
        }
        let Some(child) = state.child_mut(&command.child_id) else {
            return Ok(rejected_transfer(Rejection::NotFound));
        };
        if command.amount > child.balance {
            warn!(
                "Deposit of {} exceeds balance {} for child {}",
                command.amount, child.balance, command.child_id
            );
            return Ok(rejected_transfer(Rejection::InsufficientBalance));
        }

        child.balance -= command.amount;
        child.savings += command.amount;
        let (balance, savings) = (child.balance, child.savings);
        let tx = self.store.new_transaction(
            &command.child_id,
            TransactionType::SavingsDeposit,
            -command.amount,
            format!("Moved {} bucks into savings", command.amount),
        );
        state.transactions.insert(0, tx);
        self.store.persist(&state)?;

        Ok(SavingsTransferResult {
            success: true,
            message: format!("Saved {} bucks", command.amount),
            rejection: None,
            balance: Some(balance),
            savings: Some(savings),
        })
    }

    /// Move bucks from savings back into balance.
    pub fn withdraw_from_savings(
        &self,
        command: WithdrawFromSavingsCommand,
    ) -> Result<SavingsTransferResult> {
        info!(
            "Withdrawing {} from savings for child {}",
            command.amount, command.child_id
        );
        let mut state = self.store.state();
        if command.amount <= 0 {
            return Ok(rejected_transfer(Rejection::InvalidAmount));
        }
        let Some(child) = state.child_mut(&command.child_id) else {
            return Ok(rejected_transfer(Rejection::NotFound));
        };
        if command.amount > child.savings {
            warn!(
                "Withdrawal of {} exceeds savings {} for child {}",
                command.amount, child.savings, command.child_id
            );
            return Ok(rejected_transfer(Rejection::InsufficientSavings));
        }

        child.savings -= command.amount;
        child.balance += command.amount;
        let (balance, savings) = (child.balance, child.savings);
        let tx = self.store.new_transaction(
            &command.child_id,
            TransactionType::SavingsWithdrawal,
            command.amount,
            format!("Moved {} bucks out of savings", command.amount),
        );
        state.transactions.insert(0, tx);
        self.store.persist(&state)?;

        Ok(SavingsTransferResult {
            success: true,
            message: format!("Withdrew {} bucks from savings", command.amount),
            rejection: None,
            balance: Some(balance),
            savings: Some(savings),
        })
    }
}

fn rejected_transfer(rejection: Rejection) -> SavingsTransferResult {
    SavingsTransferResult {
        success: false,
        message: rejection.to_string(),
        rejection: Some(rejection),
        balance: None,
        savings: None,
    }
}
