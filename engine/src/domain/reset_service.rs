//! The daily reset orchestrator.
//!
//! Called on a timer or poll external to the engine, at least once per
//! cutover. The `last_reset_date` watermark makes the check idempotent:
//! repeated calls inside one cutover window apply the effects at most
//! once, and days missed offline collapse into a single catch-up reset.

use std::sync::Arc;

use anyhow::Result;
use log::info;
use shared::TransactionType;

use crate::domain::commands::reset::DailyResetResult;
use crate::domain::interest::daily_interest;
use crate::domain::reset_policy::{day_key, should_reset};
use crate::domain::store::LedgerStore;

/// Service coordinating the daily cutover.
#[derive(Clone)]
pub struct ResetService {
    store: Arc<LedgerStore>,
}

impl ResetService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Perform the daily reset if one is due; a no-op otherwise.
    ///
    /// Per child: release pending earnings into balance (logged as an
    /// `earn` transaction), apply savings interest (logged when above
    /// zero) and store the fractional carry. Then, once per reset: zero
    /// every task's completion count, drop strikes from prior days and
    /// advance the watermark.
    pub fn check_and_perform_daily_reset(&self) -> Result<DailyResetResult> {
        let now = self.store.now();
        let cutover_hour = self.store.config().cutover_hour;
        let mut state = self.store.state();

        if !should_reset(state.last_reset_date, now, cutover_hour) {
            return Ok(DailyResetResult {
                did_reset: false,
                earnings_deposited: 0,
                interest_earned: 0,
                message: "No reset due".to_string(),
            });
        }

        info!(
            "Performing daily reset (watermark {}, now {})",
            state.last_reset_date, now
        );
        let today = now.date();
        let today_key = day_key(now);
        let mut earnings_deposited = 0;
        let mut interest_earned = 0;
        let mut entries = Vec::new();

        for child in &mut state.children {
            let released = child.pending_earnings;
            if released > 0 {
                child.pending_earnings = 0;
                child.balance += released;
                child.total_earned += released;
                earnings_deposited += released;
                entries.push((
                    child.id.clone(),
                    TransactionType::Earn,
                    released,
                    format!("Deposited {released} bucks of earnings at the daily cutover"),
                ));
            }

            let accrual = daily_interest(child.savings);
            if accrual.whole_units > 0 {
                child.savings += accrual.whole_units;
                interest_earned += accrual.whole_units;
                entries.push((
                    child.id.clone(),
                    TransactionType::Interest,
                    accrual.whole_units,
                    format!("Earned {} bucks of savings interest", accrual.whole_units),
                ));
            }
            child.savings_interest_accrued = accrual.fractional_carry;
            child.last_interest_date = Some(today);
        }
        for (child_id, transaction_type, amount, description) in entries {
            let tx = self
                .store
                .new_transaction(&child_id, transaction_type, amount, description);
            state.transactions.insert(0, tx);
        }

        for task in &mut state.tasks {
            task.completions = 0;
        }
        state.strikes.retain(|s| s.day == today_key);
        state.last_reset_date = today;
        self.store.persist(&state)?;

        info!(
            "Daily reset done: {} bucks deposited, {} bucks interest",
            earnings_deposited, interest_earned
        );
        Ok(DailyResetResult {
            did_reset: true,
            earnings_deposited,
            interest_earned,
            message: format!(
                "Deposited {earnings_deposited} bucks of earnings and {interest_earned} bucks of interest"
            ),
        })
    }
}
