//! The parent-role challenge.
//!
//! A trivial numeric question gates switching into the parent view. This
//! is friction for small fingers, not an authentication boundary; it
//! must never be presented as one. Every attempt is recorded.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use shared::ParentalControlAttempt;

use crate::domain::commands::parental_control::{
    ValidateParentalControlCommand, ValidateParentalControlResult,
};
use crate::domain::store::LedgerStore;

/// Service validating parent-role challenge answers.
#[derive(Clone)]
pub struct ParentalControlService {
    store: Arc<LedgerStore>,
}

/// Aggregate statistics over recorded challenge attempts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentalControlStats {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub failed_attempts: usize,
    pub success_rate: f64,
}

impl ParentalControlService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// The question to show when the parent view is requested.
    pub fn challenge_question(&self) -> String {
        self.store.config().challenge_question.clone()
    }

    /// Check an answer and record the attempt.
    pub fn validate_answer(
        &self,
        command: ValidateParentalControlCommand,
    ) -> Result<ValidateParentalControlResult> {
        let attempted = command.answer.trim();
        info!(
            "Validating parental challenge answer (length: {})",
            attempted.len()
        );
        let is_correct = attempted == self.store.config().challenge_answer.trim();

        let mut state = self.store.state();
        state.parental_attempts.push(ParentalControlAttempt {
            id: self.store.next_id("attempt"),
            attempted_value: attempted.to_string(),
            timestamp: self.store.now(),
            success: is_correct,
        });
        self.store.persist(&state)?;

        Ok(if is_correct {
            info!("Parental challenge passed");
            ValidateParentalControlResult {
                success: true,
                message: "Access granted! Welcome to parent settings.".to_string(),
            }
        } else {
            warn!(
                "Parental challenge failed for answer '{}'",
                sanitize(attempted)
            );
            ValidateParentalControlResult {
                success: false,
                message: "Incorrect answer. Access denied.".to_string(),
            }
        })
    }

    /// Recent attempts, newest first.
    pub fn recent_attempts(&self, limit: Option<usize>) -> Vec<ParentalControlAttempt> {
        let mut attempts = self.store.snapshot().parental_attempts;
        attempts.reverse();
        if let Some(limit) = limit {
            attempts.truncate(limit);
        }
        attempts
    }

    /// Success/failure statistics across all recorded attempts.
    pub fn validation_stats(&self) -> ParentalControlStats {
        let attempts = self.store.snapshot().parental_attempts;
        let total_attempts = attempts.len();
        let successful_attempts = attempts.iter().filter(|a| a.success).count();
        let failed_attempts = total_attempts - successful_attempts;
        let success_rate = if total_attempts > 0 {
            (successful_attempts as f64 / total_attempts as f64) * 100.0
        } else {
            0.0
        };
        ParentalControlStats {
            total_attempts,
            successful_attempts,
            failed_attempts,
            success_rate,
        }
    }
}

/// Truncate an attempted answer for logging.
fn sanitize(attempted: &str) -> String {
    if attempted.chars().count() > 3 {
        let head: String = attempted.chars().take(3).collect();
        format!("{head}...")
    } else {
        "***".to_string()
    }
}
