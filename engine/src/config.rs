//! Engine tunables.

/// Limits and policy constants for the ledger engine.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerConfig {
    /// Strikes per day before earning is blocked and pending earnings forfeit.
    pub max_strikes: u32,
    /// Capacity of the vault backing all payouts.
    pub vault_max: i64,
    /// Hour of the local day (0-23) at which the daily reset cutover falls.
    pub cutover_hour: u32,
    /// Question asked when switching into the parent role.
    pub challenge_question: String,
    /// Expected answer. UX friction for small fingers, not an auth boundary.
    pub challenge_answer: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_strikes: 3,
            vault_max: 500,
            cutover_hour: 22,
            challenge_question: "What is 12 x 4?".to_string(),
            challenge_answer: "48".to_string(),
        }
    }
}
