//! Business-rule rejections.
//!
//! Every variant is an expected, recoverable condition surfaced inside
//! result values. None of these travel through the error channel.

use thiserror::Error;

/// Why a mutating operation declined to act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Not found")]
    NotFound,
    #[error("This task is inactive")]
    Inactive,
    #[error("Daily completion cap reached")]
    DailyCapReached,
    #[error("Strike cap already reached for today")]
    StrikeCapReached,
    #[error("Earning is blocked: too many strikes today")]
    StrikesExhausted,
    #[error("The vault cannot cover this")]
    VaultInsufficient,
    #[error("Not enough balance")]
    InsufficientBalance,
    #[error("Not enough savings")]
    InsufficientSavings,
    #[error("Amount must be greater than zero")]
    InvalidAmount,
    #[error("A spend request is already pending")]
    RequestAlreadyPending,
    #[error("The last child profile cannot be deleted")]
    LastChildProtected,
    #[error("Nothing to undo")]
    NothingToUndo,
}
