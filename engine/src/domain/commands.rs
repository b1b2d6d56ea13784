//! Domain-level command and result types.
//!
//! These structs are the engine's operation boundary: the presentation
//! layer builds commands and renders the returned results. Every mutating
//! result carries `success` and `message`; expected business-rule
//! failures additionally carry a [`Rejection`](super::rejection::Rejection)
//! and never travel through the error channel.

pub mod children {
    use shared::Child;

    use crate::domain::rejection::Rejection;

    /// Input for creating a child profile.
    #[derive(Debug, Clone)]
    pub struct CreateChildCommand {
        pub name: String,
        pub avatar: String,
    }

    /// Result of creating a child profile.
    #[derive(Debug, Clone)]
    pub struct CreateChildResult {
        pub child: Child,
    }

    /// Field-by-field update; `None` leaves the field untouched.
    #[derive(Debug, Clone)]
    pub struct UpdateChildCommand {
        pub child_id: String,
        pub name: Option<String>,
        pub avatar: Option<String>,
    }

    /// Result of updating a child profile.
    #[derive(Debug, Clone)]
    pub struct UpdateChildResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        pub child: Option<Child>,
    }

    /// Input for deleting a child profile.
    #[derive(Debug, Clone)]
    pub struct DeleteChildCommand {
        pub child_id: String,
    }

    /// Result of deleting a child profile.
    #[derive(Debug, Clone)]
    pub struct DeleteChildResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        /// Units the deleted profile held, returned to the vault.
        pub returned_to_vault: i64,
    }
}

pub mod tasks {
    use shared::Task;

    use crate::domain::rejection::Rejection;

    /// Input for adding a task to the catalog.
    #[derive(Debug, Clone)]
    pub struct AddTaskCommand {
        pub name: String,
        pub icon: String,
        pub payout: i64,
        pub daily_max: u32,
        pub category: String,
    }

    /// Result of adding a task.
    #[derive(Debug, Clone)]
    pub struct AddTaskResult {
        pub task: Task,
    }

    /// Field-by-field task update; `None` leaves the field untouched.
    #[derive(Debug, Clone)]
    pub struct UpdateTaskCommand {
        pub task_id: String,
        pub name: Option<String>,
        pub icon: Option<String>,
        pub payout: Option<i64>,
        pub daily_max: Option<u32>,
        pub is_active: Option<bool>,
        pub category: Option<String>,
    }

    /// Result of updating a task.
    #[derive(Debug, Clone)]
    pub struct UpdateTaskResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        pub task: Option<Task>,
    }

    /// Input for deleting a task.
    #[derive(Debug, Clone)]
    pub struct DeleteTaskCommand {
        pub task_id: String,
    }

    /// Result of deleting a task.
    #[derive(Debug, Clone)]
    pub struct DeleteTaskResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
    }

    /// Input for recording a task completion.
    #[derive(Debug, Clone)]
    pub struct CompleteTaskCommand {
        pub child_id: String,
        pub task_id: String,
    }

    /// Result of recording a task completion.
    #[derive(Debug, Clone)]
    pub struct CompleteTaskResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        /// The child's pending earnings after the completion.
        pub pending_earnings: Option<i64>,
    }

    /// Input for reversing one task completion.
    #[derive(Debug, Clone)]
    pub struct UndoTaskCompletionCommand {
        pub child_id: String,
        pub task_id: String,
    }

    /// Result of reversing one task completion.
    #[derive(Debug, Clone)]
    pub struct UndoTaskCompletionResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        /// Units credited back to the vault.
        pub restored_to_vault: i64,
    }
}

pub mod strikes {
    use shared::Strike;

    use crate::domain::rejection::Rejection;

    /// Input for recording a strike.
    #[derive(Debug, Clone)]
    pub struct AddStrikeCommand {
        pub child_id: String,
        pub reason: String,
    }

    /// Result of recording a strike.
    #[derive(Debug, Clone)]
    pub struct AddStrikeResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        pub strike: Option<Strike>,
        /// The child's strike count for today after this call.
        pub strikes_today: u32,
        /// Pending earnings forfeited by reaching the cap; zero otherwise.
        pub forfeited: i64,
    }

    /// Input for deleting one strike record.
    #[derive(Debug, Clone)]
    pub struct RemoveStrikeCommand {
        pub strike_id: String,
    }

    /// Result of deleting one strike record.
    #[derive(Debug, Clone)]
    pub struct RemoveStrikeResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
    }

    /// Input for the parent override that clears a child's strikes.
    #[derive(Debug, Clone)]
    pub struct ResetStrikesCommand {
        pub child_id: String,
    }

    /// Result of clearing a child's strikes.
    #[derive(Debug, Clone)]
    pub struct ResetStrikesResult {
        pub cleared: usize,
        pub message: String,
    }
}

pub mod savings {
    use crate::domain::rejection::Rejection;

    /// Input for moving balance into savings.
    #[derive(Debug, Clone)]
    pub struct DepositToSavingsCommand {
        pub child_id: String,
        pub amount: i64,
    }

    /// Input for moving savings back into balance.
    #[derive(Debug, Clone)]
    pub struct WithdrawFromSavingsCommand {
        pub child_id: String,
        pub amount: i64,
    }

    /// Result of a savings transfer in either direction.
    #[derive(Debug, Clone)]
    pub struct SavingsTransferResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        /// The child's balance after the transfer.
        pub balance: Option<i64>,
        /// The child's savings after the transfer.
        pub savings: Option<i64>,
    }
}

pub mod spending {
    use shared::{SpendItem, SpendRequest};

    use crate::domain::rejection::Rejection;

    /// Input for adding a spend item to the catalog.
    #[derive(Debug, Clone)]
    pub struct AddSpendItemCommand {
        pub name: String,
        pub icon: String,
        pub unit_cost: i64,
        pub default_quantity: u32,
        pub max_quantity: u32,
        pub category: String,
    }

    /// Result of adding a spend item.
    #[derive(Debug, Clone)]
    pub struct AddSpendItemResult {
        pub item: SpendItem,
    }

    /// Field-by-field spend item update; `None` leaves the field untouched.
    #[derive(Debug, Clone)]
    pub struct UpdateSpendItemCommand {
        pub item_id: String,
        pub name: Option<String>,
        pub icon: Option<String>,
        pub unit_cost: Option<i64>,
        pub default_quantity: Option<u32>,
        pub max_quantity: Option<u32>,
        pub category: Option<String>,
    }

    /// Result of updating a spend item.
    #[derive(Debug, Clone)]
    pub struct UpdateSpendItemResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        pub item: Option<SpendItem>,
    }

    /// Input for deleting a spend item.
    #[derive(Debug, Clone)]
    pub struct DeleteSpendItemCommand {
        pub item_id: String,
    }

    /// Result of deleting a spend item.
    #[derive(Debug, Clone)]
    pub struct DeleteSpendItemResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
    }

    /// One catalog item and quantity on a new request.
    #[derive(Debug, Clone)]
    pub struct RequestedItem {
        pub item_id: String,
        pub quantity: u32,
    }

    /// Input for creating a spend request.
    #[derive(Debug, Clone)]
    pub struct CreateSpendRequestCommand {
        pub child_id: String,
        pub items: Vec<RequestedItem>,
    }

    /// Result of creating a spend request.
    #[derive(Debug, Clone)]
    pub struct CreateSpendRequestResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        pub request: Option<SpendRequest>,
    }

    /// Input for approving a pending request.
    #[derive(Debug, Clone)]
    pub struct ApproveRequestCommand {
        pub request_id: String,
    }

    /// Input for denying a pending request.
    #[derive(Debug, Clone)]
    pub struct DenyRequestCommand {
        pub request_id: String,
    }

    /// Result of responding to a pending request.
    #[derive(Debug, Clone)]
    pub struct RespondToRequestResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        /// The request in its terminal state.
        pub request: Option<SpendRequest>,
        /// True when an approval was denied instead because the balance no
        /// longer covered the request.
        pub auto_denied: bool,
    }

    /// Input for acknowledging an approval notification.
    #[derive(Debug, Clone)]
    pub struct MarkNotificationShownCommand {
        pub notification_id: String,
    }

    /// Result of acknowledging an approval notification.
    #[derive(Debug, Clone)]
    pub struct MarkNotificationShownResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
    }
}

pub mod reset {
    /// Outcome of a daily reset check. The totals are a reporting
    /// side-channel for caller notification, not engine state.
    #[derive(Debug, Clone)]
    pub struct DailyResetResult {
        pub did_reset: bool,
        /// Pending earnings released into balances, summed across children.
        pub earnings_deposited: i64,
        /// Interest credited to savings, summed across children.
        pub interest_earned: i64,
        pub message: String,
    }
}

pub mod vault {
    use crate::domain::rejection::Rejection;

    /// Input for topping up the vault.
    #[derive(Debug, Clone)]
    pub struct AddToVaultCommand {
        pub amount: i64,
    }

    /// Input for withdrawing from the vault.
    #[derive(Debug, Clone)]
    pub struct RemoveFromVaultCommand {
        pub amount: i64,
    }

    /// Result of a vault adjustment.
    #[derive(Debug, Clone)]
    pub struct VaultAdjustResult {
        pub success: bool,
        pub message: String,
        pub rejection: Option<Rejection>,
        /// The vault balance after the adjustment.
        pub vault_balance: i64,
    }
}

pub mod parental_control {
    /// Input for answering the parent-role challenge.
    #[derive(Debug, Clone)]
    pub struct ValidateParentalControlCommand {
        pub answer: String,
    }

    /// Result of answering the parent-role challenge.
    #[derive(Debug, Clone)]
    pub struct ValidateParentalControlResult {
        pub success: bool,
        pub message: String,
    }
}
