//! Spend item catalog, the request workflow and approval notifications.
//!
//! A request snapshots its item list and total at creation, so later
//! catalog edits never change what was asked for. Balance is debited only
//! on approval; a pending request locks nothing up. Approval re-validates
//! against the current balance and auto-denies a request the balance no
//! longer covers.

use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};
use shared::{
    ApprovedRequestNotification, RequestItem, RequestStatus, SpendItem, SpendRequest,
    TransactionType,
};

use crate::domain::commands::spending::{
    AddSpendItemCommand, AddSpendItemResult, ApproveRequestCommand, CreateSpendRequestCommand,
    CreateSpendRequestResult, DeleteSpendItemCommand, DeleteSpendItemResult, DenyRequestCommand,
    MarkNotificationShownCommand, MarkNotificationShownResult, RespondToRequestResult,
    UpdateSpendItemCommand, UpdateSpendItemResult,
};
use crate::domain::rejection::Rejection;
use crate::domain::store::LedgerStore;

/// Service for the spend catalog and the request/approval workflow.
#[derive(Clone)]
pub struct SpendService {
    store: Arc<LedgerStore>,
}

impl SpendService {
    pub fn new(store: Arc<LedgerStore>) -> Self {
        Self { store }
    }

    /// Add an item to the spend catalog.
    pub fn add_spend_item(&self, command: AddSpendItemCommand) -> Result<AddSpendItemResult> {
        info!("Adding spend item: {}", command.name);
        validate_item_fields(
            &command.name,
            command.unit_cost,
            command.default_quantity,
            command.max_quantity,
        )?;

        let mut state = self.store.state();
        let item = SpendItem {
            id: self.store.next_id("item"),
            name: command.name.trim().to_string(),
            icon: command.icon,
            unit_cost: command.unit_cost,
            default_quantity: command.default_quantity,
            max_quantity: command.max_quantity,
            category: command.category,
        };
        state.spend_items.push(item.clone());
        self.store.persist(&state)?;

        Ok(AddSpendItemResult { item })
    }

    /// Update catalog fields. Requests already made keep their snapshotted
    /// prices.
    pub fn update_spend_item(
        &self,
        command: UpdateSpendItemCommand,
    ) -> Result<UpdateSpendItemResult> {
        info!("Updating spend item: {}", command.item_id);
        if let Some(unit_cost) = command.unit_cost {
            if unit_cost <= 0 {
                return Err(anyhow::anyhow!("Item unit cost must be positive"));
            }
        }
        if let Some(max_quantity) = command.max_quantity {
            if max_quantity == 0 {
                return Err(anyhow::anyhow!("Item max quantity must be positive"));
            }
        }
        if let Some(default_quantity) = command.default_quantity {
            if default_quantity == 0 {
                return Err(anyhow::anyhow!("Item default quantity must be positive"));
            }
        }

        let mut state = self.store.state();
        let Some(item) = state.spend_item_mut(&command.item_id) else {
            warn!("Spend item not found: {}", command.item_id);
            return Ok(UpdateSpendItemResult {
                success: false,
                message: format!("Spend item not found: {}", command.item_id),
                rejection: Some(Rejection::NotFound),
                item: None,
            });
        };
        if let Some(name) = command.name {
            item.name = name.trim().to_string();
        }
        if let Some(icon) = command.icon {
            item.icon = icon;
        }
        if let Some(unit_cost) = command.unit_cost {
            item.unit_cost = unit_cost;
        }
        if let Some(default_quantity) = command.default_quantity {
            item.default_quantity = default_quantity;
        }
        if let Some(max_quantity) = command.max_quantity {
            item.max_quantity = max_quantity;
        }
        if let Some(category) = command.category {
            item.category = category;
        }
        let updated = item.clone();
        self.store.persist(&state)?;

        Ok(UpdateSpendItemResult {
            success: true,
            message: format!("Updated item {}", updated.name),
            rejection: None,
            item: Some(updated),
        })
    }

    /// Remove an item from the catalog.
    pub fn delete_spend_item(
        &self,
        command: DeleteSpendItemCommand,
    ) -> Result<DeleteSpendItemResult> {
        info!("Deleting spend item: {}", command.item_id);
        let mut state = self.store.state();
        let Some(position) = state
            .spend_items
            .iter()
            .position(|i| i.id == command.item_id)
        else {
            return Ok(DeleteSpendItemResult {
                success: false,
                message: format!("Spend item not found: {}", command.item_id),
                rejection: Some(Rejection::NotFound),
            });
        };
        let item = state.spend_items.remove(position);
        self.store.persist(&state)?;
        Ok(DeleteSpendItemResult {
            success: true,
            message: format!("Deleted item {}", item.name),
            rejection: None,
        })
    }

    /// Create a pending spend request. Balance is not debited until
    /// approval; each child may have one pending request at a time.
    pub fn create_spend_request(
        &self,
        command: CreateSpendRequestCommand,
    ) -> Result<CreateSpendRequestResult> {
        info!(
            "Creating spend request for child {} with {} items",
            command.child_id,
            command.items.len()
        );
        let mut state = self.store.state();

        let Some(child) = state.child(&command.child_id) else {
            return Ok(rejected_request(
                Rejection::NotFound,
                format!("Child not found: {}", command.child_id),
            ));
        };
        let balance = child.balance;
        if state
            .pending_requests
            .iter()
            .any(|r| r.child_id == command.child_id)
        {
            return Ok(rejected_request(
                Rejection::RequestAlreadyPending,
                Rejection::RequestAlreadyPending.to_string(),
            ));
        }
        if command.items.is_empty() {
            return Ok(rejected_request(
                Rejection::InvalidAmount,
                "A spend request needs at least one item".to_string(),
            ));
        }

        let mut items = Vec::with_capacity(command.items.len());
        for requested in &command.items {
            let Some(item) = state.spend_item(&requested.item_id) else {
                return Ok(rejected_request(
                    Rejection::NotFound,
                    format!("Spend item not found: {}", requested.item_id),
                ));
            };
            if requested.quantity == 0 || requested.quantity > item.max_quantity {
                return Ok(rejected_request(
                    Rejection::InvalidAmount,
                    format!(
                        "Quantity for {} must be between 1 and {}",
                        item.name, item.max_quantity
                    ),
                ));
            }
            items.push(RequestItem {
                item_id: item.id.clone(),
                name: item.name.clone(),
                icon: item.icon.clone(),
                unit_cost: item.unit_cost,
                quantity: requested.quantity,
            });
        }
        let total_cost: i64 = items
            .iter()
            .map(|i| i.unit_cost * i.quantity as i64)
            .sum();
        if total_cost > balance {
            warn!(
                "Request total {} exceeds balance {} for child {}",
                total_cost, balance, command.child_id
            );
            return Ok(rejected_request(
                Rejection::InsufficientBalance,
                Rejection::InsufficientBalance.to_string(),
            ));
        }

        let request = SpendRequest {
            id: self.store.next_id("req"),
            child_id: command.child_id,
            items,
            total_cost,
            status: RequestStatus::Pending,
            requested_at: self.store.now(),
            responded_at: None,
        };
        state.pending_requests.push(request.clone());
        self.store.persist(&state)?;

        Ok(CreateSpendRequestResult {
            success: true,
            message: format!("Request for {} bucks is waiting for approval", total_cost),
            rejection: None,
            request: Some(request),
        })
    }

    /// Approve a pending request. The total is re-checked against the
    /// current balance; a request that no longer fits is denied instead
    /// of approved.
    pub fn approve_request(&self, command: ApproveRequestCommand) -> Result<RespondToRequestResult> {
        info!("Approving request {}", command.request_id);
        let mut state = self.store.state();
        let Some(position) = state
            .pending_requests
            .iter()
            .position(|r| r.id == command.request_id)
        else {
            return Ok(request_not_found(&command.request_id));
        };
        let mut request = state.pending_requests.remove(position);
        let now = self.store.now();

        let balance = state.child(&request.child_id).map(|c| c.balance);
        let covered = balance.is_some_and(|b| b >= request.total_cost);
        if !covered {
            warn!(
                "Request {} no longer covered (total {}, balance {:?}), denying",
                request.id, request.total_cost, balance
            );
            request.status = RequestStatus::Denied;
            request.responded_at = Some(now);
            state.request_history.insert(0, request.clone());
            self.store.persist(&state)?;
            return Ok(RespondToRequestResult {
                success: false,
                message: "Balance no longer covers this request, so it was denied".to_string(),
                rejection: Some(Rejection::InsufficientBalance),
                request: Some(request),
                auto_denied: true,
            });
        }

        if let Some(child) = state.child_mut(&request.child_id) {
            child.balance -= request.total_cost;
            child.total_spent += request.total_cost;
        }
        state.vault.credit_clamped(request.total_cost);
        let summary = request
            .items
            .iter()
            .map(|i| format!("{} x{}", i.name, i.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        let tx = self.store.new_transaction(
            &request.child_id,
            TransactionType::Spend,
            -request.total_cost,
            format!("Spent {} bucks on {}", request.total_cost, summary),
        );
        state.transactions.insert(0, tx);

        request.status = RequestStatus::Approved;
        request.responded_at = Some(now);
        state.request_history.insert(0, request.clone());
        state.notifications.push(ApprovedRequestNotification {
            id: self.store.next_id("note"),
            request_id: request.id.clone(),
            child_id: request.child_id.clone(),
            total_cost: request.total_cost,
            shown_to_child: false,
        });
        self.store.persist(&state)?;

        Ok(RespondToRequestResult {
            success: true,
            message: format!("Approved {} bucks for {}", request.total_cost, summary),
            rejection: None,
            request: Some(request),
            auto_denied: false,
        })
    }

    /// Deny a pending request. No balances move.
    pub fn deny_request(&self, command: DenyRequestCommand) -> Result<RespondToRequestResult> {
        info!("Denying request {}", command.request_id);
        let mut state = self.store.state();
        let Some(position) = state
            .pending_requests
            .iter()
            .position(|r| r.id == command.request_id)
        else {
            return Ok(request_not_found(&command.request_id));
        };
        let mut request = state.pending_requests.remove(position);
        request.status = RequestStatus::Denied;
        request.responded_at = Some(self.store.now());
        state.request_history.insert(0, request.clone());
        self.store.persist(&state)?;

        Ok(RespondToRequestResult {
            success: true,
            message: "Request denied".to_string(),
            rejection: None,
            request: Some(request),
            auto_denied: false,
        })
    }

    /// Unacknowledged approval confirmations for a child, oldest first.
    /// Delivery is at-least-once: a notification keeps coming back until
    /// it is explicitly marked shown.
    pub fn get_unshown_approved_requests(&self, child_id: &str) -> Vec<ApprovedRequestNotification> {
        self.store
            .snapshot()
            .notifications
            .into_iter()
            .filter(|n| n.child_id == child_id && !n.shown_to_child)
            .collect()
    }

    /// Acknowledge one approval confirmation. The request record itself
    /// is untouched.
    pub fn mark_notification_shown(
        &self,
        command: MarkNotificationShownCommand,
    ) -> Result<MarkNotificationShownResult> {
        let mut state = self.store.state();
        let Some(notification) = state
            .notifications
            .iter_mut()
            .find(|n| n.id == command.notification_id)
        else {
            return Ok(MarkNotificationShownResult {
                success: false,
                message: format!("Notification not found: {}", command.notification_id),
                rejection: Some(Rejection::NotFound),
            });
        };
        notification.shown_to_child = true;
        self.store.persist(&state)?;
        Ok(MarkNotificationShownResult {
            success: true,
            message: "Notification acknowledged".to_string(),
            rejection: None,
        })
    }

    /// All requests still waiting for a parent.
    pub fn list_pending_requests(&self) -> Vec<SpendRequest> {
        self.store.snapshot().pending_requests
    }

    /// Responded requests, newest first.
    pub fn list_request_history(&self) -> Vec<SpendRequest> {
        self.store.snapshot().request_history
    }

    /// The spend catalog.
    pub fn list_spend_items(&self) -> Vec<SpendItem> {
        self.store.snapshot().spend_items
    }
}

fn rejected_request(rejection: Rejection, message: String) -> CreateSpendRequestResult {
    CreateSpendRequestResult {
        success: false,
        message,
        rejection: Some(rejection),
        request: None,
    }
}

fn request_not_found(request_id: &str) -> RespondToRequestResult {
    RespondToRequestResult {
        success: false,
        message: format!("Request not found: {request_id}"),
        rejection: Some(Rejection::NotFound),
        request: None,
        auto_denied: false,
    }
}

fn validate_item_fields(
    name: &str,
    unit_cost: i64,
    default_quantity: u32,
    max_quantity: u32,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(anyhow::anyhow!("Item name cannot be empty"));
    }
    if unit_cost <= 0 {
        return Err(anyhow::anyhow!("Item unit cost must be positive"));
    }
    if max_quantity == 0 {
        return Err(anyhow::anyhow!("Item max quantity must be positive"));
    }
    if default_quantity == 0 || default_quantity > max_quantity {
        return Err(anyhow::anyhow!(
            "Item default quantity must be between 1 and the max quantity"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::LedgerConfig;
    use crate::domain::commands::spending::RequestedItem;
    use crate::ids::SequentialIds;
    use crate::storage::MemoryStorage;
    use chrono::NaiveDate;

    fn setup_test() -> (Arc<LedgerStore>, SpendService, String) {
        let clock = FixedClock::new(
            NaiveDate::from_ymd_opt(2025, 3, 10)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        );
        let store = Arc::new(
            LedgerStore::open(
                Arc::new(MemoryStorage::new()),
                Arc::new(clock),
                Arc::new(SequentialIds::default()),
                LedgerConfig::default(),
            )
            .unwrap(),
        );
        let child_id = store.snapshot().children[0].id.clone();
        // Give the child a spendable balance backed by the vault.
        {
            let mut state = store.state();
            assert!(state.vault.debit(50));
            state.child_mut(&child_id).unwrap().balance = 50;
        }
        (store.clone(), SpendService::new(store), child_id)
    }

    fn add_item(service: &SpendService, name: &str, unit_cost: i64, max_quantity: u32) -> SpendItem {
        service
            .add_spend_item(AddSpendItemCommand {
                name: name.to_string(),
                icon: "🎁".to_string(),
                unit_cost,
                default_quantity: 1,
                max_quantity,
                category: "treats".to_string(),
            })
            .unwrap()
            .item
    }

    fn request_one(
        service: &SpendService,
        child_id: &str,
        item_id: &str,
        quantity: u32,
    ) -> CreateSpendRequestResult {
        service
            .create_spend_request(CreateSpendRequestCommand {
                child_id: child_id.to_string(),
                items: vec![RequestedItem {
                    item_id: item_id.to_string(),
                    quantity,
                }],
            })
            .unwrap()
    }

    #[test]
    fn test_create_request_snapshots_items_and_total() {
        let (_store, service, child_id) = setup_test();
        let item = add_item(&service, "Ice cream", 10, 2);

        let result = request_one(&service, &child_id, &item.id, 2);
        assert!(result.success);
        let request = result.request.unwrap();
        assert_eq!(request.total_cost, 20);
        assert_eq!(request.status, RequestStatus::Pending);

        // A later price hike must not change the request.
        service
            .update_spend_item(UpdateSpendItemCommand {
                item_id: item.id.clone(),
                name: None,
                icon: None,
                unit_cost: Some(99),
                default_quantity: None,
                max_quantity: None,
                category: None,
            })
            .unwrap();
        let pending = service.list_pending_requests();
        assert_eq!(pending[0].total_cost, 20);
        assert_eq!(pending[0].items[0].unit_cost, 10);
    }

    #[test]
    fn test_one_pending_request_per_child() {
        let (_store, service, child_id) = setup_test();
        let item = add_item(&service, "Ice cream", 5, 2);

        assert!(request_one(&service, &child_id, &item.id, 1).success);
        let second = request_one(&service, &child_id, &item.id, 1);
        assert!(!second.success);
        assert_eq!(second.rejection, Some(Rejection::RequestAlreadyPending));
    }

    #[test]
    fn test_request_beyond_balance_is_rejected() {
        let (_store, service, child_id) = setup_test();
        let item = add_item(&service, "Lego set", 60, 1);
        let result = request_one(&service, &child_id, &item.id, 1);
        assert_eq!(result.rejection, Some(Rejection::InsufficientBalance));
    }

    #[test]
    fn test_request_quantity_is_bounded_by_the_item() {
        let (_store, service, child_id) = setup_test();
        let item = add_item(&service, "Screen time", 5, 2);
        let result = request_one(&service, &child_id, &item.id, 3);
        assert_eq!(result.rejection, Some(Rejection::InvalidAmount));
        let result = request_one(&service, &child_id, &item.id, 0);
        assert_eq!(result.rejection, Some(Rejection::InvalidAmount));
    }

    #[test]
    fn test_approval_debits_balance_and_credits_vault() {
        let (store, service, child_id) = setup_test();
        let item = add_item(&service, "Ice cream", 10, 2);
        let request = request_one(&service, &child_id, &item.id, 2)
            .request
            .unwrap();
        // Creation itself holds nothing back.
        assert_eq!(store.snapshot().child(&child_id).unwrap().balance, 50);
        let vault_before = store.snapshot().vault.balance;

        let result = service
            .approve_request(ApproveRequestCommand {
                request_id: request.id.clone(),
            })
            .unwrap();
        assert!(result.success);
        assert!(!result.auto_denied);

        let snapshot = store.snapshot();
        let child = snapshot.child(&child_id).unwrap();
        assert_eq!(child.balance, 30);
        assert_eq!(child.total_spent, 20);
        assert_eq!(snapshot.vault.balance, vault_before + 20);
        assert!(snapshot.pending_requests.is_empty());
        assert_eq!(snapshot.request_history[0].status, RequestStatus::Approved);
        assert!(snapshot.request_history[0].responded_at.is_some());
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.transactions[0].transaction_type, TransactionType::Spend);
        assert_eq!(snapshot.transactions[0].amount, -20);
        // One unseen confirmation for the child.
        let unshown = service.get_unshown_approved_requests(&child_id);
        assert_eq!(unshown.len(), 1);
        assert_eq!(unshown[0].request_id, request.id);
    }

    #[test]
    fn test_stale_request_is_auto_denied() {
        let (store, service, child_id) = setup_test();
        let item = add_item(&service, "Ice cream", 40, 1);
        let request = request_one(&service, &child_id, &item.id, 1)
            .request
            .unwrap();
        // Balance drops after the request was made.
        {
            let mut state = store.state();
            let child = state.child_mut(&child_id).unwrap();
            child.balance = 10;
        }

        let result = service
            .approve_request(ApproveRequestCommand {
                request_id: request.id,
            })
            .unwrap();
        assert!(!result.success);
        assert!(result.auto_denied);
        assert_eq!(result.rejection, Some(Rejection::InsufficientBalance));

        let snapshot = store.snapshot();
        assert!(snapshot.pending_requests.is_empty());
        assert_eq!(snapshot.request_history[0].status, RequestStatus::Denied);
        // Nothing moved and nothing was logged.
        assert_eq!(snapshot.child(&child_id).unwrap().balance, 10);
        assert!(snapshot.transactions.is_empty());
        assert!(service.get_unshown_approved_requests(&child_id).is_empty());
    }

    #[test]
    fn test_deny_moves_nothing() {
        let (store, service, child_id) = setup_test();
        let item = add_item(&service, "Ice cream", 10, 1);
        let request = request_one(&service, &child_id, &item.id, 1)
            .request
            .unwrap();

        let result = service
            .deny_request(DenyRequestCommand {
                request_id: request.id,
            })
            .unwrap();
        assert!(result.success);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.child(&child_id).unwrap().balance, 50);
        assert_eq!(snapshot.request_history[0].status, RequestStatus::Denied);
        assert!(snapshot.transactions.is_empty());

        // A denied request frees the slot for a new one.
        assert!(request_one(&service, &child_id, &item.id, 1).success);
    }

    #[test]
    fn test_responding_to_unknown_request_is_rejected() {
        let (_store, service, _child_id) = setup_test();
        let result = service
            .approve_request(ApproveRequestCommand {
                request_id: "nope".to_string(),
            })
            .unwrap();
        assert_eq!(result.rejection, Some(Rejection::NotFound));
        let result = service
            .deny_request(DenyRequestCommand {
                request_id: "nope".to_string(),
            })
            .unwrap();
        assert_eq!(result.rejection, Some(Rejection::NotFound));
    }

    #[test]
    fn test_notifications_are_delivered_oldest_first_until_acknowledged() {
        let (_store, service, child_id) = setup_test();
        let item = add_item(&service, "Screen time", 5, 4);

        let first = request_one(&service, &child_id, &item.id, 1).request.unwrap();
        service
            .approve_request(ApproveRequestCommand {
                request_id: first.id.clone(),
            })
            .unwrap();
        let second = request_one(&service, &child_id, &item.id, 2).request.unwrap();
        service
            .approve_request(ApproveRequestCommand {
                request_id: second.id.clone(),
            })
            .unwrap();

        let unshown = service.get_unshown_approved_requests(&child_id);
        assert_eq!(unshown.len(), 2);
        assert_eq!(unshown[0].request_id, first.id);
        assert_eq!(unshown[1].request_id, second.id);

        // At-least-once: still there until acknowledged.
        assert_eq!(service.get_unshown_approved_requests(&child_id).len(), 2);

        service
            .mark_notification_shown(MarkNotificationShownCommand {
                notification_id: unshown[0].id.clone(),
            })
            .unwrap();
        let remaining = service.get_unshown_approved_requests(&child_id);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].request_id, second.id);
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let (_store, service, child_id) = setup_test();
        let result = service
            .create_spend_request(CreateSpendRequestCommand {
                child_id,
                items: Vec::new(),
            })
            .unwrap();
        assert_eq!(result.rejection, Some(Rejection::InvalidAmount));
    }
}
