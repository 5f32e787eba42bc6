use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId},
    order_objects::OrderQueryFilter,
    traits::data_objects::{CapturedPayment, TransitionResult},
};

#[derive(Debug, Clone, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order already exists: {0}")]
    OrderAlreadyExists(OrderId),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}

/// Storage for orders.
///
/// The three `mark_*` methods are the only way order status changes. Each one must resolve the target order and apply
/// its update atomically, and must only write when the current status allows the move (see
/// [`crate::db_types::OrderStatusType::can_transition_to`]). Calling any of them twice with the same arguments leaves
/// the order exactly as the first call did.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order in the `created` state. The gateway id must be unique.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderManagementError>;

    /// Orders matching the filter, oldest first.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError>;

    /// Marks the order matching either the gateway order id or the payment link id as paid and records the payment
    /// details. If both ids match different orders, the order id match wins. Orders that are `created` or already
    /// `paid` are updated; any other status is left alone.
    async fn mark_payment_captured(&self, payment: CapturedPayment)
        -> Result<TransitionResult, OrderManagementError>;

    /// Marks the order whose id is the given payment link id as paid. An existing `paid_at` timestamp is kept.
    async fn mark_link_paid(
        &self,
        order_id: &OrderId,
        paid_at: DateTime<Utc>,
    ) -> Result<TransitionResult, OrderManagementError>;

    /// Marks the order whose id is the given payment link id as expired, if it is still `created`.
    async fn mark_link_expired(&self, order_id: &OrderId) -> Result<TransitionResult, OrderManagementError>;
}
