use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{ContactDetails, Order, OrderId, OrderStatusType, Paise, ProductSnapshot};

/// The outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// The order matched and the update was written. `previous` is the status before the write.
    Applied { previous: OrderStatusType, order: Order },
    /// The order is already in the requested state with the same details. Nothing was written.
    Unchanged(Order),
    /// The order matched, but its current status does not allow the move. Nothing was written.
    Ignored { order: Order, requested: OrderStatusType },
    /// No order matched the lookup.
    NotFound,
}

impl TransitionResult {
    /// The order, if one matched the lookup, in its state after the call.
    pub fn order(&self) -> Option<&Order> {
        match self {
            TransitionResult::Applied { order, .. } => Some(order),
            TransitionResult::Unchanged(order) => Some(order),
            TransitionResult::Ignored { order, .. } => Some(order),
            TransitionResult::NotFound => None,
        }
    }

    /// True if this call moved the order into a new status (as opposed to refreshing details of the current one).
    pub fn changed_status(&self) -> bool {
        matches!(self, TransitionResult::Applied { previous, order } if *previous != order.status)
    }
}

/// Details of a successful capture, as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPayment {
    /// The gateway's order reference for the payment, if any
    pub order_id: Option<OrderId>,
    /// The payment request the payment was made against, if any
    pub payment_link_id: Option<String>,
    pub payment_id: String,
    pub method: Option<String>,
    /// The gateway's own timestamp for the payment
    pub captured_at: DateTime<Utc>,
}

/// Everything the payment gateway needs to issue a payment request for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Our reference for the request. Unique per checkout attempt.
    pub reference: String,
    pub amount: Paise,
    pub currency: String,
    pub product: ProductSnapshot,
    pub contact: ContactDetails,
    pub placed_by: String,
}

/// The gateway's answer to a [`CheckoutRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub order_id: OrderId,
    pub payment_link_id: Option<String>,
    pub payment_url: String,
}
