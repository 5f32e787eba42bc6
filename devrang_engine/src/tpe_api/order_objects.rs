use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    cart::Cart,
    db_types::{Order, OrderId, OrderStatusType, Paise},
    traits::CapturedPayment,
};

/// Share of settled revenue that is paid out to the user who placed the orders.
pub const PAYOUT_PERCENT: i64 = 70;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub order_id: Option<OrderId>,
    pub placed_by: Option<String>,
    pub customer_id: Option<i64>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<Vec<OrderStatusType>>,
}

impl OrderQueryFilter {
    pub fn with_order_id(mut self, order_id: OrderId) -> Self {
        self.order_id = Some(order_id);
        self
    }

    pub fn with_placed_by<S: Into<String>>(mut self, email: S) -> Self {
        self.placed_by = Some(email.into());
        self
    }

    pub fn with_customer_id(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn with_until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() &&
            self.placed_by.is_none() &&
            self.customer_id.is_none() &&
            self.since.is_none() &&
            self.until.is_none() &&
            self.status.as_ref().map(|s| s.is_empty()).unwrap_or(true)
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "No filters");
        }
        let mut parts = vec![];
        if let Some(id) = &self.order_id {
            parts.push(format!("order_id: {id}"));
        }
        if let Some(email) = &self.placed_by {
            parts.push(format!("placed_by: {email}"));
        }
        if let Some(cid) = self.customer_id {
            parts.push(format!("customer_id: {cid}"));
        }
        if let Some(since) = self.since {
            parts.push(format!("since: {since}"));
        }
        if let Some(until) = self.until {
            parts.push(format!("until: {until}"));
        }
        if let Some(statuses) = &self.status {
            let s = statuses.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(",");
            parts.push(format!("status: [{s}]"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Who an order is being placed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCustomerSelection", into = "RawCustomerSelection")]
pub enum CustomerSelection {
    /// The signed-in user is buying for themselves.
    SelfBooking,
    /// A customer from the customer list, by id.
    Customer(i64),
}

/// Wire form of [`CustomerSelection`]: either the string `"self"` or a customer id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawCustomerSelection {
    Id(i64),
    Word(String),
}

impl TryFrom<RawCustomerSelection> for CustomerSelection {
    type Error = String;

    fn try_from(value: RawCustomerSelection) -> Result<Self, Self::Error> {
        match value {
            RawCustomerSelection::Id(id) => Ok(Self::Customer(id)),
            RawCustomerSelection::Word(w) if w.eq_ignore_ascii_case("self") => Ok(Self::SelfBooking),
            RawCustomerSelection::Word(w) => {
                w.trim().parse::<i64>().map(Self::Customer).map_err(|_| format!("'{w}' is not a valid customer"))
            },
        }
    }
}

impl From<CustomerSelection> for RawCustomerSelection {
    fn from(value: CustomerSelection) -> Self {
        match value {
            CustomerSelection::SelfBooking => RawCustomerSelection::Word("self".into()),
            CustomerSelection::Customer(id) => RawCustomerSelection::Id(id),
        }
    }
}

/// The result of a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedOrder {
    pub order: Order,
    /// Where the customer pays
    pub payment_url: String,
    /// The cart after checkout. Always empty.
    pub cart: Cart,
}

/// A payment gateway notification, translated into the terms of the order flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    PaymentCaptured(CapturedPayment),
    PaymentLinkPaid { order_id: OrderId },
    PaymentLinkExpired { order_id: OrderId },
    /// Any event the order flow does not act on. Carries the event name.
    Unrecognised(String),
}

impl Display for GatewayEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayEvent::PaymentCaptured(p) => write!(f, "PaymentCaptured({})", p.payment_id),
            GatewayEvent::PaymentLinkPaid { order_id } => write!(f, "PaymentLinkPaid({order_id})"),
            GatewayEvent::PaymentLinkExpired { order_id } => write!(f, "PaymentLinkExpired({order_id})"),
            GatewayEvent::Unrecognised(name) => write!(f, "Unrecognised({name})"),
        }
    }
}

/// What reconciling a gateway event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order was updated
    Updated(Order),
    /// The order exists but the event did not change it (duplicate or out-of-order delivery)
    NoChange(Order),
    /// No order matched the event
    NotFound,
    /// The event is not one the order flow acts on
    Ignored,
}

/// Headline numbers for a user's dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    pub total_bookings: i64,
    pub settled_bookings: i64,
    /// Sum of paid and delivered order amounts
    pub total_revenue: Paise,
    /// [`PAYOUT_PERCENT`] of the revenue
    pub pending_payout: Paise,
}

impl BookingSummary {
    pub fn from_orders(orders: &[Order]) -> Self {
        let settled = orders.iter().filter(|o| o.status.is_settled()).collect::<Vec<_>>();
        let total_revenue = settled.iter().map(|o| o.amount).sum::<Paise>();
        Self {
            total_bookings: orders.len() as i64,
            settled_bookings: settled.len() as i64,
            total_revenue,
            pending_payout: total_revenue.percentage(PAYOUT_PERCENT),
        }
    }
}
