use std::fmt::Debug;

use chrono::Utc;
use drg_common::INR_CURRENCY_CODE;
use log::*;

use crate::{
    cart::Cart,
    db_types::{ContactDetails, NewOrder, Order, OrderId, OrderStatusType, UserProfile},
    events::{EventProducers, OrderCreatedEvent, OrderExpiredEvent, OrderPaidEvent},
    order_objects::{BookingSummary, CustomerSelection, GatewayEvent, OrderQueryFilter, PlacedOrder, ReconcileOutcome},
    tpe_api::errors::OrderFlowError,
    traits::{CheckoutRequest, CustomerManagement, OrderManagement, PaymentProvider, TransitionResult},
};

/// `OrderFlowApi` drives an order through its life: checkout against the payment gateway, and reconciliation of the
/// gateway's asynchronous notifications.
pub struct OrderFlowApi<B, P> {
    db: B,
    provider: P,
    producers: EventProducers,
}

impl<B, P> Debug for OrderFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, P> OrderFlowApi<B, P> {
    pub fn new(db: B, provider: P, producers: EventProducers) -> Self {
        Self { db, provider, producers }
    }
}

impl<B, P> OrderFlowApi<B, P>
where
    B: OrderManagement + CustomerManagement,
    P: PaymentProvider,
{
    /// Checks out the cart on behalf of `placed_by`.
    ///
    /// Only the first item in the cart is booked, at its effective unit price. The cart and the customer selection
    /// are validated before the gateway is contacted. The cart is cleared only once the gateway has issued a payment
    /// request and the order has been stored; on any failure it is left exactly as it was and no order is recorded.
    pub async fn place_order(
        &self,
        placed_by: &UserProfile,
        cart: &mut Cart,
        selection: Option<CustomerSelection>,
    ) -> Result<PlacedOrder, OrderFlowError> {
        let item = cart.first().cloned().ok_or(OrderFlowError::EmptyCart)?;
        let selection = selection.ok_or(OrderFlowError::NoCustomerSelected)?;
        if cart.len() > 1 {
            info!(
                "🔄️🛒️ Cart for {} has {} items. Only the first ({}) is booked.",
                placed_by.email,
                cart.len(),
                item.product.name
            );
        }
        let (customer_id, contact) = match selection {
            CustomerSelection::SelfBooking => (None, ContactDetails::for_user(placed_by)),
            CustomerSelection::Customer(id) => {
                let customer = self.db.fetch_customer(id).await?.ok_or_else(|| {
                    debug!("🔄️🛒️ {} tried to book for customer #{id}, who does not exist", placed_by.email);
                    OrderFlowError::CustomerNotFound(id)
                })?;
                (Some(customer.id), ContactDetails::for_customer(&customer))
            },
        };
        let request = CheckoutRequest {
            reference: new_reference(),
            amount: item.effective_price(),
            currency: INR_CURRENCY_CODE.to_string(),
            product: item.product.snapshot(),
            contact,
            placed_by: placed_by.email.clone(),
        };
        let reference = request.reference.clone();
        let contact = request.contact.clone();
        let product = request.product.clone();
        let amount = request.amount;
        let gateway_order = self.provider.create_payment_request(request).await.map_err(|e| {
            error!("🔄️🛒️ Payment request {reference} for {} failed. {e}", placed_by.email);
            OrderFlowError::from(e)
        })?;
        debug!("🔄️🛒️ Payment request {reference} issued as {}", gateway_order.order_id);
        let new_order = NewOrder {
            order_id: gateway_order.order_id,
            payment_link_id: gateway_order.payment_link_id,
            payment_url: gateway_order.payment_url.clone(),
            placed_by: placed_by.email.clone(),
            customer_id,
            product,
            contact,
            amount,
            currency: INR_CURRENCY_CODE.to_string(),
        };
        let order = self.db.insert_order(new_order).await.map_err(|e| {
            error!("🔄️🛒️ Payment request {reference} was issued, but the order could not be saved. {e}");
            OrderFlowError::from(e)
        })?;
        cart.clear();
        info!("🔄️🛒️ Order {} placed by {} for {}", order.order_id, order.placed_by, order.amount);
        self.call_order_created_hook(&order).await;
        Ok(PlacedOrder { order, payment_url: gateway_order.payment_url, cart: cart.clone() })
    }

    /// Applies a verified gateway notification to the matching order.
    ///
    /// Duplicate and out-of-order deliveries are harmless: an event that matches the stored state, or that would move
    /// the order backwards, leaves it untouched. Hooks fire only when the order actually changes status.
    pub async fn reconcile(&self, event: GatewayEvent) -> Result<ReconcileOutcome, OrderFlowError> {
        trace!("🔄️💳️ Reconciling {event}");
        let result = match &event {
            GatewayEvent::PaymentCaptured(payment) => self.db.mark_payment_captured(payment.clone()).await?,
            GatewayEvent::PaymentLinkPaid { order_id } => self.db.mark_link_paid(order_id, Utc::now()).await?,
            GatewayEvent::PaymentLinkExpired { order_id } => self.db.mark_link_expired(order_id).await?,
            GatewayEvent::Unrecognised(name) => {
                info!("🔄️💳️ Ignoring gateway event '{name}'");
                return Ok(ReconcileOutcome::Ignored);
            },
        };
        let outcome = match result {
            TransitionResult::Applied { previous, order } => {
                if previous != order.status {
                    info!("🔄️💳️ {event}: order {} moved from {previous} to {}", order.order_id, order.status);
                    self.call_status_hooks(previous, &order).await;
                } else {
                    debug!("🔄️💳️ {event}: payment details for order {} refreshed", order.order_id);
                }
                ReconcileOutcome::Updated(order)
            },
            TransitionResult::Unchanged(order) => {
                debug!("🔄️💳️ {event}: order {} is already {}. Nothing to do.", order.order_id, order.status);
                ReconcileOutcome::NoChange(order)
            },
            TransitionResult::Ignored { order, requested } => {
                warn!(
                    "🔄️💳️ {event}: order {} is {} and cannot move to {requested}. The event was ignored.",
                    order.order_id, order.status
                );
                ReconcileOutcome::NoChange(order)
            },
            TransitionResult::NotFound => {
                warn!("🔄️💳️ {event}: no matching order was found");
                ReconcileOutcome::NotFound
            },
        };
        Ok(outcome)
    }

    /// Every order placed by the given user, oldest first.
    pub async fn orders_for_user(&self, email: &str) -> Result<Vec<Order>, OrderFlowError> {
        let query = OrderQueryFilter::default().with_placed_by(email);
        let orders = self.db.search_orders(query).await?;
        Ok(orders)
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError> {
        let order = self.db.fetch_order_by_order_id(order_id).await?;
        Ok(order)
    }

    pub async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderFlowError> {
        let orders = self.db.search_orders(query).await?;
        Ok(orders)
    }

    pub async fn booking_summary(&self, email: &str) -> Result<BookingSummary, OrderFlowError> {
        let orders = self.orders_for_user(email).await?;
        Ok(BookingSummary::from_orders(&orders))
    }

    async fn call_order_created_hook(&self, order: &Order) {
        for emitter in &self.producers.order_created_producer {
            debug!("🔄️📦️ Notifying order created hook subscribers");
            emitter.publish_event(OrderCreatedEvent::new(order.clone())).await;
        }
    }

    async fn call_status_hooks(&self, previous: OrderStatusType, order: &Order) {
        match order.status {
            OrderStatusType::Paid => {
                for emitter in &self.producers.order_paid_producer {
                    debug!("🔄️📦️ Notifying order paid hook subscribers");
                    emitter.publish_event(OrderPaidEvent::new(order.clone())).await;
                }
            },
            OrderStatusType::Expired => {
                for emitter in &self.producers.order_expired_producer {
                    debug!("🔄️📦️ Notifying order expired hook subscribers");
                    emitter.publish_event(OrderExpiredEvent::new(order.clone(), previous)).await;
                }
            },
            _ => {},
        }
    }
}

/// Our own reference for a payment request. The gateway echoes it back on the payment link.
fn new_reference() -> String {
    format!("drg_{:016x}", rand::random::<u64>())
}
