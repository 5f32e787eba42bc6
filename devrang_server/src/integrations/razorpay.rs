//! Glue between the Razorpay client and the order flow.
//!
//! * [`RazorpayProvider`] is the [`PaymentProvider`] the order flow uses at checkout. Every checkout becomes a
//!   payment link, and the link id doubles as the order id.
//! * [`gateway_event`] translates a verified webhook envelope into a [`GatewayEvent`].
//! * [`create_logging_event_handlers`] registers the hooks that record order lifecycle events in the log.
use chrono::{DateTime, Utc};
use devrang_engine::{
    db_types::OrderId,
    events::{EventHandlers, EventHooks, OrderExpiredEvent},
    order_objects::GatewayEvent,
    traits::{CapturedPayment, CheckoutRequest, GatewayOrder, PaymentProvider, PaymentProviderError},
};
use log::*;
use razorpay_tools::{LinkCustomer, NewPaymentLink, RazorpayApi, RazorpayApiError, WebhookEvent, WebhookEventType};
use thiserror::Error;

pub const ORDER_EVENT_BUFFER_SIZE: usize = 25;

#[derive(Clone)]
pub struct RazorpayProvider {
    api: RazorpayApi,
}

impl RazorpayProvider {
    pub fn new(api: RazorpayApi) -> Self {
        Self { api }
    }
}

impl PaymentProvider for RazorpayProvider {
    async fn create_payment_request(&self, request: CheckoutRequest) -> Result<GatewayOrder, PaymentProviderError> {
        let customer = LinkCustomer {
            name: request.contact.name.clone(),
            email: request.contact.email.clone(),
            contact: request.contact.phone.clone(),
        };
        let link = NewPaymentLink::new(request.reference.clone(), request.amount, customer)
            .with_description(request.product.name.as_str())
            .with_notifications(self.api.config().notify_customer)
            .with_note("placed_by", request.placed_by.as_str())
            .with_note("product_id", request.product.id.to_string());
        let link = self.api.create_payment_link(&link).await.map_err(|e| {
            warn!("💳️ Payment link {} could not be created. {e}", request.reference);
            match e {
                RazorpayApiError::QueryError { status, message } => PaymentProviderError::Rejected { status, message },
                RazorpayApiError::InvalidPaymentLink(s) => PaymentProviderError::InvalidRequest(s),
                e => PaymentProviderError::RequestFailed(e.to_string()),
            }
        })?;
        Ok(GatewayOrder {
            order_id: OrderId::from(link.id.as_str()),
            payment_link_id: Some(link.id),
            payment_url: link.short_url,
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("The {event} webhook is missing its {entity} entity")]
pub struct WebhookConversionError {
    pub event: String,
    pub entity: &'static str,
}

/// Translates a webhook envelope into the order flow's terms.
///
/// Events the order flow does not act on become [`GatewayEvent::Unrecognised`]. An event the order flow does act on,
/// but without the entity it needs, is an error.
pub fn gateway_event(event: &WebhookEvent) -> Result<GatewayEvent, WebhookConversionError> {
    let missing = |entity| WebhookConversionError { event: event.event.clone(), entity };
    match event.event_type() {
        WebhookEventType::PaymentCaptured => {
            let payment = event.payment().ok_or_else(|| missing("payment"))?;
            let captured_at = DateTime::<Utc>::from_timestamp(payment.created_at, 0).unwrap_or_else(Utc::now);
            Ok(GatewayEvent::PaymentCaptured(CapturedPayment {
                order_id: payment.order_id.as_deref().map(OrderId::from),
                payment_link_id: payment.payment_link_id().map(String::from),
                payment_id: payment.id.clone(),
                method: payment.method.clone(),
                captured_at,
            }))
        },
        WebhookEventType::PaymentLinkPaid => {
            let link = event.payment_link().ok_or_else(|| missing("payment_link"))?;
            Ok(GatewayEvent::PaymentLinkPaid { order_id: OrderId::from(link.id.as_str()) })
        },
        WebhookEventType::PaymentLinkExpired => {
            let link = event.payment_link().ok_or_else(|| missing("payment_link"))?;
            Ok(GatewayEvent::PaymentLinkExpired { order_id: OrderId::from(link.id.as_str()) })
        },
        WebhookEventType::Other(name) => Ok(GatewayEvent::Unrecognised(name)),
    }
}

/// Hooks that write every order lifecycle event to the log.
pub fn create_logging_event_handlers() -> EventHandlers {
    let mut hooks = EventHooks::default();
    hooks
        .on_order_created(|ev| {
            Box::pin(async move {
                let order = ev.order;
                info!("📬️ Order {} created by {} for {}", order.order_id, order.placed_by, order.amount);
            })
        })
        .on_order_paid(|ev| {
            Box::pin(async move {
                let order = ev.order;
                info!(
                    "📬️ Order {} paid. Payment: {}",
                    order.order_id,
                    order.payment_id.as_deref().unwrap_or("(via payment link)")
                );
            })
        })
        .on_order_expired(|ev| {
            Box::pin(async move {
                let OrderExpiredEvent { order, previous_status } = ev;
                info!("📬️ Order {} expired. It was {previous_status}.", order.order_id);
            })
        });
    EventHandlers::new(ORDER_EVENT_BUFFER_SIZE, hooks)
}
