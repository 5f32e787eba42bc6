//! Razorpay tools
//!
//! A thin, typed client for the parts of the Razorpay API that the marketplace needs:
//! * creating payment links ([`RazorpayApi::create_payment_link`]),
//! * the webhook envelope that Razorpay posts back when a payment link is paid or expires ([`WebhookEvent`]),
//! * HMAC-SHA256 signing and verification of webhook bodies ([`signature`]).
//!
//! The crate knows nothing about orders or databases. Callers translate these types into their own domain.
mod api;
mod config;
mod data_objects;
mod error;
pub mod signature;
mod webhook;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{LinkCustomer, LinkNotify, NewPaymentLink, PaymentLink};
pub use error::{gateway_error_message, RazorpayApiError};
pub use webhook::{
    EntityWrapper,
    PaymentEntity,
    PaymentLinkEntity,
    WebhookEvent,
    WebhookEventType,
    WebhookPayload,
    RAZORPAY_SIGNATURE_HEADER,
};
