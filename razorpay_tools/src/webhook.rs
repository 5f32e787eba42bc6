use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RAZORPAY_SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

/// The envelope of every webhook call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub account_id: Option<String>,
    pub event: String,
    #[serde(default)]
    pub contains: Vec<String>,
    #[serde(default)]
    pub payload: WebhookPayload,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub payment: Option<EntityWrapper<PaymentEntity>>,
    #[serde(default)]
    pub payment_link: Option<EntityWrapper<PaymentLinkEntity>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    /// Razorpay sends an empty array rather than an empty object when there are no notes, so this is kept loose.
    #[serde(default)]
    pub notes: Value,
    /// Unix epoch, in seconds
    pub created_at: i64,
}

impl PaymentEntity {
    /// The payment link id copied into the payment notes, when the payment was made through a link.
    pub fn payment_link_id(&self) -> Option<&str> {
        self.notes.get("payment_link_id").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLinkEntity {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub short_url: Option<String>,
}

/// The webhook events the marketplace reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEventType {
    PaymentCaptured,
    PaymentLinkPaid,
    PaymentLinkExpired,
    Other(String),
}

impl From<&str> for WebhookEventType {
    fn from(value: &str) -> Self {
        match value {
            "payment.captured" => Self::PaymentCaptured,
            "payment_link.paid" => Self::PaymentLinkPaid,
            "payment_link.expired" => Self::PaymentLinkExpired,
            s => Self::Other(s.to_string()),
        }
    }
}

impl Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PaymentCaptured => write!(f, "payment.captured"),
            Self::PaymentLinkPaid => write!(f, "payment_link.paid"),
            Self::PaymentLinkExpired => write!(f, "payment_link.expired"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

impl WebhookEvent {
    pub fn event_type(&self) -> WebhookEventType {
        WebhookEventType::from(self.event.as_str())
    }

    pub fn payment(&self) -> Option<&PaymentEntity> {
        self.payload.payment.as_ref().map(|w| &w.entity)
    }

    pub fn payment_link(&self) -> Option<&PaymentLinkEntity> {
        self.payload.payment_link.as_ref().map(|w| &w.entity)
    }
}
