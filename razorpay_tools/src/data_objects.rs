use std::collections::HashMap;

use drg_common::{Paise, INR_CURRENCY_CODE};
use serde::{Deserialize, Serialize};

/// Customer contact details attached to a payment link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkCustomer {
    pub name: String,
    pub email: String,
    pub contact: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkNotify {
    pub sms: bool,
    pub email: bool,
}

/// Request body for `POST /payment_links`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPaymentLink {
    pub amount: Paise,
    pub currency: String,
    pub accept_partial: bool,
    /// Our own reference for the link. Razorpay enforces uniqueness of this field.
    pub reference_id: String,
    pub description: String,
    pub customer: LinkCustomer,
    pub notify: LinkNotify,
    pub reminder_enable: bool,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub notes: HashMap<String, String>,
}

impl NewPaymentLink {
    pub fn new(reference_id: String, amount: Paise, customer: LinkCustomer) -> Self {
        Self {
            amount,
            currency: INR_CURRENCY_CODE.to_string(),
            accept_partial: false,
            reference_id,
            description: String::default(),
            customer,
            notify: LinkNotify { sms: false, email: false },
            reminder_enable: false,
            notes: HashMap::new(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_notifications(mut self, notify: bool) -> Self {
        self.notify = LinkNotify { sms: notify, email: notify };
        self.reminder_enable = notify;
        self
    }

    pub fn with_note<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.notes.insert(key.into(), value.into());
        self
    }
}

/// The subset of the payment link entity returned by Razorpay that we make use of.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentLink {
    pub id: String,
    pub short_url: String,
    pub status: String,
    pub amount: Paise,
    pub currency: String,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}
