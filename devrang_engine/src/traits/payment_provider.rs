use thiserror::Error;

use crate::traits::data_objects::{CheckoutRequest, GatewayOrder};

#[derive(Debug, Clone, Error)]
pub enum PaymentProviderError {
    #[error("The payment gateway could not be reached. {0}")]
    RequestFailed(String),
    #[error("The payment gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid payment request. {0}")]
    InvalidRequest(String),
}

/// An external payment gateway that issues payment requests (links) for orders.
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    async fn create_payment_request(&self, request: CheckoutRequest) -> Result<GatewayOrder, PaymentProviderError>;
}
