use thiserror::Error;

use crate::{
    cart::CartError,
    traits::{CustomerApiError, OrderManagementError, PaymentProviderError},
};

/// Everything that can stop a checkout or a webhook reconciliation.
#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("The cart is empty")]
    EmptyCart,
    #[error("No customer was selected for the booking")]
    NoCustomerSelected,
    #[error("Customer {0} does not exist")]
    CustomerNotFound(i64),
    #[error("{0}")]
    InvalidCart(#[from] CartError),
    #[error("Could not create a payment request. {0}")]
    UpstreamError(#[from] PaymentProviderError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl OrderFlowError {
    /// True for errors caused by the caller's input, as opposed to a fault on our side or the gateway's.
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::EmptyCart | Self::NoCustomerSelected | Self::InvalidCart(_))
    }
}

impl From<OrderManagementError> for OrderFlowError {
    fn from(e: OrderManagementError) -> Self {
        Self::DatabaseError(e.to_string())
    }
}

impl From<CustomerApiError> for OrderFlowError {
    fn from(e: CustomerApiError) -> Self {
        match e {
            CustomerApiError::CustomerNotFound(id) => Self::CustomerNotFound(id),
            other => Self::DatabaseError(other.to_string()),
        }
    }
}
