use thiserror::Error;

use crate::db_types::{Customer, CustomerUpdate, NewCustomer};

#[derive(Debug, Clone, Error)]
pub enum CustomerApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Customer {0} does not exist")]
    CustomerNotFound(i64),
    #[error("{0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for CustomerApiError {
    fn from(e: sqlx::Error) -> Self {
        CustomerApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait CustomerManagement {
    /// Stores a new customer. Optional fields that are missing are stored as empty strings, and the rating as zero.
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError>;

    async fn fetch_customer(&self, id: i64) -> Result<Option<Customer>, CustomerApiError>;

    async fn fetch_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerApiError>;

    /// All customers, newest first.
    async fn fetch_customers(&self) -> Result<Vec<Customer>, CustomerApiError>;

    /// Applies a partial update. Returns [`CustomerApiError::CustomerNotFound`] if there is no such customer.
    async fn update_customer(&self, id: i64, update: CustomerUpdate) -> Result<Customer, CustomerApiError>;

    /// Returns [`CustomerApiError::CustomerNotFound`] if there is no such customer.
    async fn delete_customer(&self, id: i64) -> Result<(), CustomerApiError>;
}
