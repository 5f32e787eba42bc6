//! Validated access to the customer list.
use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Customer, CustomerUpdate, NewCustomer},
    traits::{CustomerApiError, CustomerManagement},
};

const MAX_RATING: i64 = 5;

pub struct CustomerApi<B> {
    db: B,
}

impl<B: Debug> Debug for CustomerApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CustomerApi ({:?})", self.db)
    }
}

impl<B> CustomerApi<B>
where B: CustomerManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Adds a customer on behalf of `created_by`. Name and phone are required. Ratings outside 0..=5 are clamped.
    pub async fn create_customer(
        &self,
        created_by: &str,
        mut customer: NewCustomer,
    ) -> Result<Customer, CustomerApiError> {
        let name = customer.name.take().map(|s| s.trim().to_string()).unwrap_or_default();
        let phone = customer.phone.take().map(|s| s.trim().to_string()).unwrap_or_default();
        if name.is_empty() || phone.is_empty() {
            return Err(CustomerApiError::ValidationError("Name and phone are required".into()));
        }
        customer.name = Some(name);
        customer.phone = Some(phone);
        customer.rating = customer.rating.map(clamp_rating);
        let customer = self.db.insert_customer(customer.created_by(created_by)).await?;
        info!("👤️ {created_by} added customer #{} ({})", customer.id, customer.name);
        Ok(customer)
    }

    pub async fn customers(&self) -> Result<Vec<Customer>, CustomerApiError> {
        self.db.fetch_customers().await
    }

    pub async fn customer(&self, id: i64) -> Result<Option<Customer>, CustomerApiError> {
        self.db.fetch_customer(id).await
    }

    /// Applies a partial update. Name and phone may be changed but not blanked.
    pub async fn update_customer(&self, id: i64, mut update: CustomerUpdate) -> Result<Customer, CustomerApiError> {
        let blank = |v: &Option<String>| v.as_ref().is_some_and(|s| s.trim().is_empty());
        if blank(&update.name) || blank(&update.phone) {
            return Err(CustomerApiError::ValidationError("Name and phone cannot be empty".into()));
        }
        update.rating = update.rating.map(clamp_rating);
        let customer = self.db.update_customer(id, update).await?;
        debug!("👤️ Customer #{id} updated");
        Ok(customer)
    }

    pub async fn delete_customer(&self, id: i64) -> Result<(), CustomerApiError> {
        self.db.delete_customer(id).await?;
        info!("👤️ Customer #{id} deleted");
        Ok(())
    }
}

fn clamp_rating(rating: i64) -> i64 {
    rating.clamp(0, MAX_RATING)
}
