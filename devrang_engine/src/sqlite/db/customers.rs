use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Customer, CustomerUpdate, NewCustomer},
    traits::CustomerApiError,
};

pub async fn insert_customer(
    customer: NewCustomer,
    conn: &mut SqliteConnection,
) -> Result<Customer, CustomerApiError> {
    let customer: Customer = sqlx::query_as(
        r#"
            INSERT INTO customers (
                name,
                phone,
                email,
                shipping_address,
                dob,
                gotra,
                rating,
                comments,
                created_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(customer.name.unwrap_or_default())
    .bind(customer.phone.unwrap_or_default())
    .bind(customer.email.unwrap_or_default())
    .bind(customer.shipping_address.unwrap_or_default())
    .bind(customer.dob.unwrap_or_default())
    .bind(customer.gotra.unwrap_or_default())
    .bind(customer.rating.unwrap_or_default())
    .bind(customer.comments.unwrap_or_default())
    .bind(customer.created_by)
    .fetch_one(conn)
    .await?;
    debug!("👤️ Customer #{} ({}) created", customer.id, customer.name);
    Ok(customer)
}

pub async fn fetch_customer(id: i64, conn: &mut SqliteConnection) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customers WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_customer_by_phone(
    phone: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Customer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customers WHERE phone = $1 ORDER BY id LIMIT 1")
        .bind(phone)
        .fetch_optional(conn)
        .await
}

/// Newest first
pub async fn fetch_customers(conn: &mut SqliteConnection) -> Result<Vec<Customer>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM customers ORDER BY created_at DESC, id DESC").fetch_all(conn).await
}

pub async fn update_customer(
    id: i64,
    update: CustomerUpdate,
    conn: &mut SqliteConnection,
) -> Result<Customer, CustomerApiError> {
    if update.is_empty() {
        debug!("👤️ No fields to update for customer #{id}. Update request skipped.");
        return fetch_customer(id, conn).await?.ok_or(CustomerApiError::CustomerNotFound(id));
    }
    let mut builder = QueryBuilder::new("UPDATE customers SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(phone) = update.phone {
        set_clause.push("phone = ");
        set_clause.push_bind_unseparated(phone);
    }
    if let Some(email) = update.email {
        set_clause.push("email = ");
        set_clause.push_bind_unseparated(email);
    }
    if let Some(address) = update.shipping_address {
        set_clause.push("shipping_address = ");
        set_clause.push_bind_unseparated(address);
    }
    if let Some(dob) = update.dob {
        set_clause.push("dob = ");
        set_clause.push_bind_unseparated(dob);
    }
    if let Some(gotra) = update.gotra {
        set_clause.push("gotra = ");
        set_clause.push_bind_unseparated(gotra);
    }
    if let Some(rating) = update.rating {
        set_clause.push("rating = ");
        set_clause.push_bind_unseparated(rating);
    }
    if let Some(comments) = update.comments {
        set_clause.push("comments = ");
        set_clause.push_bind_unseparated(comments);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("👤️ Executing query: {}", builder.sql());
    let customer = builder.build_query_as::<Customer>().fetch_optional(conn).await?;
    customer.ok_or(CustomerApiError::CustomerNotFound(id))
}

pub async fn delete_customer(id: i64, conn: &mut SqliteConnection) -> Result<(), CustomerApiError> {
    let result = sqlx::query("DELETE FROM customers WHERE id = $1").bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(CustomerApiError::CustomerNotFound(id));
    }
    debug!("👤️ Customer #{id} deleted");
    Ok(())
}
