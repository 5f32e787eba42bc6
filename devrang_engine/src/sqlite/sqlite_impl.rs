//! `SqliteDatabase` is the concrete storage backend for the Devrang engine.
//!
//! It implements every storage trait defined in the [`crate::traits`] module on top of a SQLite connection pool.
use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use sqlx::SqlitePool;

use super::db::{customers, db_url, new_pool, orders, products, profiles};
use crate::{
    catalog_objects::ProductQueryFilter,
    db_types::{
        Customer,
        CustomerUpdate,
        NewCustomer,
        NewOrder,
        NewProduct,
        NewUserProfile,
        Order,
        OrderId,
        Product,
        ProductUpdate,
        UserProfile,
    },
    order_objects::OrderQueryFilter,
    traits::{
        AuthApiError,
        CapturedPayment,
        CatalogApiError,
        CustomerApiError,
        CustomerManagement,
        OrderManagement,
        OrderManagementError,
        ProductCatalog,
        ProfileManagement,
        TransitionResult,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::search_orders(query, &mut conn).await?;
        Ok(result)
    }

    async fn mark_payment_captured(
        &self,
        payment: CapturedPayment,
    ) -> Result<TransitionResult, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::mark_payment_captured(payment, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn mark_link_paid(
        &self,
        order_id: &OrderId,
        paid_at: DateTime<Utc>,
    ) -> Result<TransitionResult, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::mark_link_paid(order_id, paid_at, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }

    async fn mark_link_expired(&self, order_id: &OrderId) -> Result<TransitionResult, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let result = orders::mark_link_expired(order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(result)
    }
}

impl CustomerManagement for SqliteDatabase {
    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, CustomerApiError> {
        let mut tx = self.pool.begin().await?;
        let customer = customers::insert_customer(customer, &mut tx).await?;
        tx.commit().await?;
        Ok(customer)
    }

    async fn fetch_customer(&self, id: i64) -> Result<Option<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer(id, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customer_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let customer = customers::fetch_customer_by_phone(phone, &mut conn).await?;
        Ok(customer)
    }

    async fn fetch_customers(&self) -> Result<Vec<Customer>, CustomerApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = customers::fetch_customers(&mut conn).await?;
        Ok(result)
    }

    async fn update_customer(&self, id: i64, update: CustomerUpdate) -> Result<Customer, CustomerApiError> {
        let mut tx = self.pool.begin().await?;
        let customer = customers::update_customer(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(customer)
    }

    async fn delete_customer(&self, id: i64) -> Result<(), CustomerApiError> {
        let mut tx = self.pool.begin().await?;
        customers::delete_customer(id, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::insert_product(product, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_by_name(name, &mut conn).await?;
        Ok(product)
    }

    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::search_products(query, &mut conn).await?;
        Ok(result)
    }

    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let product = products::update_product(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(product)
    }

    async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        products::delete_product(id, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch_products_with_embeddings(&self) -> Result<Vec<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = products::fetch_products_with_embeddings(&mut conn).await?;
        Ok(result)
    }
}

impl ProfileManagement for SqliteDatabase {
    async fn fetch_profile(&self, email: &str) -> Result<Option<UserProfile>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let profile = profiles::fetch_profile(email, &mut conn).await?;
        Ok(profile)
    }

    async fn create_profile(&self, profile: NewUserProfile) -> Result<UserProfile, AuthApiError> {
        let mut tx = self.pool.begin().await?;
        let profile = profiles::create_profile(profile, &mut tx).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn touch_profile(&self, email: &str) -> Result<UserProfile, AuthApiError> {
        let mut tx = self.pool.begin().await?;
        let profile = profiles::touch_profile(email, &mut tx).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn set_approved(&self, email: &str, approved: bool) -> Result<UserProfile, AuthApiError> {
        let mut tx = self.pool.begin().await?;
        let profile = profiles::set_approved(email, approved, &mut tx).await?;
        tx.commit().await?;
        Ok(profile)
    }

    async fn delete_profile(&self, email: &str) -> Result<(), AuthApiError> {
        let mut tx = self.pool.begin().await?;
        profiles::delete_profile(email, &mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn fetch_pending_profiles(&self) -> Result<Vec<UserProfile>, AuthApiError> {
        let mut conn = self.pool.acquire().await?;
        let result = profiles::fetch_pending_profiles(&mut conn).await?;
        Ok(result)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
