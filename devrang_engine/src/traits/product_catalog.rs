use thiserror::Error;

use crate::{
    catalog_objects::ProductQueryFilter,
    db_types::{NewProduct, Product, ProductUpdate},
};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("{0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, CatalogApiError>;

    async fn fetch_product(&self, id: i64) -> Result<Option<Product>, CatalogApiError>;

    async fn fetch_product_by_name(&self, name: &str) -> Result<Option<Product>, CatalogApiError>;

    async fn search_products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError>;

    /// Returns [`CatalogApiError::ProductNotFound`] if there is no such product.
    async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError>;

    /// Returns [`CatalogApiError::ProductNotFound`] if there is no such product.
    async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError>;

    /// Every product that has a stored embedding.
    async fn fetch_products_with_embeddings(&self) -> Result<Vec<Product>, CatalogApiError>;
}
