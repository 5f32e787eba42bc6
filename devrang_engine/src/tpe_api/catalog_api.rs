//! The product catalog: validated admin CRUD, filtered listings and embedding similarity.
use std::{cmp::Ordering, fmt::Debug};

use log::*;

use crate::{
    cart::{Cart, CartLine},
    catalog_objects::{ProductQueryFilter, SimilarProduct},
    db_types::{NewProduct, Product, ProductUpdate},
    traits::{CatalogApiError, ProductCatalog},
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B>
where B: ProductCatalog
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn add_product(&self, product: NewProduct) -> Result<Product, CatalogApiError> {
        if product.name.trim().is_empty() || product.category.trim().is_empty() {
            return Err(CatalogApiError::ValidationError("Name and category are required".into()));
        }
        if !product.price.is_positive() {
            return Err(CatalogApiError::ValidationError(format!("Price must be positive, but was {}", product.price)));
        }
        self.db.insert_product(product).await
    }

    pub async fn product(&self, id: i64) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(id).await
    }

    pub async fn products(&self, query: ProductQueryFilter) -> Result<Vec<Product>, CatalogApiError> {
        self.db.search_products(query).await
    }

    pub async fn update_product(&self, id: i64, update: ProductUpdate) -> Result<Product, CatalogApiError> {
        let blank = |v: &Option<String>| v.as_ref().is_some_and(|s| s.trim().is_empty());
        if blank(&update.name) || blank(&update.category) {
            return Err(CatalogApiError::ValidationError("Name and category cannot be empty".into()));
        }
        if let Some(price) = update.price.filter(|p| !p.is_positive()) {
            return Err(CatalogApiError::ValidationError(format!("Price must be positive, but was {price}")));
        }
        self.db.update_product(id, update).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), CatalogApiError> {
        self.db.delete_product(id).await
    }

    /// Resolves submitted cart lines against the catalog. Every product must exist.
    pub async fn build_cart(&self, lines: &[CartLine]) -> Result<Cart, CatalogApiError> {
        let mut cart = Cart::new();
        for line in lines {
            let product =
                self.db.fetch_product(line.product_id).await?.ok_or(CatalogApiError::ProductNotFound(line.product_id))?;
            let quantity = cart
                .add(product, line.quantity)
                .map_err(|e| CatalogApiError::ValidationError(e.to_string()))?
                .quantity;
            if line.custom_price.is_some() {
                cart.update(line.product_id, quantity, line.custom_price)
                    .map_err(|e| CatalogApiError::ValidationError(e.to_string()))?;
            }
        }
        Ok(cart)
    }

    /// The `limit` products whose embeddings are closest (by cosine similarity) to that of product `id`.
    ///
    /// Products without an embedding, or with an embedding of a different dimension, are skipped.
    pub async fn similar_products(&self, id: i64, limit: usize) -> Result<Vec<SimilarProduct>, CatalogApiError> {
        let product = self.db.fetch_product(id).await?.ok_or(CatalogApiError::ProductNotFound(id))?;
        let Some(target) = product.embedding.as_ref().map(|e| e.0.as_slice()) else {
            return Err(CatalogApiError::ValidationError(format!("Product {id} has no embedding")));
        };
        let candidates = self.db.fetch_products_with_embeddings().await?;
        let mut result = candidates
            .into_iter()
            .filter(|p| p.id != id)
            .filter_map(|p| {
                let score = p.embedding.as_ref().and_then(|e| cosine_similarity(target, &e.0))?;
                Some(SimilarProduct { product: p, score })
            })
            .collect::<Vec<_>>();
        result.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        result.truncate(limit);
        trace!("🛍️ {} products are similar to #{id}", result.len());
        Ok(result)
    }
}

/// `None` when the vectors differ in length or either has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let (dot, norm_a, norm_b) =
        a.iter().zip(b).fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| (dot + x * y, na + x * x, nb + y * y));
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}
