use log::{debug, trace};
use sqlx::{types::Json, QueryBuilder, SqliteConnection};

use crate::{
    catalog_objects::{ProductQueryFilter, ProductSort},
    db_types::{NewProduct, Product, ProductUpdate},
    traits::CatalogApiError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, CatalogApiError> {
    let product: Product = sqlx::query_as(
        r#"
            INSERT INTO products (
                name,
                description,
                category,
                brand,
                price,
                story,
                image_url,
                affiliate_link,
                tags,
                occasion,
                recipient,
                embedding
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *;
        "#,
    )
    .bind(product.name)
    .bind(product.description)
    .bind(product.category)
    .bind(product.brand)
    .bind(product.price)
    .bind(product.story)
    .bind(product.image_url)
    .bind(product.affiliate_link)
    .bind(Json(product.tags))
    .bind(Json(product.occasion))
    .bind(product.recipient)
    .bind(product.embedding.map(Json))
    .fetch_one(conn)
    .await?;
    debug!("🛍️ Product #{} ({}) added to the catalog", product.id, product.name);
    Ok(product)
}

pub async fn fetch_product(id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_product_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE name = $1 ORDER BY id LIMIT 1").bind(name).fetch_optional(conn).await
}

pub async fn search_products(
    query: ProductQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM products");
    let has_conditions = query.category.is_some() ||
        query.recipient.is_some() ||
        query.occasion.is_some() ||
        query.search.as_ref().is_some_and(|s| !s.trim().is_empty());
    if has_conditions {
        builder.push(" WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(category) = query.category {
        where_clause.push("category = ");
        where_clause.push_bind_unseparated(category);
    }
    if let Some(recipient) = query.recipient {
        where_clause.push("recipient = ");
        where_clause.push_bind_unseparated(recipient);
    }
    if let Some(occasion) = query.occasion {
        where_clause.push("EXISTS (SELECT 1 FROM json_each(products.occasion) WHERE lower(json_each.value) = lower(");
        where_clause.push_bind_unseparated(occasion);
        where_clause.push_unseparated("))");
    }
    if let Some(term) = query.search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{term}%");
        where_clause.push("(lower(name) LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR lower(brand) LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR lower(description) LIKE ");
        where_clause.push_bind_unseparated(pattern.clone());
        where_clause.push_unseparated(" OR EXISTS (SELECT 1 FROM json_each(products.tags) WHERE lower(json_each.value) LIKE ");
        where_clause.push_bind_unseparated(pattern);
        where_clause.push_unseparated("))");
    }
    let order_by = match query.sort {
        ProductSort::Newest => " ORDER BY created_at DESC, id DESC",
        ProductSort::PriceAsc => " ORDER BY price ASC, id ASC",
        ProductSort::PriceDesc => " ORDER BY price DESC, id ASC",
        ProductSort::Name => " ORDER BY name COLLATE NOCASE ASC, id ASC",
    };
    builder.push(order_by);
    if let Some(limit) = query.limit {
        builder.push(" LIMIT ");
        builder.push_bind(limit);
    }
    trace!("🛍️ Executing query: {}", builder.sql());
    let products = builder.build_query_as::<Product>().fetch_all(conn).await?;
    trace!("🛍️ Result of product search: {} products", products.len());
    Ok(products)
}

pub async fn update_product(
    id: i64,
    update: ProductUpdate,
    conn: &mut SqliteConnection,
) -> Result<Product, CatalogApiError> {
    if update.is_empty() {
        debug!("🛍️ No fields to update for product #{id}. Update request skipped.");
        return fetch_product(id, conn).await?.ok_or(CatalogApiError::ProductNotFound(id));
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.name {
        set_clause.push("name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(category) = update.category {
        set_clause.push("category = ");
        set_clause.push_bind_unseparated(category);
    }
    if let Some(brand) = update.brand {
        set_clause.push("brand = ");
        set_clause.push_bind_unseparated(brand);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(story) = update.story {
        set_clause.push("story = ");
        set_clause.push_bind_unseparated(story);
    }
    if let Some(image_url) = update.image_url {
        set_clause.push("image_url = ");
        set_clause.push_bind_unseparated(image_url);
    }
    if let Some(link) = update.affiliate_link {
        set_clause.push("affiliate_link = ");
        set_clause.push_bind_unseparated(link);
    }
    if let Some(tags) = update.tags {
        set_clause.push("tags = ");
        set_clause.push_bind_unseparated(Json(tags));
    }
    if let Some(occasion) = update.occasion {
        set_clause.push("occasion = ");
        set_clause.push_bind_unseparated(Json(occasion));
    }
    if let Some(recipient) = update.recipient {
        set_clause.push("recipient = ");
        set_clause.push_bind_unseparated(recipient);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🛍️ Executing query: {}", builder.sql());
    let product = builder.build_query_as::<Product>().fetch_optional(conn).await?;
    product.ok_or(CatalogApiError::ProductNotFound(id))
}

pub async fn delete_product(id: i64, conn: &mut SqliteConnection) -> Result<(), CatalogApiError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(CatalogApiError::ProductNotFound(id));
    }
    debug!("🛍️ Product #{id} removed from the catalog");
    Ok(())
}

pub async fn fetch_products_with_embeddings(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM products WHERE embedding IS NOT NULL ORDER BY id").fetch_all(conn).await
}
