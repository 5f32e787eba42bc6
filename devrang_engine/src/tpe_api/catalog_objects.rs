use serde::{Deserialize, Serialize};

use crate::db_types::{Product, Recipient};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

/// Catalog filters. Every field is optional; an empty filter returns the whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQueryFilter {
    pub category: Option<String>,
    pub recipient: Option<Recipient>,
    pub occasion: Option<String>,
    /// Free-text search over name, brand, description and tags
    pub search: Option<String>,
    #[serde(default)]
    pub sort: ProductSort,
    pub limit: Option<i64>,
}

impl ProductQueryFilter {
    pub fn with_category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_search<S: Into<String>>(mut self, term: S) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn with_occasion<S: Into<String>>(mut self, occasion: S) -> Self {
        self.occasion = Some(occasion.into());
        self
    }

    pub fn sorted_by(mut self, sort: ProductSort) -> Self {
        self.sort = sort;
        self
    }
}

/// A product and its cosine similarity to the product a search started from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarProduct {
    pub product: Product,
    pub score: f32,
}
