//! The checkout cart.
//!
//! A cart is a plain value owned by whoever is assembling an order. It lives only as long as the request (or session)
//! that carries it; nothing here touches storage. [`crate::OrderFlowApi::place_order`] takes the cart by mutable
//! reference and empties it only when an order has actually been placed.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db_types::{Paise, Product};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("Quantity must be at least 1")]
    InvalidQuantity,
    #[error("Price override must be positive, but was {0}")]
    InvalidPrice(Paise),
    #[error("Product {0} is not in the cart")]
    NotInCart(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    /// A negotiated unit price that replaces the catalog price for this order
    pub custom_price: Option<Paise>,
}

impl CartItem {
    /// The unit price that is actually charged.
    pub fn effective_price(&self) -> Paise {
        self.custom_price.unwrap_or(self.product.price)
    }

    pub fn line_total(&self) -> Paise {
        self.effective_price() * i64::from(self.quantity)
    }
}

/// A cart line as a client submits it: product references only. Prices come from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: u32,
    #[serde(default)]
    pub custom_price: Option<Paise>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `quantity` units of a product. Adding a product that is already in the cart increases its quantity.
    pub fn add(&mut self, product: Product, quantity: u32) -> Result<&CartItem, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        let pos = match self.items.iter().position(|i| i.product.id == product.id) {
            Some(pos) => {
                let item = &mut self.items[pos];
                item.quantity = item.quantity.saturating_add(quantity);
                pos
            },
            None => {
                self.items.push(CartItem { product, quantity, custom_price: None });
                self.items.len() - 1
            },
        };
        Ok(&self.items[pos])
    }

    /// Sets the quantity and price override of an item. A quantity of zero removes the item.
    pub fn update(&mut self, product_id: i64, quantity: u32, custom_price: Option<Paise>) -> Result<(), CartError> {
        if let Some(price) = custom_price {
            if !price.is_positive() {
                return Err(CartError::InvalidPrice(price));
            }
        }
        if quantity == 0 {
            return self.remove(product_id);
        }
        let item = self.items.iter_mut().find(|i| i.product.id == product_id).ok_or(CartError::NotInCart(product_id))?;
        item.quantity = quantity;
        item.custom_price = custom_price;
        Ok(())
    }

    pub fn remove(&mut self, product_id: i64) -> Result<(), CartError> {
        let len = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        if self.items.len() == len {
            Err(CartError::NotInCart(product_id))
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn first(&self) -> Option<&CartItem> {
        self.items.first()
    }

    /// Σ (effective unit price × quantity)
    pub fn total(&self) -> Paise {
        self.items.iter().map(CartItem::line_total).sum()
    }
}
