//! Devrang Engine
//!
//! The engine holds the business logic of the Devrang marketplace: approved users browse the catalog, keep a
//! customer list, and book products for their customers (or themselves), paying through an external payment gateway.
//! It is independent of the HTTP layer and of any particular gateway.
//!
//! The library is divided into these sections:
//! 1. Domain types ([`db_types`]) and the session [`cart`].
//! 2. Backend contracts ([`traits`]). Storage backends implement these, as does the payment gateway adapter
//!    ([`traits::PaymentProvider`]). [`SqliteDatabase`] implements all of the storage traits.
//! 3. The public API ([`OrderFlowApi`], [`CustomerApi`], [`CatalogApi`], [`AuthApi`]). Each API is created from a
//!    backend that implements the traits it needs.
//!
//! The engine also publishes events when orders are created, paid, or expire. Hooks can be registered for these with
//! [`events::EventHooks`].
pub mod cart;
pub mod db_types;
pub mod events;
mod sqlite;
pub mod traits;
mod tpe_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use sqlite::{db as sqlite_db, SqliteDatabase};
pub use tpe_api::{
    auth_api::{normalise_email, AuthApi, Identity, SignIn},
    catalog_api::{cosine_similarity, CatalogApi},
    catalog_objects,
    customer_api::CustomerApi,
    errors::OrderFlowError,
    order_flow_api::OrderFlowApi,
    order_objects,
};
