//! # Devrang engine public API
//!
//! The `tpe_api` module exposes the programmatic API for the marketplace. Each API is created by supplying a backend
//! that implements the storage traits it needs, so they can be mixed and matched (or mocked) independently.
//!
//! * [`order_flow_api`] places orders against the payment gateway and reconciles gateway notifications.
//! * [`customer_api`] manages the customer list.
//! * [`catalog_api`] manages the product catalog, cart resolution and similarity search.
//! * [`auth_api`] is the access control gate: sign-in, approval and rejection of users.
//!
//! ```rust,ignore
//! use devrang_engine::{CustomerApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let api = CustomerApi::new(db);
//! let customers = api.customers().await?;
//! ```

pub mod auth_api;
pub mod catalog_api;
pub mod catalog_objects;
pub mod customer_api;
pub mod errors;
pub mod order_flow_api;
pub mod order_objects;
