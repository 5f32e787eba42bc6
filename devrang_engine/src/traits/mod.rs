//! # Backend interface contracts
//!
//! This module defines the behaviour that storage backends and external services need to expose in order to be
//! driven by the public APIs in [`crate::tpe_api`].
//!
//! * [`OrderManagement`] stores orders and applies the monotonic status transitions driven by gateway events.
//! * [`CustomerManagement`] is the customer list maintained by marketplace users.
//! * [`ProductCatalog`] is the product catalog.
//! * [`ProfileManagement`] holds user profiles, which carry the role and approval flag that the access gate checks.
//! * [`PaymentProvider`] is the seam to the external payment gateway. It is the only trait here that is not
//!   implemented by [`crate::SqliteDatabase`].
mod customer_management;
mod data_objects;
mod order_management;
mod payment_provider;
mod product_catalog;
mod profile_management;

pub use customer_management::{CustomerApiError, CustomerManagement};
pub use data_objects::{CapturedPayment, CheckoutRequest, GatewayOrder, TransitionResult};
pub use order_management::{OrderManagement, OrderManagementError};
pub use payment_provider::{PaymentProvider, PaymentProviderError};
pub use product_catalog::{CatalogApiError, ProductCatalog};
pub use profile_management::{AuthApiError, ProfileManagement};
