//! # Devrang server
//! This crate hosts the HTTP server for the Devrang marketplace. It is responsible for:
//! * Signing users in with an identity assertion and issuing session tokens.
//! * Keeping approved users out of the marketplace until an admin lets them in.
//! * Serving the customer, catalog, checkout and order APIs on top of [`devrang_engine`].
//! * Receiving Razorpay webhooks and handing the verified events to the order flow.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/auth`: Sign-in. Exchanges an identity assertion for a session token.
//! * `/auth/error`: Where unapproved users are redirected to.
//! * `/session/me`: The caller's own profile, approved or not.
//! * `/api/*`: The marketplace API. Requires a session token and an approved profile.
//! * `/razorpay/webhook`: Payment link and payment events from Razorpay. Requires a valid webhook signature.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
