//! HTTP API routes.
//!
//! One module per resource; each exposes `router()` returning a
//! `Router<AppState>` that the app router merges. Request DTOs live next
//! to their handlers and deserialize from camelCase JSON.
//!
//! # Structure
//!
//! - [`health`] - liveness probe (no auth)
//! - [`auth`] - login
//! - [`products`] - catalog CRUD, presentations, stock adjustment
//! - [`customers`] - customer CRUD
//! - [`movements`] - stock movement history
//! - [`sales`] - checkout, listing, cancellation, PDF ticket
//! - [`reports`] - dashboard and ranged sales reports
//! - [`users`] - operator management (admin)

pub mod auth;
pub mod customers;
pub mod health;
pub mod movements;
pub mod products;
pub mod reports;
pub mod sales;
pub mod users;
