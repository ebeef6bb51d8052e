//! # Repository Module
//!
//! Database repository implementations for Almacen POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().search("yerba", 20)                             │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── search(&self, query, limit)                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── insert(&self, product)                                            │
//! │  └── update(&self, product)                                            │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Benefits:                                                              │
//! │  • Clean separation of concerns                                        │
//! │  • Easy to test (in-memory database per test)                          │
//! │  • SQL is isolated in one place                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, search and stock adjustments
//! - [`presentation::PresentationRepository`] - Sale presentations (pack sizes)
//! - [`customer::CustomerRepository`] - Customer directory
//! - [`movement::MovementRepository`] - Stock movement ledger
//! - [`sale::SaleRepository`] - Checkout, cancellation and sales reports
//! - [`user::UserRepository`] - Login accounts

pub mod customer;
pub mod movement;
pub mod presentation;
pub mod product;
pub mod sale;
pub mod user;
