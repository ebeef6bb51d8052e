//! # almacen-core: Pure Business Logic for Almacen POS
//!
//! This crate is the **heart** of Almacen POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Almacen POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP Clients (terminal UI)                   │   │
//! │  │    Catalog ──► Ticket ──► Checkout ──► Receipt / Reports       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ REST + JWT                             │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/server (axum)                           │   │
//! │  │    /api/products, /api/sales, /api/reports, ...                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ almacen-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ticket   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │  Ticket   │  │   rules   │  │   │
//! │  │   │   Sale    │  │ centavos  │  │ TicketLine│  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  almacen-db (Database Layer)                    │   │
//! │  │            SQLite queries, migrations, repositories             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, Movement, etc.)
//! - [`money`] - Money type with integer centavo arithmetic (no floating point!)
//! - [`ticket`] - In-memory multi-line ticket with merge and totals
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`tz`] - Argentina (UTC-3) business day helpers
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in centavos (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use almacen_core::money::Money;
//!
//! // Create money from centavos (never from floats!)
//! let price = Money::from_centavos(150000); // $1500.00
//!
//! // A pack of 6 at that price
//! let line_total = price.multiply_quantity(6);
//! assert_eq!(line_total.centavos(), 900000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod ticket;
pub mod types;
pub mod tz;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use almacen_core::Money` instead of
// `use almacen_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use ticket::{Ticket, TicketLine};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single ticket
///
/// ## Business Reason
/// Prevents runaway tickets and ensures reasonable transaction sizes.
pub const MAX_TICKET_LINES: usize = 100;

/// Maximum quantity of a single line in a ticket
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;
