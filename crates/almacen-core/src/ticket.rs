//! # Ticket Module
//!
//! The in-memory multi-line ticket assembled during checkout.
//!
//! ## Ticket Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Ticket Operations                                    │
//! │                                                                         │
//! │  Vendor Action           Operation               Ticket Change          │
//! │  ─────────────           ─────────               ─────────────          │
//! │                                                                         │
//! │  Pick product ──────────► add_line() ───────────► lines.push(line)     │
//! │                                                   (or merge quantity)   │
//! │                                                                         │
//! │  Change quantity ───────► set_quantity() ───────► lines[i].qty = n     │
//! │                                                                         │
//! │  Remove line ───────────► remove_line() ────────► lines.remove(i)      │
//! │                                                                         │
//! │  Apply discount ────────► set_discount() ───────► discount = d         │
//! │                                                                         │
//! │  Checkout ──────────────► totals read by the sale transaction          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Line Identity
//! Lines are unique per `(product_id, presentation_id)`. Selling the same
//! product both by unit and by "Pack x6" produces two separate lines, each
//! with its own frozen price.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::{MAX_LINE_QUANTITY, MAX_TICKET_LINES};

/// One line of a ticket.
///
/// ## Design Notes
/// All display and pricing data is frozen into the line when it is added.
/// The checkout transaction writes these snapshots to `sale_items`, so a
/// later catalog edit never rewrites sale history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketLine {
    /// Product ID (UUID)
    pub product_id: String,

    /// Presentation ID when sold as a package, None for base units
    pub presentation_id: Option<String>,

    /// SKU at time of adding (frozen)
    pub sku: String,

    /// Product name at time of adding (frozen)
    pub name: String,

    /// Presentation name at time of adding (frozen)
    pub presentation_name: Option<String>,

    /// Base units per sold unit; 1 when selling loose base units
    pub units_per_presentation: i64,

    /// Quantity on the ticket (presentations, or base units when loose)
    pub quantity: i64,

    /// Price in centavos at time of adding (frozen)
    pub unit_price_centavos: i64,
}

impl TicketLine {
    /// Calculates the line total (unit price × quantity).
    pub fn line_total_centavos(&self) -> i64 {
        self.unit_price_centavos * self.quantity
    }

    /// Base units of stock this line consumes.
    pub fn base_units(&self) -> i64 {
        self.quantity * self.units_per_presentation
    }

    /// Returns the line total as Money.
    pub fn line_total(&self) -> Money {
        Money::from_centavos(self.line_total_centavos())
    }
}

/// The checkout ticket.
///
/// ## Invariants
/// - Lines are unique by `(product_id, presentation_id)`; adding the same
///   pair merges quantities
/// - Quantity must be > 0 (setting qty to 0 removes the line)
/// - Maximum lines: 100
/// - Maximum quantity per line: 999
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ticket {
    /// Lines on the ticket
    pub lines: Vec<TicketLine>,

    /// Absolute discount on the whole ticket, in centavos
    pub discount_centavos: i64,
}

impl Ticket {
    /// Creates a new empty ticket.
    pub fn new() -> Self {
        Ticket {
            lines: Vec::new(),
            discount_centavos: 0,
        }
    }

    /// Adds a line to the ticket or increases quantity if the same
    /// `(product, presentation)` pair is already present.
    pub fn add_line(&mut self, line: TicketLine) -> CoreResult<()> {
        if line.quantity <= 0 || line.quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: line.quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        // Merge with an existing line for the same product/presentation
        if let Some(existing) = self.lines.iter_mut().find(|l| {
            l.product_id == line.product_id && l.presentation_id == line.presentation_id
        }) {
            let new_qty = existing.quantity + line.quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            existing.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_TICKET_LINES {
            return Err(CoreError::TicketTooLarge {
                max: MAX_TICKET_LINES,
            });
        }

        self.lines.push(line);
        Ok(())
    }

    /// Updates the quantity of a line.
    ///
    /// ## Behavior
    /// - If quantity is 0: removes the line
    /// - If the pair is not on the ticket: returns ProductNotFound
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        presentation_id: Option<&str>,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_line(product_id, presentation_id);
        }

        if quantity < 0 || quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        if let Some(line) = self.lines.iter_mut().find(|l| {
            l.product_id == product_id && l.presentation_id.as_deref() == presentation_id
        }) {
            line.quantity = quantity;
            Ok(())
        } else {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        }
    }

    /// Removes a line by product/presentation pair.
    pub fn remove_line(
        &mut self,
        product_id: &str,
        presentation_id: Option<&str>,
    ) -> CoreResult<()> {
        let initial_len = self.lines.len();
        self.lines.retain(|l| {
            !(l.product_id == product_id && l.presentation_id.as_deref() == presentation_id)
        });

        if self.lines.len() == initial_len {
            Err(CoreError::ProductNotFound(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Sets the absolute ticket discount in centavos.
    pub fn set_discount(&mut self, centavos: i64) -> CoreResult<()> {
        if centavos < 0 {
            return Err(CoreError::Validation(
                crate::error::ValidationError::MustBePositive {
                    field: "discount".to_string(),
                },
            ));
        }
        self.discount_centavos = centavos;
        Ok(())
    }

    /// Clears all lines and the discount.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_centavos = 0;
    }

    /// Returns the number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Returns the total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Calculates the subtotal (before discount).
    pub fn subtotal_centavos(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_centavos()).sum()
    }

    /// The discount actually applied: never more than the subtotal.
    pub fn effective_discount_centavos(&self) -> i64 {
        self.discount_centavos.min(self.subtotal_centavos())
    }

    /// Calculates the grand total (subtotal - discount), floored at zero.
    pub fn total_centavos(&self) -> i64 {
        Money::from_centavos(self.subtotal_centavos())
            .saturating_sub(Money::from_centavos(self.discount_centavos))
            .centavos()
    }

    /// Checks if the ticket has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
