//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In many retail systems:                                                │
//! │    $10.00 / 3 = $3.33 (×3 = $9.99)  → Lost $0.01!                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    1000 centavos / 3 = 333 centavos (×3 = 999 centavos)                │
//! │    We KNOW we lost 1 centavo, and handle it explicitly                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use almacen_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let price = Money::from_centavos(109900); // $1099.00
//!
//! // Arithmetic operations
//! let doubled = price * 2;
//! let total = price + Money::from_centavos(50000);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(1099.0); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in centavos (the smallest peso unit).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds, discounts
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.price_centavos ──┬──► TicketLine.unit_price ──► line_total    │
/// │                           │                                             │
/// │                           └──► Displayed as "$1500.00" on the ticket   │
/// │                                                                         │
/// │  Ticket.subtotal ──► discount ──► Ticket.total ──► Sale.total_centavos │
/// │                                                                         │
/// │  EVERY monetary value in the system flows through this type            │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use almacen_core::money::Money;
    ///
    /// let price = Money::from_centavos(109950); // Represents $1099.50
    /// assert_eq!(price.centavos(), 109950);
    /// ```
    ///
    /// ## Why Centavos?
    /// Using the smallest unit eliminates all floating-point concerns.
    /// The database, calculations, and API all use centavos.
    /// Only display formatting converts to pesos.
    #[inline]
    pub const fn from_centavos(centavos: i64) -> Self {
        Money(centavos)
    }

    /// Creates a Money value from pesos and centavos.
    ///
    /// ## Example
    /// ```rust
    /// use almacen_core::money::Money;
    ///
    /// let price = Money::from_pesos_centavos(1099, 50); // $1099.50
    /// assert_eq!(price.centavos(), 109950);
    ///
    /// let negative = Money::from_pesos_centavos(-5, 50); // -$5.50 (refund)
    /// assert_eq!(negative.centavos(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the peso part should be negative.
    /// `from_pesos_centavos(-5, 50)` = -$5.50, not -$4.50
    #[inline]
    pub const fn from_pesos_centavos(pesos: i64, centavos: i64) -> Self {
        // Handle sign: if pesos is negative, centavos should subtract
        if pesos < 0 {
            Money(pesos * 100 - centavos)
        } else {
            Money(pesos * 100 + centavos)
        }
    }

    /// Returns the value in centavos (smallest currency unit).
    #[inline]
    pub const fn centavos(&self) -> i64 {
        self.0
    }

    /// Returns the whole-peso portion.
    ///
    /// ## Example
    /// ```rust
    /// use almacen_core::money::Money;
    ///
    /// let price = Money::from_centavos(109950);
    /// assert_eq!(price.pesos(), 1099);
    /// ```
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the centavo portion (always 0-99).
    ///
    /// ## Example
    /// ```rust
    /// use almacen_core::money::Money;
    ///
    /// let negative = Money::from_centavos(-550);
    /// assert_eq!(negative.centavos_part(), 50); // Absolute value
    /// ```
    #[inline]
    pub const fn centavos_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use almacen_core::money::Money;
    ///
    /// let unit_price = Money::from_centavos(29900); // $299.00
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.centavos(), 89700); // $897.00
    /// ```
    ///
    /// ## Ticket Workflow
    /// ```text
    /// Product: Yerba 1kg $299.00
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line Total: $897.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (1000 = 10%)
    ///
    /// ## Example
    /// ```rust
    /// use almacen_core::money::Money;
    ///
    /// let subtotal = Money::from_centavos(1000000); // $10000.00
    /// let discounted = subtotal.apply_percentage_discount(1000); // 10% off
    /// assert_eq!(discounted.centavos(), 900000); // $9000.00
    /// ```
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(amount * bps + 5000) / 10000`.
    /// i128 intermediate prevents overflow on large amounts.
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        let discount_amount = (self.0 as i128 * discount_bps as i128 + 5000) / 10000;
        Money::from_centavos(self.0 - discount_amount as i64)
    }

    /// Subtracts without going below zero.
    ///
    /// Used when applying an absolute discount so a ticket total can
    /// never become negative.
    #[inline]
    pub const fn saturating_sub(&self, other: Money) -> Money {
        let result = self.0 - other.0;
        if result < 0 {
            Money(0)
        } else {
            Money(result)
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for receipts and debugging. Thousands separators and
/// localization are left to the consuming surface.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.pesos().abs(), self.centavos_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centavos() {
        let money = Money::from_centavos(109950);
        assert_eq!(money.centavos(), 109950);
        assert_eq!(money.pesos(), 1099);
        assert_eq!(money.centavos_part(), 50);
    }

    #[test]
    fn test_from_pesos_centavos() {
        let money = Money::from_pesos_centavos(1099, 50);
        assert_eq!(money.centavos(), 109950);

        let negative = Money::from_pesos_centavos(-5, 50);
        assert_eq!(negative.centavos(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_centavos(109950)), "$1099.50");
        assert_eq!(format!("{}", Money::from_centavos(50000)), "$500.00");
        assert_eq!(format!("{}", Money::from_centavos(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_centavos(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_centavos(1000);
        let b = Money::from_centavos(500);

        assert_eq!((a + b).centavos(), 1500);
        assert_eq!((a - b).centavos(), 500);
        let result: Money = a * 3;
        assert_eq!(result.centavos(), 3000);
    }

    #[test]
    fn test_percentage_discount() {
        let subtotal = Money::from_centavos(1000000); // $10000.00
        let discounted = subtotal.apply_percentage_discount(1000); // 10%
        assert_eq!(discounted.centavos(), 900000); // $9000.00
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        // $0.05 at 10% = 0.5 centavos, rounds to 1
        let amount = Money::from_centavos(5);
        let discounted = amount.apply_percentage_discount(1000);
        assert_eq!(discounted.centavos(), 4);
    }

    #[test]
    fn test_saturating_sub() {
        let total = Money::from_centavos(500);
        let discount = Money::from_centavos(700);
        assert_eq!(total.saturating_sub(discount).centavos(), 0);

        let small_discount = Money::from_centavos(200);
        assert_eq!(total.saturating_sub(small_discount).centavos(), 300);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_centavos(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_centavos(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_centavos(29900);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.centavos(), 89700);
    }

    /// Verify that $10.00 / 3 × 3 behaves as expected.
    /// This documents the intentional precision loss.
    #[test]
    fn test_division_precision_loss_documented() {
        let ten_pesos = Money::from_centavos(1000);
        let one_third = Money::from_centavos(1000 / 3); // 333 centavos
        let reconstructed: Money = one_third * 3; // 999 centavos

        assert_eq!(reconstructed.centavos(), 999);
        assert_ne!(reconstructed.centavos(), ten_pesos.centavos());

        let lost = ten_pesos - reconstructed;
        assert_eq!(lost.centavos(), 1);
    }
}
