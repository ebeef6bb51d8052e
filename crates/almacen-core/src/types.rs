//! # Domain Types
//!
//! Core domain types used throughout Almacen POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Movement     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  sku (business) │   │  receipt_number │   │  product_id     │       │
//! │  │  name           │   │  status         │   │  kind           │       │
//! │  │  price_centavos │   │  total_centavos │   │  quantity       │       │
//! │  │  current_stock  │   │  business_date  │   │  stock_after    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Presentation   │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  units_per_pres │   │  Completed      │   │  Efectivo       │       │
//! │  │  "Pack x6" = 6  │   │  Cancelled      │   │  Tarjeta        │       │
//! │  └─────────────────┘   └─────────────────┘   │  Transferencia  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (sku, document, receipt_number, etc.) - human-readable
//!
//! ## Wire Representation
//! Enumerations keep the uppercase Spanish values the business has always
//! used on paper: movements are ENTRADA/SALIDA/AJUSTE, payment is
//! EFECTIVO/TARJETA/TRANSFERENCIA. The same strings go to the database.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog. Stock is tracked in base units; presentations
/// convert sold packages into base units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown to the vendor and on the ticket.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// Unit price in centavos (smallest currency unit).
    pub price_centavos: i64,

    /// Cost in centavos (for margin reports).
    pub cost_centavos: Option<i64>,

    /// Current stock level in base units.
    pub current_stock: i64,

    /// Threshold under which the product shows up in low-stock listings.
    pub min_stock: i64,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_centavos(self.price_centavos)
    }

    /// Checks if the product can cover a sale of `base_units`.
    ///
    /// Inactive products cannot be sold at all; active ones need enough
    /// stock for the whole requested amount.
    pub fn can_sell(&self, base_units: i64) -> bool {
        self.is_active && self.current_stock >= base_units
    }

    /// True when stock has fallen to or under the configured minimum.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock
    }
}

// =============================================================================
// Presentation
// =============================================================================

/// A sellable packaging unit of a product ("Pack x6", "Caja x24").
///
/// `units_per_presentation` is the conversion factor into base units:
/// selling 2 of a "Pack x6" moves 12 base units of stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Presentation {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub units_per_presentation: i64,
    /// Price of one presentation in centavos.
    pub price_centavos: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Presentation {
    /// Converts a sold quantity of this presentation into base units.
    #[inline]
    pub fn base_units(&self, quantity: i64) -> i64 {
        quantity * self.units_per_presentation
    }

    /// Returns the presentation price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_centavos(self.price_centavos)
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer identified by CUIT or DNI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: String,
    /// CUIT/DNI - business identifier, unique.
    pub document: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Whether customer is active (soft delete).
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Movement
// =============================================================================

/// The kind of a stock movement.
///
/// Stored and serialized with the uppercase Spanish names used on the
/// printed inventory books: ENTRADA (in), SALIDA (out), AJUSTE (manual).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum MovementType {
    /// Stock entering the store (restock, sale cancellation).
    Entrada,
    /// Stock leaving the store (sale).
    Salida,
    /// Manual correction (count differences, breakage).
    Ajuste,
}

impl MovementType {
    /// The wire/data string for this kind.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "ENTRADA",
            MovementType::Salida => "SALIDA",
            MovementType::Ajuste => "AJUSTE",
        }
    }
}

/// An immutable audit row for one stock change.
///
/// Quantity is in base units: positive for ENTRADA/SALIDA (the kind gives
/// direction), signed for AJUSTE (the correction itself is signed).
/// `stock_after` records the resulting level so the history reads like a
/// ledger without replaying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: String,
    pub product_id: String,
    pub kind: MovementType,
    /// Base units moved. Positive for ENTRADA/SALIDA, signed for AJUSTE.
    pub quantity: i64,
    /// Stock level after this movement was applied.
    pub stock_after: i64,
    /// Free-form reason ("Venta 0001-00000042", "Rotura", ...).
    pub detail: Option<String>,
    /// Set when the movement was produced by a sale or cancellation.
    pub sale_id: Option<String>,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale.
///
/// Sales are created directly as `Completed`; `Cancelled` is the only
/// transition and it is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum SaleStatus {
    /// Sale has been paid and stock was moved.
    Completed,
    /// Sale was cancelled and stock was restored.
    Cancelled,
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Efectivo,
    /// Card payment on external terminal.
    Tarjeta,
    /// Bank transfer.
    Transferencia,
}

impl PaymentMethod {
    /// The wire/data string for this method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "EFECTIVO",
            PaymentMethod::Tarjeta => "TARJETA",
            PaymentMethod::Transferencia => "TRANSFERENCIA",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A sale header. Line items live in [`SaleItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Sequential number, allocated inside the checkout transaction.
    pub ticket_number: i64,
    /// Formatted receipt: point-of-sale code + padded ticket number,
    /// e.g. "0001-00000042".
    pub receipt_number: String,
    pub customer_id: Option<String>,
    pub user_id: String,
    pub payment_method: PaymentMethod,
    pub subtotal_centavos: i64,
    pub discount_centavos: i64,
    pub total_centavos: i64,
    pub status: SaleStatus,
    /// The Argentina (UTC-3) calendar day the sale belongs to.
    pub business_date: NaiveDate,
    pub cancel_reason: Option<String>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_centavos(self.total_centavos)
    }

    /// True when this sale has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Set when the line was sold as a presentation rather than base units.
    pub presentation_id: Option<String>,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Presentation name at time of sale (frozen).
    pub presentation_snapshot: Option<String>,
    /// Units-per-presentation ratio at time of sale (frozen).
    /// Cancellation restores stock with THIS value, not current catalog data.
    pub units_per_presentation: i64,
    /// Quantity sold, in presentations (or base units when no presentation).
    pub quantity: i64,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_centavos: i64,
    /// Line total (unit_price × quantity).
    pub line_total_centavos: i64,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_centavos(self.unit_price_centavos)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_centavos(self.line_total_centavos)
    }

    /// Base units this line moved out of stock.
    #[inline]
    pub fn base_units(&self) -> i64 {
        self.quantity * self.units_per_presentation
    }
}

// =============================================================================
// Checkout Input
// =============================================================================

/// Input for creating a sale. Prices and snapshots are resolved from the
/// catalog inside the checkout transaction, never trusted from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub customer_id: Option<String>,
    pub user_id: String,
    pub payment_method: PaymentMethod,
    /// Absolute discount on the whole ticket, in centavos.
    pub discount_centavos: i64,
    pub lines: Vec<NewSaleLine>,
}

/// One requested line of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleLine {
    pub product_id: String,
    /// When present, quantity counts presentations; otherwise base units.
    pub presentation_id: Option<String>,
    pub quantity: i64,
}

// =============================================================================
// User
// =============================================================================

/// Role of a system user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Full access: catalog edits, adjustments, cancellations, user admin.
    Admin,
    /// Day-to-day selling and read access.
    Vendor,
}

impl UserRole {
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// A system user (operator).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: String,
    /// argon2id PHC string. Never serialized into responses.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_type_wire_form() {
        assert_eq!(MovementType::Entrada.as_str(), "ENTRADA");
        assert_eq!(MovementType::Salida.as_str(), "SALIDA");
        assert_eq!(MovementType::Ajuste.as_str(), "AJUSTE");

        let json = serde_json::to_string(&MovementType::Salida).unwrap();
        assert_eq!(json, "\"SALIDA\"");
    }

    #[test]
    fn test_payment_method_wire_form() {
        let json = serde_json::to_string(&PaymentMethod::Efectivo).unwrap();
        assert_eq!(json, "\"EFECTIVO\"");

        let parsed: PaymentMethod = serde_json::from_str("\"TRANSFERENCIA\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Transferencia);
    }

    #[test]
    fn test_product_can_sell() {
        let product = Product {
            id: "p1".to_string(),
            sku: "YERBA-1KG".to_string(),
            name: "Yerba 1kg".to_string(),
            description: None,
            price_centavos: 150000,
            cost_centavos: None,
            current_stock: 10,
            min_stock: 3,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(product.can_sell(10));
        assert!(!product.can_sell(11));
        assert!(!product.is_low_stock());

        let inactive = Product {
            is_active: false,
            ..product
        };
        assert!(!inactive.can_sell(1));
    }

    #[test]
    fn test_presentation_base_units() {
        let pack = Presentation {
            id: "pr1".to_string(),
            product_id: "p1".to_string(),
            name: "Pack x6".to_string(),
            units_per_presentation: 6,
            price_centavos: 800000,
            is_active: true,
            created_at: Utc::now(),
        };

        assert_eq!(pack.base_units(2), 12);
    }

    #[test]
    fn test_sale_item_base_units() {
        let item = SaleItem {
            id: "i1".to_string(),
            sale_id: "s1".to_string(),
            product_id: "p1".to_string(),
            presentation_id: Some("pr1".to_string()),
            sku_snapshot: "YERBA-1KG".to_string(),
            name_snapshot: "Yerba 1kg".to_string(),
            presentation_snapshot: Some("Pack x6".to_string()),
            units_per_presentation: 6,
            quantity: 3,
            unit_price_centavos: 800000,
            line_total_centavos: 2400000,
        };

        assert_eq!(item.base_units(), 18);
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User {
            id: "u1".to_string(),
            username: "vendedor".to_string(),
            display_name: "Vendedor".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: UserRole::Vendor,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }
}
