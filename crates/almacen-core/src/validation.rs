//! # Validation Module
//!
//! Input validation utilities for Almacen POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP DTO (serde)                                             │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Missing field rejection                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Format checks (empty, length, character set)                      │
//! │  └── Business rule validation                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use almacen_core::validation::{validate_sku, validate_quantity};
//!
//! // Validate SKU before database insert
//! validate_sku("YERBA-1KG").unwrap();
//!
//! // Validate quantity before checkout
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_LINE_QUANTITY, MAX_TICKET_LINES};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Should contain only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use almacen_core::validation::validate_sku;
///
/// assert!(validate_sku("YERBA-1KG").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    // Check for valid characters (alphanumeric, hyphen, underscore)
    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name_field("name", name, 200)
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    validate_name_field("name", name, 200)
}

/// Validates a presentation name ("Pack x6").
pub fn validate_presentation_name(name: &str) -> ValidationResult<()> {
    validate_name_field("name", name, 100)
}

fn validate_name_field(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a customer document (CUIT or DNI).
///
/// ## Rules
/// - Must not be empty
/// - 7 to 13 characters
/// - Digits and hyphens only (CUIT is written 20-12345678-3)
///
/// ## Example
/// ```rust
/// use almacen_core::validation::validate_document;
///
/// assert!(validate_document("20-12345678-3").is_ok()); // CUIT
/// assert!(validate_document("12345678").is_ok());      // DNI
/// assert!(validate_document("not a document").is_err());
/// ```
pub fn validate_document(document: &str) -> ValidationResult<()> {
    let document = document.trim();

    if document.is_empty() {
        return Err(ValidationError::Required {
            field: "document".to_string(),
        });
    }

    if document.len() < 7 {
        return Err(ValidationError::TooShort {
            field: "document".to_string(),
            min: 7,
        });
    }

    if document.len() > 13 {
        return Err(ValidationError::TooLong {
            field: "document".to_string(),
            max: 13,
        });
    }

    if !document.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "document".to_string(),
            reason: "must contain only digits and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a username.
///
/// ## Rules
/// - 3 to 32 characters
/// - Lowercase letters, digits, underscores
pub fn validate_username(username: &str) -> ValidationResult<()> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 32,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only lowercase letters, digits, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a password before hashing.
///
/// ## Rules
/// - At least 8 characters
/// - At most 128 characters (argon2 input bound)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates a cancellation reason.
///
/// ## Rules
/// - Required: every cancellation is audited with a reason
/// - Maximum 500 characters
pub fn validate_cancel_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
///
/// ## Checkout Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Ticket: Add Line                                                       │
/// │                                                                         │
/// │  Vendor enters quantity: 5                                             │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → Proceed with the line                                   │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in centavos.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items, promotions)
///
/// ## Example
/// ```rust
/// use almacen_core::validation::validate_price_centavos;
///
/// assert!(validate_price_centavos(150000).is_ok()); // $1500.00
/// assert!(validate_price_centavos(0).is_ok());      // Free item
/// assert!(validate_price_centavos(-100).is_err());  // Invalid
/// ```
pub fn validate_price_centavos(centavos: i64) -> ValidationResult<()> {
    if centavos < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a discount in centavos.
///
/// ## Rules
/// - Must be non-negative; the ticket clamps it against the subtotal
pub fn validate_discount_centavos(centavos: i64) -> ValidationResult<()> {
    if centavos < 0 {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a presentation's units-per-presentation ratio.
///
/// ## Rules
/// - At least 1 (a presentation of zero base units is meaningless)
/// - At most 10000 (sanity bound for data entry)
pub fn validate_units_per_presentation(units: i64) -> ValidationResult<()> {
    if units < 1 || units > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "units_per_presentation".to_string(),
            min: 1,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates ticket size (number of distinct lines).
///
/// ## Rules
/// - Must not exceed MAX_TICKET_LINES (100)
pub fn validate_ticket_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_TICKET_LINES {
        return Err(ValidationError::OutOfRange {
            field: "ticket lines".to_string(),
            min: 0,
            max: MAX_TICKET_LINES as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Rules
/// - Must be a valid UUID format
/// - 36 characters with hyphens: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
///
/// ## Example
/// ```rust
/// use almacen_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    // Try to parse as UUID
    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_sku() {
        // Valid SKUs
        assert!(validate_sku("YERBA-1KG").is_ok());
        assert!(validate_sku("ABC123").is_ok());
        assert!(validate_sku("producto_1").is_ok());

        // Invalid SKUs
        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Yerba Rosamonte 1kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_document() {
        assert!(validate_document("20-12345678-3").is_ok());
        assert!(validate_document("12345678").is_ok());
        assert!(validate_document("").is_err());
        assert!(validate_document("12345").is_err());
        assert!(validate_document("20-12345678-33333").is_err());
        assert!(validate_document("ABC12345").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("vendedor1").is_ok());
        assert!(validate_username("maria_g").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("Maria").is_err());
        assert!(validate_username("with space").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secreto123").is_ok());
        assert!(validate_password("corto").is_err());
        assert!(validate_password(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_cancel_reason() {
        assert!(validate_cancel_reason("Cliente devolvió la compra").is_ok());
        assert!(validate_cancel_reason("").is_err());
        assert!(validate_cancel_reason("   ").is_err());
        assert!(validate_cancel_reason(&"x".repeat(600)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(100).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_price_centavos() {
        assert!(validate_price_centavos(0).is_ok());
        assert!(validate_price_centavos(150000).is_ok());
        assert!(validate_price_centavos(-100).is_err());
    }

    #[test]
    fn test_validate_units_per_presentation() {
        assert!(validate_units_per_presentation(1).is_ok());
        assert!(validate_units_per_presentation(24).is_ok());
        assert!(validate_units_per_presentation(0).is_err());
        assert!(validate_units_per_presentation(20_000).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("not-a-uuid").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
