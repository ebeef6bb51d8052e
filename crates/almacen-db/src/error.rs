//! # Database Error Types
//!
//! Error handling for the database layer. Wraps sqlx errors with more
//! specific context so callers can tell a missing row from a broken
//! connection, and surfaces the business failures raised inside sale
//! and stock transactions.
//!
//! ## Error Flow
//! ```text
//! sqlx::Error ──► DbError ──► ApiError (apps/server)
//!                    ▲
//!                    │
//! CoreError ─────────┘  (stock checks inside transactions)
//! ```

use almacen_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The requested row does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A UNIQUE constraint rejected the write (duplicate SKU, document,
    /// username or receipt number).
    #[error("duplicate value for {field}: {value}")]
    UniqueViolation { field: String, value: String },

    /// A FOREIGN KEY constraint rejected the write (referenced row missing).
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A business rule failed inside a transaction. The whole transaction
    /// was rolled back; no partial writes remain.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Could not open or reach the database.
    #[error("database connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema migration failed at startup.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// A query failed for a reason we do not special-case.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A transaction could not begin or commit.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// The connection pool timed out handing out a connection.
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Anything else.
    #[error("internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Shorthand for a typed not-found error.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a unique-violation error built by hand, for checks
    /// done before the INSERT reaches SQLite.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when the error means "no such row" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Extracts the column name from a SQLite constraint message.
///
/// SQLite reports violations as `UNIQUE constraint failed: products.sku`;
/// we keep only the column so API messages read `duplicate value for sku`.
fn constraint_column(message: &str, prefix: &str) -> Option<String> {
    let rest = message.strip_prefix(prefix)?.trim();
    let first = rest.split(',').next()?.trim();
    let column = first.rsplit('.').next()?.trim();
    if column.is_empty() {
        None
    } else {
        Some(column.to_string())
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                if let Some(field) = constraint_column(&message, "UNIQUE constraint failed:") {
                    return Self::UniqueViolation {
                        field,
                        value: String::new(),
                    };
                }
                if message.contains("FOREIGN KEY constraint failed") {
                    return Self::ForeignKeyViolation { message };
                }
                Self::QueryFailed(message)
            }
            sqlx::Error::PoolTimedOut => Self::PoolExhausted,
            sqlx::Error::PoolClosed => Self::ConnectionFailed("pool closed".to_string()),
            sqlx::Error::RowNotFound => Self::QueryFailed("row not found".to_string()),
            _ => Self::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        Self::MigrationFailed(err.to_string())
    }
}

/// Convenience alias used by every repository.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_helper_formats_entity_and_id() {
        let err = DbError::not_found("product", "abc-123");
        assert_eq!(err.to_string(), "product not found: abc-123");
        assert!(err.is_not_found());
    }

    #[test]
    fn duplicate_helper_formats_field() {
        let err = DbError::duplicate("sku", "YBR-001");
        assert_eq!(err.to_string(), "duplicate value for sku: YBR-001");
        assert!(!err.is_not_found());
    }

    #[test]
    fn constraint_column_strips_table_prefix() {
        assert_eq!(
            constraint_column(
                "UNIQUE constraint failed: products.sku",
                "UNIQUE constraint failed:"
            ),
            Some("sku".to_string())
        );
        // Composite constraints report several columns; the first wins.
        assert_eq!(
            constraint_column(
                "UNIQUE constraint failed: presentations.product_id, presentations.name",
                "UNIQUE constraint failed:"
            ),
            Some("product_id".to_string())
        );
        assert_eq!(
            constraint_column("something else entirely", "UNIQUE constraint failed:"),
            None
        );
    }

    #[test]
    fn domain_errors_pass_through_unchanged() {
        let err = DbError::from(CoreError::InsufficientStock {
            sku: "GAL-001".to_string(),
            available: 3,
            requested: 12,
        });
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock { .. })
        ));
        assert!(err.to_string().contains("GAL-001"));
    }
}
