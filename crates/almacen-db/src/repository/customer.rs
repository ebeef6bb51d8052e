//! # Customer Repository
//!
//! Database operations for the customer directory. Customers are optional
//! on sales (walk-in tickets have none) but required for account reports,
//! so the directory uses the same soft-delete discipline as products.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use almacen_core::Customer;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, document, name, address, phone, email,
                is_active, created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Gets a customer by document number (CUIT/DNI).
    pub async fn get_by_document(&self, document: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, document, name, address, phone, email,
                is_active, created_at, updated_at
            FROM customers
            WHERE document = ?1
            "#,
        )
        .bind(document)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Searches active customers by name or document.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Customer>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching customers");

        if query.is_empty() {
            return self.list(false, limit).await;
        }

        let pattern = format!("%{}%", query);

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT
                id, document, name, address, phone, email,
                is_active, created_at, updated_at
            FROM customers
            WHERE is_active = 1
              AND (name LIKE ?1 OR document LIKE ?1)
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Lists customers, optionally including soft-deleted ones.
    pub async fn list(&self, include_inactive: bool, limit: u32) -> DbResult<Vec<Customer>> {
        let customers = if include_inactive {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT
                    id, document, name, address, phone, email,
                    is_active, created_at, updated_at
                FROM customers
                ORDER BY name
                LIMIT ?1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Customer>(
                r#"
                SELECT
                    id, document, name, address, phone, email,
                    is_active, created_at, updated_at
                FROM customers
                WHERE is_active = 1
                ORDER BY name
                LIMIT ?1
                "#,
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(customers)
    }

    /// Inserts a new customer.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - document already registered
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        debug!(document = %customer.document, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, document, name, address, phone, email,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.document)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing customer.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        debug!(id = %customer.id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                document = ?2,
                name = ?3,
                address = ?4,
                phone = ?5,
                email = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.document)
        .bind(&customer.name)
        .bind(&customer.address)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("customer", &customer.id));
        }

        Ok(())
    }

    /// Soft-deletes a customer. Past sales keep their reference.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting customer");

        self.set_active(id, false).await
    }

    /// Restores a soft-deleted customer.
    pub async fn reactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Reactivating customer");

        self.set_active(id, true).await
    }

    async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers
            SET is_active = ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("customer", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
