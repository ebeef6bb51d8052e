//! # Presentation Repository
//!
//! Database operations for product presentations (pack sizes).
//!
//! A presentation is a sellable packaging of a product with its own price
//! and a `units_per_presentation` ratio into base stock units. A product
//! can have several ("Pack x6", "Caja x24") next to loose base units.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use almacen_core::Presentation;

/// Repository for presentation database operations.
#[derive(Debug, Clone)]
pub struct PresentationRepository {
    pool: SqlitePool,
}

impl PresentationRepository {
    /// Creates a new PresentationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PresentationRepository { pool }
    }

    /// Gets a presentation by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Presentation>> {
        let presentation = sqlx::query_as::<_, Presentation>(
            r#"
            SELECT
                id, product_id, name, units_per_presentation,
                price_centavos, is_active, created_at
            FROM presentations
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(presentation)
    }

    /// Lists presentations of a product, smallest pack first.
    pub async fn list_for_product(
        &self,
        product_id: &str,
        include_inactive: bool,
    ) -> DbResult<Vec<Presentation>> {
        let presentations = if include_inactive {
            sqlx::query_as::<_, Presentation>(
                r#"
                SELECT
                    id, product_id, name, units_per_presentation,
                    price_centavos, is_active, created_at
                FROM presentations
                WHERE product_id = ?1
                ORDER BY units_per_presentation, name
                "#,
            )
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Presentation>(
                r#"
                SELECT
                    id, product_id, name, units_per_presentation,
                    price_centavos, is_active, created_at
                FROM presentations
                WHERE product_id = ?1 AND is_active = 1
                ORDER BY units_per_presentation, name
                "#,
            )
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(presentations)
    }

    /// Inserts a new presentation.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already used for this product
    /// * `Err(DbError::ForeignKeyViolation)` - product doesn't exist
    pub async fn insert(&self, presentation: &Presentation) -> DbResult<()> {
        debug!(
            product_id = %presentation.product_id,
            name = %presentation.name,
            "Inserting presentation"
        );

        sqlx::query(
            r#"
            INSERT INTO presentations (
                id, product_id, name, units_per_presentation,
                price_centavos, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&presentation.id)
        .bind(&presentation.product_id)
        .bind(&presentation.name)
        .bind(presentation.units_per_presentation)
        .bind(presentation.price_centavos)
        .bind(presentation.is_active)
        .bind(presentation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates name, ratio and price of a presentation.
    ///
    /// Already-sold lines are unaffected: sale items carry their own
    /// frozen `units_per_presentation` and price snapshots.
    pub async fn update(&self, presentation: &Presentation) -> DbResult<()> {
        debug!(id = %presentation.id, "Updating presentation");

        let result = sqlx::query(
            r#"
            UPDATE presentations SET
                name = ?2,
                units_per_presentation = ?3,
                price_centavos = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&presentation.id)
        .bind(&presentation.name)
        .bind(presentation.units_per_presentation)
        .bind(presentation.price_centavos)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("presentation", &presentation.id));
        }

        Ok(())
    }

    /// Soft-deletes a presentation. Sale history keeps its snapshots.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting presentation");

        let result = sqlx::query("UPDATE presentations SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("presentation", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
