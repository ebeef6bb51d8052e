//! # Movement Repository
//!
//! The stock movement ledger. Every stock change (sale, cancellation,
//! manual adjustment) leaves exactly one row here, written inside the same
//! transaction that touched `products.current_stock`.
//!
//! Reads are plain pool queries; writes go through [`record_in`] so the
//! sale and product repositories can call it with their open transaction.

use sqlx::sqlite::Sqlite;
use sqlx::{Executor, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use almacen_core::{Movement, MovementType};
use chrono::{DateTime, Utc};

/// Inserts a movement row using the caller's executor.
///
/// Takes `impl Executor` so it runs against the pool or inside an open
/// transaction (`&mut *tx`). The stock update and its ledger row must
/// commit or roll back together.
pub(crate) async fn record_in<'e, E>(executor: E, movement: &Movement) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO movements (
            id, product_id, kind, quantity, stock_after,
            detail, sale_id, user_id, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(movement.kind)
    .bind(movement.quantity)
    .bind(movement.stock_after)
    .bind(&movement.detail)
    .bind(&movement.sale_id)
    .bind(&movement.user_id)
    .bind(movement.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Filters for the movement listing.
///
/// All fields are optional; `limit` caps the page size.
#[derive(Debug, Clone)]
pub struct MovementFilter {
    pub product_id: Option<String>,
    pub kind: Option<MovementType>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: u32,
}

impl Default for MovementFilter {
    fn default() -> Self {
        MovementFilter {
            product_id: None,
            kind: None,
            from: None,
            to: None,
            limit: 100,
        }
    }
}

/// Repository for reading the movement ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement outside any transaction.
    ///
    /// Sales, cancellations and adjustments never use this; their ledger
    /// rows ride the owning transaction via [`record_in`].
    pub async fn record(&self, movement: &Movement) -> DbResult<()> {
        record_in(&self.pool, movement).await
    }

    /// Lists movements newest-first, applying the given filters.
    pub async fn list(&self, filter: &MovementFilter) -> DbResult<Vec<Movement>> {
        debug!(
            product_id = ?filter.product_id,
            kind = ?filter.kind,
            limit = filter.limit,
            "Listing movements"
        );

        let movements = sqlx::query_as::<_, Movement>(
            r#"
            SELECT
                id, product_id, kind, quantity, stock_after,
                detail, sale_id, user_id, created_at
            FROM movements
            WHERE (?1 IS NULL OR product_id = ?1)
              AND (?2 IS NULL OR kind = ?2)
              AND (?3 IS NULL OR created_at >= ?3)
              AND (?4 IS NULL OR created_at < ?4)
            ORDER BY created_at DESC, id DESC
            LIMIT ?5
            "#,
        )
        .bind(&filter.product_id)
        .bind(filter.kind)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists the latest movements for one product.
    pub async fn list_for_product(&self, product_id: &str, limit: u32) -> DbResult<Vec<Movement>> {
        let filter = MovementFilter {
            product_id: Some(product_id.to_string()),
            limit,
            ..Default::default()
        };
        self.list(&filter).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use almacen_core::Product;
    use chrono::Duration;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_user(db: &Database, id: &str) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, display_name, password_hash, role, is_active, created_at, updated_at)
            VALUES (?1, ?2, 'Test User', 'x', 'ADMIN', 1, ?3, ?3)
            "#,
        )
        .bind(id)
        .bind(format!("user-{id}"))
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();
    }

    async fn seed_product(db: &Database, sku: &str) -> String {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: format!("Producto {sku}"),
            description: None,
            price_centavos: 100_000,
            cost_centavos: None,
            current_stock: 50,
            min_stock: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product.id
    }

    fn movement(product_id: &str, kind: MovementType, quantity: i64, at: DateTime<Utc>) -> Movement {
        Movement {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            kind,
            quantity,
            stock_after: 50 + quantity,
            detail: None,
            sale_id: None,
            user_id: "u1".to_string(),
            created_at: at,
        }
    }

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        let product_id = seed_product(&db, "YBR-500").await;

        let now = Utc::now();
        let repo = db.movements();
        repo.record(&movement(&product_id, MovementType::Entrada, 10, now - Duration::minutes(2)))
            .await
            .unwrap();
        repo.record(&movement(&product_id, MovementType::Salida, 4, now))
            .await
            .unwrap();

        let listed = repo.list(&MovementFilter::default()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].kind, MovementType::Salida);
        assert_eq!(listed[1].kind, MovementType::Entrada);
    }

    #[tokio::test]
    async fn test_filter_by_kind_and_product() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        let yerba = seed_product(&db, "YBR-500").await;
        let azucar = seed_product(&db, "AZU-001").await;

        let now = Utc::now();
        let repo = db.movements();
        repo.record(&movement(&yerba, MovementType::Entrada, 10, now))
            .await
            .unwrap();
        repo.record(&movement(&yerba, MovementType::Ajuste, -1, now))
            .await
            .unwrap();
        repo.record(&movement(&azucar, MovementType::Entrada, 6, now))
            .await
            .unwrap();

        let entradas = repo
            .list(&MovementFilter {
                kind: Some(MovementType::Entrada),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entradas.len(), 2);

        let for_yerba = repo.list_for_product(&yerba, 10).await.unwrap();
        assert_eq!(for_yerba.len(), 2);
        assert!(for_yerba.iter().all(|m| m.product_id == yerba));
    }

    #[tokio::test]
    async fn test_filter_by_date_range() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        let product_id = seed_product(&db, "YBR-500").await;

        let now = Utc::now();
        let repo = db.movements();
        repo.record(&movement(&product_id, MovementType::Entrada, 5, now - Duration::days(3)))
            .await
            .unwrap();
        repo.record(&movement(&product_id, MovementType::Entrada, 7, now))
            .await
            .unwrap();

        let recent = repo
            .list(&MovementFilter {
                from: Some(now - Duration::days(1)),
                to: Some(now + Duration::days(1)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].quantity, 7);
    }

    #[tokio::test]
    async fn test_limit_caps_results() {
        let db = test_db().await;
        seed_user(&db, "u1").await;
        let product_id = seed_product(&db, "YBR-500").await;

        let now = Utc::now();
        let repo = db.movements();
        for i in 0..5 {
            repo.record(&movement(
                &product_id,
                MovementType::Entrada,
                i + 1,
                now - Duration::minutes(i),
            ))
            .await
            .unwrap();
        }

        let limited = repo
            .list(&MovementFilter {
                limit: 3,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 3);
    }
}
