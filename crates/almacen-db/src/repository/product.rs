//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Name/SKU search
//! - CRUD with soft delete and reactivation
//! - Manual stock adjustments (transactional, with audit movement)
//! - Low-stock listing for the dashboard
//!
//! ## Stock Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              current_stock only changes together with a                 │
//! │              movements row, inside one transaction                     │
//! │                                                                         │
//! │  Checkout      ──► stock - qty×units  + SALIDA row   (sale.rs)         │
//! │  Cancellation  ──► stock + qty×units  + ENTRADA row  (sale.rs)         │
//! │  Adjustment    ──► stock + delta      + AJUSTE row   (this file)       │
//! │                                                                         │
//! │  A stock figure you cannot explain from the ledger is a bug.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::movement;
use almacen_core::{CoreError, Movement, MovementType, Product};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// // Search products
/// let results = repo.search("yerba", 20).await?;
///
/// // Get by ID
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name or SKU.
    ///
    /// ## Arguments
    /// * `query` - Search term (can be partial; empty returns active products)
    /// * `limit` - Maximum results to return
    ///
    /// ## Example
    /// ```rust,ignore
    /// let products = repo.search("yerba", 20).await?;
    /// ```
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("%{}%", query);

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND (name LIKE ?1 OR sku LIKE ?1)
            ORDER BY name
            LIMIT ?2
            "#,
        )
        .bind(&pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists active products sorted by name.
    async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products, optionally including soft-deleted ones.
    pub async fn list(&self, include_inactive: bool, limit: u32) -> DbResult<Vec<Product>> {
        if !include_inactive {
            return self.list_active(limit).await;
        }

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU (e.g., "YBR-500").
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            WHERE sku = ?1
            "#,
        )
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(())` - Inserted
    /// * `Err(DbError::UniqueViolation)` - SKU already exists
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_centavos)
        .bind(product.cost_centavos)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates catalog fields of an existing product.
    ///
    /// Stock is deliberately not touched here: `current_stock` only moves
    /// through sales, cancellations and `adjust_stock`, so every change has
    /// a movement row.
    ///
    /// ## Returns
    /// * `Ok(())` - Update successful
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                description = ?4,
                price_centavos = ?5,
                cost_centavos = ?6,
                min_stock = ?7,
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_centavos)
        .bind(product.cost_centavos)
        .bind(product.min_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("product", &product.id));
        }

        Ok(())
    }

    /// Manually adjusts stock by a signed delta, writing an AJUSTE movement
    /// in the same transaction.
    ///
    /// The adjustment may not drive stock below zero. Inactive products can
    /// be adjusted (counting errors on discontinued items still need fixing).
    ///
    /// ## Returns
    /// The product with its stock after the adjustment.
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: i64,
        reason: &str,
        user_id: &str,
    ) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let mut product = product.ok_or_else(|| DbError::not_found("product", id))?;

        let resulting = product.current_stock + delta;
        if resulting < 0 {
            // Dropping tx rolls back; nothing was written yet anyway.
            return Err(CoreError::StockBelowZero {
                sku: product.sku,
                resulting,
            }
            .into());
        }

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?2, updated_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        movement::record_in(
            &mut *tx,
            &Movement {
                id: Uuid::new_v4().to_string(),
                product_id: id.to_string(),
                kind: MovementType::Ajuste,
                quantity: delta,
                stock_after: resulting,
                detail: Some(reason.to_string()),
                sale_id: None,
                user_id: user_id.to_string(),
                created_at: now,
            },
        )
        .await?;

        tx.commit().await?;

        product.current_stock = resulting;
        product.updated_at = now;
        Ok(product)
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Historical sales still reference this product, so rows are never
    /// removed. A soft-deleted product can be restored with [`Self::reactivate`].
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        self.set_active(id, false).await
    }

    /// Restores a soft-deleted product.
    pub async fn reactivate(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Reactivating product");

        self.set_active(id, true).await
    }

    async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products
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
            return Err(DbError::not_found("product", id));
        }

        Ok(())
    }

    /// Lists active products at or below their minimum stock threshold.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, sku, name, description,
                price_centavos, cost_centavos,
                current_stock, min_stock,
                is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND current_stock <= min_stock
            ORDER BY current_stock ASC, name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use almacen_core::MovementType;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_product(sku: &str, name: &str, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            sku: sku.to_string(),
            name: name.to_string(),
            description: None,
            price_centavos: 150_000,
            cost_centavos: Some(95_000),
            current_stock: stock,
            min_stock: 5,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    async fn seed_user(db: &Database, id: &str) {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO users (id, username, display_name, password_hash, role, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, 'x', 'ADMIN', 1, ?4, ?4)
            "#,
        )
        .bind(id)
        .bind(format!("user-{id}"))
        .bind("Test User")
        .bind(now)
        .execute(db.pool())
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("YBR-500", "Yerba Brava 500g", 30);
        repo.insert(&product).await.unwrap();

        let by_id = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(by_id.sku, "YBR-500");
        assert_eq!(by_id.current_stock, 30);

        let by_sku = repo.get_by_sku("YBR-500").await.unwrap().unwrap();
        assert_eq!(by_sku.id, product.id);

        assert!(repo.get_by_sku("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("GAL-001", "Galletitas", 10))
            .await
            .unwrap();

        let err = repo
            .insert(&sample_product("GAL-001", "Otra caja", 5))
            .await
            .unwrap_err();

        match err {
            DbError::UniqueViolation { field, .. } => assert_eq!(field, "sku"),
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_search_matches_name_and_sku() {
        let db = test_db().await;
        let repo = db.products();

        repo.insert(&sample_product("YBR-500", "Yerba Brava 500g", 30))
            .await
            .unwrap();
        repo.insert(&sample_product("AZU-001", "Azucar Ledesma 1kg", 12))
            .await
            .unwrap();

        let by_name = repo.search("yerba", 20).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].sku, "YBR-500");

        let by_sku = repo.search("AZU", 20).await.unwrap();
        assert_eq!(by_sku.len(), 1);

        // Empty query falls back to the active listing.
        let all = repo.search("  ", 20).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_soft_delete_and_reactivate() {
        let db = test_db().await;
        let repo = db.products();

        let product = sample_product("FID-001", "Fideos Matarazzo", 8);
        repo.insert(&product).await.unwrap();

        repo.soft_delete(&product.id).await.unwrap();
        assert!(repo.search("fideos", 10).await.unwrap().is_empty());
        // Still reachable by id for sale history.
        assert!(repo.get_by_id(&product.id).await.unwrap().is_some());
        assert_eq!(repo.list(true, 10).await.unwrap().len(), 1);

        repo.reactivate(&product.id).await.unwrap();
        assert_eq!(repo.search("fideos", 10).await.unwrap().len(), 1);

        let err = repo.soft_delete("missing-id").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_changes_catalog_fields_only() {
        let db = test_db().await;
        let repo = db.products();

        let mut product = sample_product("ARR-001", "Arroz Gallo 1kg", 20);
        repo.insert(&product).await.unwrap();

        product.name = "Arroz Gallo Oro 1kg".to_string();
        product.price_centavos = 180_000;
        product.current_stock = 999; // must be ignored
        repo.update(&product).await.unwrap();

        let stored = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Arroz Gallo Oro 1kg");
        assert_eq!(stored.price_centavos, 180_000);
        assert_eq!(stored.current_stock, 20);
    }

    #[tokio::test]
    async fn test_adjust_stock_writes_movement() {
        let db = test_db().await;
        let repo = db.products();
        seed_user(&db, "u1").await;

        let product = sample_product("LEC-001", "Leche La Serenisima", 10);
        repo.insert(&product).await.unwrap();

        let adjusted = repo
            .adjust_stock(&product.id, -3, "rotura en deposito", "u1")
            .await
            .unwrap();
        assert_eq!(adjusted.current_stock, 7);

        let movements = db
            .movements()
            .list_for_product(&product.id, 10)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].kind, MovementType::Ajuste);
        assert_eq!(movements[0].quantity, -3);
        assert_eq!(movements[0].stock_after, 7);
    }

    #[tokio::test]
    async fn test_adjust_stock_rejects_below_zero() {
        let db = test_db().await;
        let repo = db.products();
        seed_user(&db, "u1").await;

        let product = sample_product("PAN-001", "Pan Lactal", 4);
        repo.insert(&product).await.unwrap();

        let err = repo
            .adjust_stock(&product.id, -10, "conteo", "u1")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::StockBelowZero { resulting: -6, .. })
        ));

        // Nothing changed, nothing logged.
        let stored = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.current_stock, 4);
        assert!(db
            .movements()
            .list_for_product(&product.id, 10)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = test_db().await;
        let repo = db.products();

        let mut low = sample_product("SAL-001", "Sal Fina", 2);
        low.min_stock = 5;
        let mut ok = sample_product("ACE-001", "Aceite Natura", 50);
        ok.min_stock = 10;

        repo.insert(&low).await.unwrap();
        repo.insert(&ok).await.unwrap();

        let listed = repo.low_stock(10).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].sku, "SAL-001");
    }

    #[tokio::test]
    async fn test_count_ignores_inactive() {
        let db = test_db().await;
        let repo = db.products();

        let a = sample_product("A-1", "Producto A", 1);
        let b = sample_product("B-1", "Producto B", 1);
        repo.insert(&a).await.unwrap();
        repo.insert(&b).await.unwrap();
        repo.soft_delete(&b.id).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
    }
}
