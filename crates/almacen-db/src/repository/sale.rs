//! # Sale Repository
//!
//! Checkout, cancellation and sales reporting.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CHECKOUT (one transaction)                                         │
//! │     └── create_sale(NewSale)                                           │
//! │         ├── resolve lines against catalog (prices never client-sent)   │
//! │         ├── check stock per product (abort → nothing written)          │
//! │         ├── allocate next ticket_number                                │
//! │         ├── INSERT sales + sale_items (snapshots)                      │
//! │         ├── UPDATE products.current_stock -= qty × units               │
//! │         └── INSERT one SALIDA movement per line                        │
//! │                                                                         │
//! │  2. (OPTIONAL) CANCEL (one transaction)                                │
//! │     └── cancel_sale(id, reason, user)                                  │
//! │         ├── COMPLETED → CANCELLED (guarded UPDATE, once only)          │
//! │         ├── UPDATE products.current_stock += qty × frozen units        │
//! │         └── INSERT one ENTRADA movement per line                       │
//! │                                                                         │
//! │  There is no draft state: a sale exists only if it fully committed.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Stock restitution on cancel uses the `units_per_presentation` snapshot
//! stored on each item, so editing a presentation after the sale can never
//! corrupt the restore amount.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::movement;
use almacen_core::{
    CoreError, Movement, MovementType, NewSale, Presentation, Product, Sale, SaleItem, SaleStatus,
    Ticket, TicketLine, tz,
};

// =============================================================================
// Result and Filter Types
// =============================================================================

/// A sale header together with its line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Filters for the sale listing. All optional; `limit` caps the page.
#[derive(Debug, Clone)]
pub struct SaleFilter {
    /// Inclusive lower bound on business_date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on business_date.
    pub to: Option<NaiveDate>,
    pub customer_id: Option<String>,
    pub status: Option<SaleStatus>,
    pub limit: u32,
}

impl Default for SaleFilter {
    fn default() -> Self {
        SaleFilter {
            from: None,
            to: None,
            customer_id: None,
            status: None,
            limit: 100,
        }
    }
}

/// One business day on the dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Completed tickets.
    pub tickets: i64,
    /// Gross revenue of completed tickets, centavos.
    pub gross_centavos: i64,
    /// Cancelled tickets on the same day.
    pub cancelled: i64,
}

/// One row of the sales-by-day report.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DayTotal {
    pub date: NaiveDate,
    pub tickets: i64,
    pub total_centavos: i64,
}

/// One row of the top-products report. Units are base units.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub sku: String,
    pub name: String,
    pub units: i64,
    pub total_centavos: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Creates a completed sale in one transaction.
    ///
    /// Prices, names and unit ratios are resolved from the catalog inside
    /// the transaction and frozen into the item rows. Stock is checked per
    /// product across the whole ticket; on any failure the transaction is
    /// dropped and nothing was written.
    ///
    /// ## Arguments
    /// * `input` - Requested lines (product/presentation/quantity only)
    /// * `pos_code` - Point-of-sale code for the receipt number
    ///   (e.g. "0001" → receipt "0001-00000042")
    ///
    /// ## Errors
    /// * `CoreError::EmptyTicket` - no lines
    /// * `CoreError::ProductNotFound` / `InactiveProduct` - bad line
    /// * `CoreError::InsufficientStock` - stock cannot cover the ticket
    pub async fn create_sale(&self, input: NewSale, pos_code: &str) -> DbResult<SaleWithItems> {
        if input.lines.is_empty() {
            return Err(CoreError::EmptyTicket.into());
        }

        debug!(
            lines = input.lines.len(),
            user_id = %input.user_id,
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;

        // Resolve requested lines against the catalog under the same
        // transaction that will write the stock changes.
        let mut catalog: Vec<Product> = Vec::new();
        let mut ticket = Ticket::new();

        for line in &input.lines {
            let product = if let Some(known) = catalog.iter().find(|p| p.id == line.product_id) {
                known.clone()
            } else {
                let fetched = sqlx::query_as::<_, Product>(
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
                .bind(&line.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

                catalog.push(fetched.clone());
                fetched
            };

            if !product.is_active {
                return Err(CoreError::InactiveProduct { sku: product.sku }.into());
            }

            let ticket_line = match &line.presentation_id {
                Some(presentation_id) => {
                    let presentation = sqlx::query_as::<_, Presentation>(
                        r#"
                        SELECT
                            id, product_id, name, units_per_presentation,
                            price_centavos, is_active, created_at
                        FROM presentations
                        WHERE id = ?1 AND product_id = ?2 AND is_active = 1
                        "#,
                    )
                    .bind(presentation_id)
                    .bind(&product.id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| DbError::not_found("presentation", presentation_id))?;

                    TicketLine {
                        product_id: product.id.clone(),
                        presentation_id: Some(presentation.id.clone()),
                        sku: product.sku.clone(),
                        name: product.name.clone(),
                        presentation_name: Some(presentation.name.clone()),
                        units_per_presentation: presentation.units_per_presentation,
                        quantity: line.quantity,
                        unit_price_centavos: presentation.price_centavos,
                    }
                }
                None => TicketLine {
                    product_id: product.id.clone(),
                    presentation_id: None,
                    sku: product.sku.clone(),
                    name: product.name.clone(),
                    presentation_name: None,
                    units_per_presentation: 1,
                    quantity: line.quantity,
                    unit_price_centavos: product.price_centavos,
                },
            };

            ticket.add_line(ticket_line)?;
        }

        ticket.set_discount(input.discount_centavos)?;

        // Stock check per product across the whole ticket: two lines of
        // the same product (loose + pack) draw from the same pool.
        for product in &catalog {
            let required: i64 = ticket
                .lines
                .iter()
                .filter(|l| l.product_id == product.id)
                .map(|l| l.base_units())
                .sum();

            if product.current_stock < required {
                return Err(CoreError::InsufficientStock {
                    sku: product.sku.clone(),
                    available: product.current_stock,
                    requested: required,
                }
                .into());
            }
        }

        // Ticket numbers are per-store sequential. MAX+1 inside the
        // transaction; SQLite's single writer serializes allocations.
        let ticket_number: i64 =
            sqlx::query_scalar("SELECT COALESCE(MAX(ticket_number), 0) + 1 FROM sales")
                .fetch_one(&mut *tx)
                .await?;

        let receipt_number = format!("{}-{:08}", pos_code, ticket_number);
        let now = Utc::now();

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            ticket_number,
            receipt_number: receipt_number.clone(),
            customer_id: input.customer_id.clone(),
            user_id: input.user_id.clone(),
            payment_method: input.payment_method,
            subtotal_centavos: ticket.subtotal_centavos(),
            discount_centavos: ticket.effective_discount_centavos(),
            total_centavos: ticket.total_centavos(),
            status: SaleStatus::Completed,
            business_date: tz::business_date(now),
            cancel_reason: None,
            cancelled_at: None,
            cancelled_by: None,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, ticket_number, receipt_number, customer_id, user_id,
                payment_method, subtotal_centavos, discount_centavos,
                total_centavos, status, business_date,
                cancel_reason, cancelled_at, cancelled_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.ticket_number)
        .bind(&sale.receipt_number)
        .bind(&sale.customer_id)
        .bind(&sale.user_id)
        .bind(sale.payment_method)
        .bind(sale.subtotal_centavos)
        .bind(sale.discount_centavos)
        .bind(sale.total_centavos)
        .bind(sale.status)
        .bind(sale.business_date)
        .bind(&sale.cancel_reason)
        .bind(sale.cancelled_at)
        .bind(&sale.cancelled_by)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(ticket.lines.len());

        for line in &ticket.lines {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                presentation_id: line.presentation_id.clone(),
                sku_snapshot: line.sku.clone(),
                name_snapshot: line.name.clone(),
                presentation_snapshot: line.presentation_name.clone(),
                units_per_presentation: line.units_per_presentation,
                quantity: line.quantity,
                unit_price_centavos: line.unit_price_centavos,
                line_total_centavos: line.line_total_centavos(),
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, presentation_id,
                    sku_snapshot, name_snapshot, presentation_snapshot,
                    units_per_presentation, quantity,
                    unit_price_centavos, line_total_centavos
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(&item.presentation_id)
            .bind(&item.sku_snapshot)
            .bind(&item.name_snapshot)
            .bind(&item.presentation_snapshot)
            .bind(item.units_per_presentation)
            .bind(item.quantity)
            .bind(item.unit_price_centavos)
            .bind(item.line_total_centavos)
            .execute(&mut *tx)
            .await?;

            let base_units = line.base_units();

            sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock - ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&line.product_id)
            .bind(base_units)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let stock_after: i64 =
                sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
                    .bind(&line.product_id)
                    .fetch_one(&mut *tx)
                    .await?;

            movement::record_in(
                &mut *tx,
                &Movement {
                    id: Uuid::new_v4().to_string(),
                    product_id: line.product_id.clone(),
                    kind: MovementType::Salida,
                    quantity: base_units,
                    stock_after,
                    detail: Some(format!("Venta {receipt_number}")),
                    sale_id: Some(sale.id.clone()),
                    user_id: input.user_id.clone(),
                    created_at: now,
                },
            )
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(
            receipt_number = %sale.receipt_number,
            total_centavos = sale.total_centavos,
            "Sale completed"
        );

        Ok(SaleWithItems { sale, items })
    }

    // -------------------------------------------------------------------------
    // Cancellation
    // -------------------------------------------------------------------------

    /// Cancels a completed sale in one transaction, restoring stock and
    /// writing one compensating ENTRADA movement per line.
    ///
    /// ## Errors
    /// * `DbError::NotFound` - unknown sale
    /// * `CoreError::SaleAlreadyCancelled` - cancellation is once only
    pub async fn cancel_sale(
        &self,
        id: &str,
        reason: &str,
        cancelled_by: &str,
    ) -> DbResult<SaleWithItems> {
        debug!(id = %id, "Cancelling sale");

        let mut tx = self.pool.begin().await?;

        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, ticket_number, receipt_number, customer_id, user_id,
                payment_method, subtotal_centavos, discount_centavos,
                total_centavos, status, business_date,
                cancel_reason, cancelled_at, cancelled_by, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("sale", id))?;

        if sale.is_cancelled() {
            return Err(CoreError::SaleAlreadyCancelled {
                sale_id: id.to_string(),
            }
            .into());
        }

        let now = Utc::now();

        // Guarded flip: if another transaction cancelled between our SELECT
        // and here, zero rows change and we refuse instead of restoring twice.
        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = 'CANCELLED', cancel_reason = ?2, cancelled_at = ?3, cancelled_by = ?4
            WHERE id = ?1 AND status = 'COMPLETED'
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(now)
        .bind(cancelled_by)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::SaleAlreadyCancelled {
                sale_id: id.to_string(),
            }
            .into());
        }

        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, sale_id, product_id, presentation_id,
                sku_snapshot, name_snapshot, presentation_snapshot,
                units_per_presentation, quantity,
                unit_price_centavos, line_total_centavos
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            // Restore with the ratio frozen at sale time, never the
            // current catalog value.
            let base_units = item.base_units();

            sqlx::query(
                r#"
                UPDATE products
                SET current_stock = current_stock + ?2, updated_at = ?3
                WHERE id = ?1
                "#,
            )
            .bind(&item.product_id)
            .bind(base_units)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            let stock_after: i64 =
                sqlx::query_scalar("SELECT current_stock FROM products WHERE id = ?1")
                    .bind(&item.product_id)
                    .fetch_one(&mut *tx)
                    .await?;

            movement::record_in(
                &mut *tx,
                &Movement {
                    id: Uuid::new_v4().to_string(),
                    product_id: item.product_id.clone(),
                    kind: MovementType::Entrada,
                    quantity: base_units,
                    stock_after,
                    detail: Some(format!("Anulación {}: {}", sale.receipt_number, reason)),
                    sale_id: Some(sale.id.clone()),
                    user_id: cancelled_by.to_string(),
                    created_at: now,
                },
            )
            .await?;
        }

        tx.commit().await?;

        info!(receipt_number = %sale.receipt_number, "Sale cancelled");

        let sale = Sale {
            status: SaleStatus::Cancelled,
            cancel_reason: Some(reason.to_string()),
            cancelled_at: Some(now),
            cancelled_by: Some(cancelled_by.to_string()),
            ..sale
        };

        Ok(SaleWithItems { sale, items })
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Gets a sale with its items by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, ticket_number, receipt_number, customer_id, user_id,
                payment_method, subtotal_centavos, discount_centavos,
                total_centavos, status, business_date,
                cancel_reason, cancelled_at, cancelled_by, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match sale {
            Some(sale) => {
                let items = self.items_for_sale(&sale.id).await?;
                Ok(Some(SaleWithItems { sale, items }))
            }
            None => Ok(None),
        }
    }

    /// Gets a sale with its items by receipt number ("0001-00000042").
    pub async fn get_by_receipt(&self, receipt_number: &str) -> DbResult<Option<SaleWithItems>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, ticket_number, receipt_number, customer_id, user_id,
                payment_method, subtotal_centavos, discount_centavos,
                total_centavos, status, business_date,
                cancel_reason, cancelled_at, cancelled_by, created_at
            FROM sales
            WHERE receipt_number = ?1
            "#,
        )
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?;

        match sale {
            Some(sale) => {
                let items = self.items_for_sale(&sale.id).await?;
                Ok(Some(SaleWithItems { sale, items }))
            }
            None => Ok(None),
        }
    }

    /// Lists the items of a sale in insertion order.
    pub async fn items_for_sale(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT
                id, sale_id, product_id, presentation_id,
                sku_snapshot, name_snapshot, presentation_snapshot,
                units_per_presentation, quantity,
                unit_price_centavos, line_total_centavos
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sale headers newest-first, applying the given filters.
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        debug!(
            from = ?filter.from,
            to = ?filter.to,
            status = ?filter.status,
            limit = filter.limit,
            "Listing sales"
        );

        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id, ticket_number, receipt_number, customer_id, user_id,
                payment_method, subtotal_centavos, discount_centavos,
                total_centavos, status, business_date,
                cancel_reason, cancelled_at, cancelled_by, created_at
            FROM sales
            WHERE (?1 IS NULL OR business_date >= ?1)
              AND (?2 IS NULL OR business_date <= ?2)
              AND (?3 IS NULL OR customer_id = ?3)
              AND (?4 IS NULL OR status = ?4)
            ORDER BY ticket_number DESC
            LIMIT ?5
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(&filter.customer_id)
        .bind(filter.status)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    // -------------------------------------------------------------------------
    // Reports
    // -------------------------------------------------------------------------

    /// Summary of one business day for the dashboard.
    pub async fn daily_summary(&self, date: NaiveDate) -> DbResult<DailySummary> {
        let (tickets, gross_centavos, cancelled): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(CASE WHEN status = 'COMPLETED' THEN 1 END),
                COALESCE(SUM(CASE WHEN status = 'COMPLETED' THEN total_centavos END), 0),
                COUNT(CASE WHEN status = 'CANCELLED' THEN 1 END)
            FROM sales
            WHERE business_date = ?1
            "#,
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await?;

        Ok(DailySummary {
            date,
            tickets,
            gross_centavos,
            cancelled,
        })
    }

    /// Per-day totals of completed sales over an inclusive date range.
    pub async fn sales_by_day(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<DayTotal>> {
        let rows = sqlx::query_as::<_, DayTotal>(
            r#"
            SELECT
                business_date AS date,
                COUNT(*) AS tickets,
                SUM(total_centavos) AS total_centavos
            FROM sales
            WHERE status = 'COMPLETED'
              AND business_date >= ?1
              AND business_date <= ?2
            GROUP BY business_date
            ORDER BY business_date
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Best-selling products by base units over an inclusive date range.
    pub async fn top_products(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: u32,
    ) -> DbResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                i.product_id,
                i.sku_snapshot AS sku,
                i.name_snapshot AS name,
                SUM(i.quantity * i.units_per_presentation) AS units,
                SUM(i.line_total_centavos) AS total_centavos
            FROM sale_items i
            INNER JOIN sales s ON s.id = i.sale_id
            WHERE s.status = 'COMPLETED'
              AND s.business_date >= ?1
              AND s.business_date <= ?2
            GROUP BY i.product_id, i.sku_snapshot, i.name_snapshot
            ORDER BY units DESC
            LIMIT ?3
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
