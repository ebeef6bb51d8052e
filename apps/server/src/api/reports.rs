//! Dashboard and ranged sales reports.
//!
//! "Today" and all report ranges are Argentina business days, not UTC:
//! a ticket sold at 23:30 local belongs to that local day even though
//! its UTC timestamp already rolled over.

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use almacen_core::{tz, Product, Sale};
use almacen_db::{DailySummary, DayTotal, SaleFilter, TopProduct};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::{pdf, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reports/dashboard", get(dashboard))
        .route("/api/reports/sales", get(sales_report))
        .route("/api/reports/sales.pdf", get(sales_report_pdf))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeQuery {
    from: NaiveDate,
    to: NaiveDate,
}

impl RangeQuery {
    fn validate(&self) -> ApiResult<()> {
        if self.from > self.to {
            return Err(ApiError::Validation(
                "from must not be after to".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    today: DailySummary,
    low_stock: Vec<Product>,
    recent_sales: Vec<Sale>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SalesReportResponse {
    from: NaiveDate,
    to: NaiveDate,
    days: Vec<DayTotal>,
    top_products: Vec<TopProduct>,
    total_tickets: i64,
    total_centavos: i64,
}

/// `GET /api/reports/dashboard`
async fn dashboard(
    _user: CurrentUser,
    State(state): State<AppState>,
) -> ApiResult<Json<DashboardResponse>> {
    let today = tz::business_date(Utc::now());

    let summary = state.db.sales().daily_summary(today).await?;
    let low_stock = state.db.products().low_stock(10).await?;
    let recent_sales = state
        .db
        .sales()
        .list(&SaleFilter {
            limit: 10,
            ..SaleFilter::default()
        })
        .await?;

    Ok(Json(DashboardResponse {
        today: summary,
        low_stock,
        recent_sales,
    }))
}

/// `GET /api/reports/sales?from=&to=`
async fn sales_report(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Json<SalesReportResponse>> {
    range.validate()?;

    let days = state.db.sales().sales_by_day(range.from, range.to).await?;
    let top_products = state
        .db
        .sales()
        .top_products(range.from, range.to, 10)
        .await?;

    let total_tickets = days.iter().map(|d| d.tickets).sum();
    let total_centavos = days.iter().map(|d| d.total_centavos).sum();

    Ok(Json(SalesReportResponse {
        from: range.from,
        to: range.to,
        days,
        top_products,
        total_tickets,
        total_centavos,
    }))
}

/// `GET /api/reports/sales.pdf?from=&to=`
async fn sales_report_pdf(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<impl IntoResponse> {
    range.validate()?;

    let days = state.db.sales().sales_by_day(range.from, range.to).await?;
    let store_name = state.config.store_name.clone();
    let (from, to) = (range.from, range.to);

    let bytes =
        tokio::task::spawn_blocking(move || pdf::render_sales_report(&days, from, to, &store_name))
            .await
            .map_err(|e| ApiError::Internal(format!("pdf task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"ventas-{from}-{to}.pdf\""),
        ),
    ];

    Ok((headers, bytes))
}

// =============================================================================
// Unit Tests
// =============================================================================
