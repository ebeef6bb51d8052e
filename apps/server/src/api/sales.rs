//! Checkout, sale listing, cancellation and the PDF ticket.
//!
//! The client sends product/presentation ids and quantities only; prices
//! and snapshots are resolved from the catalog inside the checkout
//! transaction. The acting user always comes from the token, never from
//! the request body.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use almacen_core::{validation, NewSale, NewSaleLine, PaymentMethod, Sale, SaleStatus};
use almacen_db::{SaleFilter, SaleWithItems};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::{pdf, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sales", get(list).post(checkout))
        .route("/api/sales/{id}", get(get_one))
        .route("/api/sales/{id}/cancel", post(cancel))
        .route("/api/sales/{id}/ticket.pdf", get(ticket_pdf))
}

// =============================================================================
// Request DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutRequest {
    customer_id: Option<String>,
    payment_method: PaymentMethod,
    #[serde(default)]
    discount_centavos: i64,
    lines: Vec<CheckoutLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutLine {
    product_id: String,
    presentation_id: Option<String>,
    quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelRequest {
    reason: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaleListQuery {
    /// Inclusive Argentina business day, `YYYY-MM-DD`.
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    customer_id: Option<String>,
    /// "COMPLETED" | "CANCELLED"
    status: Option<String>,
    limit: Option<u32>,
}

fn parse_status(raw: &str) -> ApiResult<SaleStatus> {
    match raw {
        "COMPLETED" => Ok(SaleStatus::Completed),
        "CANCELLED" => Ok(SaleStatus::Cancelled),
        other => Err(ApiError::Validation(format!("unknown sale status: {other}"))),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// `POST /api/sales` - checkout.
async fn checkout(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<SaleWithItems>)> {
    validation::validate_discount_centavos(req.discount_centavos)?;

    // Fail with a clear 404 before opening the checkout transaction.
    if let Some(customer_id) = &req.customer_id {
        state
            .db
            .customers()
            .get_by_id(customer_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("customer {customer_id}")))?;
    }

    let input = NewSale {
        customer_id: req.customer_id,
        user_id: user.id.clone(),
        payment_method: req.payment_method,
        discount_centavos: req.discount_centavos,
        lines: req
            .lines
            .into_iter()
            .map(|l| NewSaleLine {
                product_id: l.product_id,
                presentation_id: l.presentation_id,
                quantity: l.quantity,
            })
            .collect(),
    };

    let sale = state
        .db
        .sales()
        .create_sale(input, &state.config.pos_code)
        .await?;

    info!(
        receipt = %sale.sale.receipt_number,
        total = %sale.sale.total_centavos,
        by = %user.username,
        "Sale completed"
    );

    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /api/sales?from=&to=&customer_id=&status=&limit=`
async fn list(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<SaleListQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let filter = SaleFilter {
        from: query.from,
        to: query.to,
        customer_id: query.customer_id,
        status,
        limit: query.limit.unwrap_or(100).min(500),
    };

    Ok(Json(state.db.sales().list(&filter).await?))
}

/// `GET /api/sales/{id}`
async fn get_one(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SaleWithItems>> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sale {id}")))?;

    Ok(Json(sale))
}

/// `POST /api/sales/{id}/cancel` (admin)
///
/// Flips the sale to CANCELLED once, restores stock from the frozen
/// unit ratios and writes the compensating ENTRADA movements. A second
/// cancellation returns 409.
async fn cancel(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CancelRequest>,
) -> ApiResult<Json<SaleWithItems>> {
    user.require_admin()?;
    validation::validate_cancel_reason(&req.reason)?;

    let sale = state
        .db
        .sales()
        .cancel_sale(&id, req.reason.trim(), &user.id)
        .await?;

    info!(
        receipt = %sale.sale.receipt_number,
        by = %user.username,
        "Sale cancelled"
    );

    Ok(Json(sale))
}

/// `GET /api/sales/{id}/ticket.pdf`
async fn ticket_pdf(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let sale = state
        .db
        .sales()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("sale {id}")))?;

    let sold_by = match state.db.users().get_by_id(&sale.sale.user_id).await? {
        Some(u) => u.display_name,
        None => "-".to_string(),
    };

    let customer_name = match &sale.sale.customer_id {
        Some(customer_id) => state
            .db
            .customers()
            .get_by_id(customer_id)
            .await?
            .map(|c| c.name),
        None => None,
    };

    let store_name = state.config.store_name.clone();
    let receipt = sale.sale.receipt_number.clone();

    let bytes = tokio::task::spawn_blocking(move || {
        pdf::render_ticket(&sale, &store_name, &sold_by, customer_name.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("pdf task failed: {e}")))??;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"ticket-{receipt}.pdf\""),
        ),
    ];

    Ok((headers, bytes))
}

// =============================================================================
// Unit Tests
// =============================================================================
