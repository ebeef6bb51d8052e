//! Product catalog: CRUD, presentations and manual stock adjustment.
//!
//! Reads are open to any authenticated user; every mutation is
//! admin-only. Stock is never edited through the product update - it only
//! moves through checkout, cancellation and the `/adjust` endpoint, so the
//! movement ledger stays complete.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use almacen_core::{validation, Presentation, Product};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/low-stock", get(low_stock))
        .route(
            "/api/products/{id}",
            get(get_one).put(update).delete(remove),
        )
        .route("/api/products/{id}/reactivate", post(reactivate))
        .route(
            "/api/products/{id}/presentations",
            get(list_presentations).post(create_presentation),
        )
        .route("/api/products/{id}/adjust", post(adjust_stock))
        .route("/api/presentations/{id}", delete(remove_presentation))
}

// =============================================================================
// Request DTOs
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    /// Search term matched against name and SKU (active products only).
    q: Option<String>,
    #[serde(default)]
    include_inactive: bool,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductRequest {
    sku: String,
    name: String,
    description: Option<String>,
    price_centavos: i64,
    cost_centavos: Option<i64>,
    #[serde(default)]
    min_stock: i64,
}

impl ProductRequest {
    fn validate(&self) -> ApiResult<()> {
        validation::validate_sku(&self.sku)?;
        validation::validate_product_name(&self.name)?;
        validation::validate_price_centavos(self.price_centavos)?;
        if let Some(cost) = self.cost_centavos {
            validation::validate_price_centavos(cost)?;
        }
        if self.min_stock < 0 {
            return Err(ApiError::Validation("minStock must not be negative".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PresentationRequest {
    name: String,
    units_per_presentation: i64,
    price_centavos: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdjustStockRequest {
    /// Signed correction in base units.
    delta: i64,
    reason: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/products?q=&include_inactive=&limit=`
async fn list(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let limit = query.limit.unwrap_or(100).min(500);

    let products = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => {
            let q = validation::validate_search_query(q)?;
            state.db.products().search(&q, limit).await?
        }
        _ => {
            state
                .db
                .products()
                .list(query.include_inactive, limit)
                .await?
        }
    };

    Ok(Json(products))
}

/// `GET /api/products/low-stock`
async fn low_stock(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let limit = query.limit.unwrap_or(50).min(500);
    Ok(Json(state.db.products().low_stock(limit).await?))
}

/// `GET /api/products/{id}`
async fn get_one(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// `POST /api/products` (admin)
///
/// New products start at zero stock; initial load goes through
/// `/adjust` so it leaves an audit movement like any other change.
async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    user.require_admin()?;
    req.validate()?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        sku: req.sku.trim().to_uppercase(),
        name: req.name.trim().to_string(),
        description: req.description,
        price_centavos: req.price_centavos,
        cost_centavos: req.cost_centavos,
        current_stock: 0,
        min_stock: req.min_stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.products().insert(&product).await?;
    info!(sku = %product.sku, by = %user.username, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /api/products/{id}` (admin)
async fn update(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Json<Product>> {
    user.require_admin()?;
    req.validate()?;

    let mut product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    product.sku = req.sku.trim().to_uppercase();
    product.name = req.name.trim().to_string();
    product.description = req.description;
    product.price_centavos = req.price_centavos;
    product.cost_centavos = req.cost_centavos;
    product.min_stock = req.min_stock;

    state.db.products().update(&product).await?;

    // Re-read: update refreshes updated_at and leaves stock alone.
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// `DELETE /api/products/{id}` (admin) - soft delete.
async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_admin()?;

    state.db.products().soft_delete(&id).await?;
    info!(id = %id, by = %user.username, "Product deactivated");

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/products/{id}/reactivate` (admin)
async fn reactivate(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    user.require_admin()?;

    state.db.products().reactivate(&id).await?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    Ok(Json(product))
}

/// `POST /api/products/{id}/adjust` (admin)
///
/// Signed stock correction with a mandatory reason; writes an AJUSTE
/// movement in the same transaction. The result may not go below zero.
async fn adjust_stock(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdjustStockRequest>,
) -> ApiResult<Json<Product>> {
    user.require_admin()?;

    if req.delta == 0 {
        return Err(ApiError::Validation("delta must not be zero".into()));
    }
    let reason = req.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::Validation("reason is required".into()));
    }

    let product = state
        .db
        .products()
        .adjust_stock(&id, req.delta, reason, &user.id)
        .await?;

    info!(
        sku = %product.sku,
        delta = %req.delta,
        stock = %product.current_stock,
        by = %user.username,
        "Stock adjusted"
    );

    Ok(Json(product))
}

// -----------------------------------------------------------------------------
// Presentations
// -----------------------------------------------------------------------------

/// `GET /api/products/{id}/presentations`
async fn list_presentations(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Presentation>>> {
    // 404 on unknown product rather than an empty list.
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    Ok(Json(
        state.db.presentations().list_for_product(&id, false).await?,
    ))
}

/// `POST /api/products/{id}/presentations` (admin)
async fn create_presentation(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PresentationRequest>,
) -> ApiResult<(StatusCode, Json<Presentation>)> {
    user.require_admin()?;

    validation::validate_presentation_name(&req.name)?;
    validation::validate_units_per_presentation(req.units_per_presentation)?;
    validation::validate_price_centavos(req.price_centavos)?;

    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("product {id}")))?;

    let presentation = Presentation {
        id: Uuid::new_v4().to_string(),
        product_id: product.id.clone(),
        name: req.name.trim().to_string(),
        units_per_presentation: req.units_per_presentation,
        price_centavos: req.price_centavos,
        is_active: true,
        created_at: Utc::now(),
    };

    state.db.presentations().insert(&presentation).await?;
    info!(
        sku = %product.sku,
        presentation = %presentation.name,
        units = %presentation.units_per_presentation,
        "Presentation created"
    );

    Ok((StatusCode::CREATED, Json(presentation)))
}

/// `DELETE /api/presentations/{id}` (admin) - soft delete.
async fn remove_presentation(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_admin()?;

    state.db.presentations().soft_delete(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Unit Tests
// =============================================================================
