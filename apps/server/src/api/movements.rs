//! Stock movement ledger (read-only over HTTP).
//!
//! Movements are only ever written by checkout, cancellation and stock
//! adjustment; this endpoint exposes the history. Date filters take
//! `YYYY-MM-DD` Argentina business days and are translated to UTC bounds.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Deserialize;

use almacen_core::{tz, Movement, MovementType};
use almacen_db::MovementFilter;

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/movements", get(list))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MovementQuery {
    product_id: Option<String>,
    /// "ENTRADA" | "SALIDA" | "AJUSTE"
    kind: Option<String>,
    /// Inclusive Argentina business day, `YYYY-MM-DD`.
    from: Option<NaiveDate>,
    /// Inclusive Argentina business day, `YYYY-MM-DD`.
    to: Option<NaiveDate>,
    limit: Option<u32>,
}

fn parse_kind(raw: &str) -> ApiResult<MovementType> {
    match raw {
        "ENTRADA" => Ok(MovementType::Entrada),
        "SALIDA" => Ok(MovementType::Salida),
        "AJUSTE" => Ok(MovementType::Ajuste),
        other => Err(ApiError::Validation(format!(
            "unknown movement kind: {other}"
        ))),
    }
}

/// `GET /api/movements?product_id=&kind=&from=&to=&limit=`
async fn list(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<MovementQuery>,
) -> ApiResult<Json<Vec<Movement>>> {
    let kind = query.kind.as_deref().map(parse_kind).transpose()?;

    let filter = MovementFilter {
        product_id: query.product_id,
        kind,
        from: query.from.map(|d| tz::business_day_bounds(d).0),
        to: query.to.map(|d| tz::business_day_bounds(d).1),
        limit: query.limit.unwrap_or(100).min(500),
    };

    Ok(Json(state.db.movements().list(&filter).await?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use almacen_core::UserRole;

    use crate::testutil;

    #[tokio::test]
    async fn test_list_filters_by_product_and_kind() {
        let (app, state) = testutil::test_app().await;
        let (admin_user, admin) = testutil::seed_user(&state, "admin", UserRole::Admin).await;
        let yerba = testutil::seed_product(&state, "YER-500", "Yerba", 250000, 10).await;
        let azucar = testutil::seed_product(&state, "AZU-1K", "Azúcar", 90000, 10).await;

        // Two adjustments on different products.
        state
            .db
            .products()
            .adjust_stock(&yerba.id, 5, "Recuento", &admin_user.id)
            .await
            .unwrap();
        state
            .db
            .products()
            .adjust_stock(&azucar.id, -2, "Rotura", &admin_user.id)
            .await
            .unwrap();

        let all = testutil::send(&app, testutil::get("/api/movements", &admin), StatusCode::OK)
            .await;
        assert_eq!(all.as_array().unwrap().len(), 2);

        let only_yerba = testutil::send(
            &app,
            testutil::get(&format!("/api/movements?productId={}", yerba.id), &admin),
            StatusCode::OK,
        )
        .await;
        assert_eq!(only_yerba.as_array().unwrap().len(), 1);
        assert_eq!(only_yerba[0]["quantity"], 5);

        let ajustes = testutil::send(
            &app,
            testutil::get("/api/movements?kind=AJUSTE", &admin),
            StatusCode::OK,
        )
        .await;
        assert_eq!(ajustes.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_kind_rejected() {
        let (app, state) = testutil::test_app().await;
        let (_, vendor) = testutil::seed_user(&state, "cajera", UserRole::Vendor).await;

        let body = testutil::send(
            &app,
            testutil::get("/api/movements?kind=VENTA", &vendor),
            StatusCode::BAD_REQUEST,
        )
        .await;
        assert_eq!(body["code"], "VALIDATION");
    }

    #[tokio::test]
    async fn test_requires_token() {
        let (app, _state) = testutil::test_app().await;

        let body = testutil::send(
            &app,
            axum::http::Request::builder()
                .uri("/api/movements")
                .body(axum::body::Body::empty())
                .unwrap(),
            StatusCode::UNAUTHORIZED,
        )
        .await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}
