//! Customer records (CUIT/DNI holders).
//!
//! Vendors register and correct customers at the counter; deactivating
//! or restoring one is an admin action.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use almacen_core::{validation, Customer};

use crate::auth::CurrentUser;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route(
            "/api/customers/{id}",
            get(get_one).put(update).delete(remove),
        )
        .route("/api/customers/{id}/reactivate", post(reactivate))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    q: Option<String>,
    #[serde(default)]
    include_inactive: bool,
    limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CustomerRequest {
    document: String,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl CustomerRequest {
    fn validate(&self) -> ApiResult<()> {
        validation::validate_document(&self.document)?;
        validation::validate_customer_name(&self.name)?;
        Ok(())
    }
}

/// `GET /api/customers?q=&include_inactive=&limit=`
async fn list(
    _user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<Customer>>> {
    let limit = query.limit.unwrap_or(100).min(500);

    let customers = match query.q.as_deref() {
        Some(q) if !q.trim().is_empty() => {
            let q = validation::validate_search_query(q)?;
            state.db.customers().search(&q, limit).await?
        }
        _ => {
            state
                .db
                .customers()
                .list(query.include_inactive, limit)
                .await?
        }
    };

    Ok(Json(customers))
}

/// `GET /api/customers/{id}`
async fn get_one(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("customer {id}")))?;

    Ok(Json(customer))
}

/// `POST /api/customers`
async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<(StatusCode, Json<Customer>)> {
    req.validate()?;

    let now = Utc::now();
    let customer = Customer {
        id: Uuid::new_v4().to_string(),
        document: req.document.trim().to_string(),
        name: req.name.trim().to_string(),
        address: req.address,
        phone: req.phone,
        email: req.email,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.customers().insert(&customer).await?;
    info!(document = %customer.document, by = %user.username, "Customer created");

    Ok((StatusCode::CREATED, Json(customer)))
}

/// `PUT /api/customers/{id}`
async fn update(
    _user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CustomerRequest>,
) -> ApiResult<Json<Customer>> {
    req.validate()?;

    let mut customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("customer {id}")))?;

    customer.document = req.document.trim().to_string();
    customer.name = req.name.trim().to_string();
    customer.address = req.address;
    customer.phone = req.phone;
    customer.email = req.email;

    state.db.customers().update(&customer).await?;

    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("customer {id}")))?;

    Ok(Json(customer))
}

/// `DELETE /api/customers/{id}` (admin) - soft delete.
async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_admin()?;

    state.db.customers().soft_delete(&id).await?;
    info!(id = %id, by = %user.username, "Customer deactivated");

    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/customers/{id}/reactivate` (admin)
async fn reactivate(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Customer>> {
    user.require_admin()?;

    state.db.customers().reactivate(&id).await?;

    let customer = state
        .db
        .customers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("customer {id}")))?;

    Ok(Json(customer))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use almacen_core::UserRole;

    use crate::testutil;

    #[tokio::test]
    async fn test_vendor_creates_and_updates_customer() {
        let (app, state) = testutil::test_app().await;
        let (_, vendor) = testutil::seed_user(&state, "cajera", UserRole::Vendor).await;

        let created = testutil::send(
            &app,
            testutil::post_json(
                "/api/customers",
                &vendor,
                json!({
                    "document": "20-12345678-3",
                    "name": "Juan Pérez",
                    "phone": "11-5555-0000"
                }),
            ),
            StatusCode::CREATED,
        )
        .await;
        assert_eq!(created["document"], "20-12345678-3");
        let id = created["id"].as_str().unwrap();

        let updated = testutil::send(
            &app,
            testutil::put_json(
                &format!("/api/customers/{id}"),
                &vendor,
                json!({
                    "document": "20-12345678-3",
                    "name": "Juan A. Pérez",
                    "email": "juan@example.com"
                }),
            ),
            StatusCode::OK,
        )
        .await;
        assert_eq!(updated["name"], "Juan A. Pérez");
        assert_eq!(updated["email"], "juan@example.com");
        // Fields not sent in the update are cleared, not merged.
        assert!(updated["phone"].is_null());
    }

    #[tokio::test]
    async fn test_duplicate_document_conflicts() {
        let (app, state) = testutil::test_app().await;
        let (_, vendor) = testutil::seed_user(&state, "cajera", UserRole::Vendor).await;

        let body = json!({"document": "12345678", "name": "Ana"});
        testutil::send(
            &app,
            testutil::post_json("/api/customers", &vendor, body.clone()),
            StatusCode::CREATED,
        )
        .await;
        testutil::send(
            &app,
            testutil::post_json("/api/customers", &vendor, body),
            StatusCode::CONFLICT,
        )
        .await;
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let (app, state) = testutil::test_app().await;
        let (_, vendor) = testutil::seed_user(&state, "cajera", UserRole::Vendor).await;
        let (_, admin) = testutil::seed_user(&state, "admin", UserRole::Admin).await;

        let created = testutil::send(
            &app,
            testutil::post_json(
                "/api/customers",
                &vendor,
                json!({"document": "12345678", "name": "Ana"}),
            ),
            StatusCode::CREATED,
        )
        .await;
        let id = created["id"].as_str().unwrap();

        let response = app
            .clone()
            .oneshot(testutil::delete(&format!("/api/customers/{id}"), &vendor))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(testutil::delete(&format!("/api/customers/{id}"), &admin))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let restored = testutil::send(
            &app,
            testutil::post_json(&format!("/api/customers/{id}/reactivate"), &admin, json!({})),
            StatusCode::OK,
        )
        .await;
        assert_eq!(restored["isActive"], true);
    }

    #[tokio::test]
    async fn test_invalid_document_rejected() {
        let (app, state) = testutil::test_app().await;
        let (_, vendor) = testutil::seed_user(&state, "cajera", UserRole::Vendor).await;

        testutil::send(
            &app,
            testutil::post_json(
                "/api/customers",
                &vendor,
                json!({"document": "abc", "name": "Ana"}),
            ),
            StatusCode::BAD_REQUEST,
        )
        .await;
    }
}
