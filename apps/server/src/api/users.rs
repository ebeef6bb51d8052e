//! Operator management. Admin only.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use almacen_core::{validation, User, UserRole};

use crate::auth::{hash_password, CurrentUser};
use crate::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/users", get(list).post(create))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    username: String,
    display_name: String,
    password: String,
    role: UserRole,
}

/// `GET /api/users` (admin)
async fn list(user: CurrentUser, State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    user.require_admin()?;

    Ok(Json(state.db.users().list(100).await?))
}

/// `POST /api/users` (admin)
async fn create(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    user.require_admin()?;

    validation::validate_username(&req.username)?;
    validation::validate_password(&req.password)?;

    let now = Utc::now();
    let new_user = User {
        id: Uuid::new_v4().to_string(),
        username: req.username.trim().to_string(),
        display_name: req.display_name.trim().to_string(),
        password_hash: hash_password(&req.password)?,
        role: req.role,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    state.db.users().insert(&new_user).await?;
    info!(
        username = %new_user.username,
        role = ?new_user.role,
        by = %user.username,
        "User created"
    );

    Ok((StatusCode::CREATED, Json(new_user)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use almacen_core::UserRole;

    use crate::testutil;

    #[tokio::test]
    async fn test_admin_creates_user_who_can_login() {
        let (app, state) = testutil::test_app().await;
        let (_, admin) = testutil::seed_user(&state, "admin", UserRole::Admin).await;

        let created = testutil::send(
            &app,
            testutil::post_json(
                "/api/users",
                &admin,
                json!({
                    "username": "vendedor1",
                    "displayName": "Vendedor Uno",
                    "password": "clave-segura-1",
                    "role": "VENDOR"
                }),
            ),
            StatusCode::CREATED,
        )
        .await;
        assert_eq!(created["role"], "VENDOR");
        assert!(created.get("passwordHash").is_none());

        testutil::send(
            &app,
            testutil::post_json_anon(
                "/api/auth/login",
                json!({"username": "vendedor1", "password": "clave-segura-1"}),
            ),
            StatusCode::OK,
        )
        .await;
    }

    #[tokio::test]
    async fn test_vendor_cannot_manage_users() {
        let (app, state) = testutil::test_app().await;
        let (_, vendor) = testutil::seed_user(&state, "cajera", UserRole::Vendor).await;

        testutil::send(
            &app,
            testutil::get("/api/users", &vendor),
            StatusCode::FORBIDDEN,
        )
        .await;

        testutil::send(
            &app,
            testutil::post_json(
                "/api/users",
                &vendor,
                json!({
                    "username": "intruso",
                    "displayName": "X",
                    "password": "12345678x",
                    "role": "ADMIN"
                }),
            ),
            StatusCode::FORBIDDEN,
        )
        .await;
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (app, state) = testutil::test_app().await;
        let (_, admin) = testutil::seed_user(&state, "admin", UserRole::Admin).await;

        let body = json!({
            "username": "vendedor1",
            "displayName": "Vendedor",
            "password": "clave-segura-1",
            "role": "VENDOR"
        });
        testutil::send(
            &app,
            testutil::post_json("/api/users", &admin, body.clone()),
            StatusCode::CREATED,
        )
        .await;
        testutil::send(
            &app,
            testutil::post_json("/api/users", &admin, body),
            StatusCode::CONFLICT,
        )
        .await;
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let (app, state) = testutil::test_app().await;
        let (_, admin) = testutil::seed_user(&state, "admin", UserRole::Admin).await;

        testutil::send(
            &app,
            testutil::post_json(
                "/api/users",
                &admin,
                json!({
                    "username": "vendedor1",
                    "displayName": "Vendedor",
                    "password": "corta",
                    "role": "VENDOR"
                }),
            ),
            StatusCode::BAD_REQUEST,
        )
        .await;
    }

    #[tokio::test]
    async fn test_listing_hides_password_hashes() {
        let (app, state) = testutil::test_app().await;
        let (_, admin) = testutil::seed_user(&state, "admin", UserRole::Admin).await;

        let body = testutil::send(&app, testutil::get("/api/users", &admin), StatusCode::OK)
            .await;
        let users = body.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert!(users[0].get("passwordHash").is_none());
    }
}
