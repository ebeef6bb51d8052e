//! Login endpoint.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use almacen_core::User;

use crate::auth::verify_password;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/auth/login", post(login))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user: User,
}

/// `POST /api/auth/login`
///
/// Unknown username, wrong password and deactivated account all return
/// the same 401 so the response does not reveal which part failed.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.db.users().get_by_username(&req.username).await?;

    let user = match user {
        Some(u) if u.is_active && verify_password(&req.password, &u.password_hash) => u,
        _ => {
            warn!(username = %req.username, "Failed login attempt");
            return Err(ApiError::Unauthorized);
        }
    };

    let token = state.jwt.generate_token(&user)?;
    info!(username = %user.username, role = ?user.role, "User logged in");

    Ok(Json(LoginResponse { token, user }))
}
