//! Authenticated-user extractor.
//!
//! Handlers take `user: CurrentUser` as an argument to require a valid
//! Bearer token; admin-only handlers call `user.require_admin()?` on top.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::warn;

use almacen_core::UserRole;

use crate::auth::jwt::{extract_bearer_token, Claims};
use crate::error::ApiError;
use crate::AppState;

/// Current user context extracted from a validated JWT.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub role: UserRole,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        CurrentUser {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Guard for admin-only operations.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden("admin role required".to_string()))
        }
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse if already extracted for this request.
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => extract_bearer_token(header).ok_or(ApiError::InvalidToken)?,
            None => {
                warn!(uri = %parts.uri, "Missing authorization header");
                return Err(ApiError::Unauthorized);
            }
        };

        let claims = state.jwt.validate_token(token)?;
        let user = CurrentUser::from(claims);

        parts.extensions.insert(user.clone());
        Ok(user)
    }
}
