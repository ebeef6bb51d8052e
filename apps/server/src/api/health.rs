//! Liveness probe.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// `GET /health` - no auth; reports database reachability.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = state.db.health_check().await;

    Json(json!({
        "status": if db_ok { "ok" } else { "degraded" },
        "database": db_ok,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::testutil;

    #[tokio::test]
    async fn test_health_needs_no_token() {
        let (app, _state) = testutil::test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = testutil::body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);
    }
}
