use axum::{extract::State, http::StatusCode, Json};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Service banner with a coarse endpoint index.
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Job Board API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": {
                "admin": ["/api/admin/register", "/api/admin/login"],
                "user": ["/api/users/register", "/api/users/login", "/api/users/me"],
            },
            "jobs": ["/api/jobs", "/api/jobs/:id"],
            "applicants": ["/api/applicants", "/api/applicants/:id"],
            "applications": [
                "/api/applications",
                "/api/applications/:id",
                "/api/jobs/:id/applications",
            ],
            "resume": ["/api/parse-resume"],
        },
    }))
}

/// GET /api/health
/// Pings the store. 200 when the database answers, 500 otherwise.
pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "database": "connected",
                "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "database": "disconnected",
                    "error": "Database connection failed",
                })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{json_request, send, test_app, test_state};
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_connected_store() {
        let (state, _) = test_state();
        let (status, body) = send(test_app(state), json_request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], "connected");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn test_health_reports_unreachable_store() {
        let (state, store) = test_state();
        store.set_healthy(false);
        let (status, body) = send(test_app(state), json_request("GET", "/api/health", None, None)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(body["database"], "disconnected");
    }

    #[tokio::test]
    async fn test_root_banner_lists_endpoints() {
        let (state, _) = test_state();
        let (status, body) = send(test_app(state), json_request("GET", "/", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["endpoints"]["jobs"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let (state, _) = test_state();
        let (status, _) = send(test_app(state), json_request("GET", "/api/nope", None, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
