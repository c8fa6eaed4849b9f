use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Responds with the health status of the service and its database.
///
/// # Responses
/// - `200 OK` with `{ "status": "healthy", "database": "connected" }` when
///   `SELECT 1` succeeds.
/// - `500 INTERNAL SERVER ERROR` with
///   `{ "status": "unhealthy", "database": "disconnected", "error": ... }`
///   otherwise.
#[tracing::instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // ---
    match state.repository().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                database: "connected",
                error: None,
            }),
        ),
        Err(err) => {
            tracing::error!("Health check failed: {err:#}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    database: "disconnected",
                    error: Some(format!("{err:#}")),
                }),
            )
        }
    }
}
