use super::shared_types::{internal_error, query_param, ApiError, QueryParams};
use crate::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

/// Rows returned by the complex query.
const TOP_USERNAMES: i64 = 10;

/// Database load simulation (GET /database-query?type=simple|complex).
///
/// `complex` groups users by username; anything else counts users. The
/// result is returned as an array of rows.
#[tracing::instrument(skip(state))]
pub async fn database_query(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Value>, ApiError> {
    // ---
    let query_type: String = query_param(&params, "type", "simple".to_string());
    let repository = state.repository();

    let result = if query_type == "complex" {
        let rows = repository
            .username_counts(TOP_USERNAMES)
            .await
            .map_err(|err| internal_error("Database query failed", err))?;
        json!(rows
            .into_iter()
            .map(|(username, count)| json!([username, count]))
            .collect::<Vec<_>>())
    } else {
        let count = repository
            .count_users()
            .await
            .map_err(|err| internal_error("Database query failed", err))?;
        json!([[count]])
    };

    Ok(Json(json!({ "query_type": query_type, "result": result })))
}
