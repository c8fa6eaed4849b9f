use axum::{http::StatusCode, Json};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error half of handler results.
pub type ApiError = (StatusCode, Json<ErrorBody>);

/// Client-side or simulated error with a plain message.
pub fn api_error(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: error.into(),
            details: None,
        }),
    )
}

/// 500 for a failed dependency call; the cause is logged and echoed in
/// `details`.
pub fn internal_error(error: &str, cause: anyhow::Error) -> ApiError {
    tracing::error!("{error}: {cause:#}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: error.to_string(),
            details: Some(format!("{cause:#}")),
        }),
    )
}

/// Raw query string parameters.
pub type QueryParams = HashMap<String, String>;

/// Parse `key` from the query string, falling back to `default` when it is
/// missing or does not parse.
pub fn query_param<T: FromStr>(params: &QueryParams, key: &str, default: T) -> T {
    params
        .get(key)
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or(default)
}

/// Current time as an RFC 3339 string.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
