use super::shared_types::{timestamp, QueryParams};
use crate::lifecycle::ContextFields;
use axum::{
    extract::Query,
    response::{IntoResponse, Response},
    Extension, Json,
};
use rand::seq::SliceRandom;
use serde_json::json;
use std::time::Duration;

/// Simulated e-commerce operations and their processing time in seconds.
const OPERATIONS: [(&str, f64); 5] = [
    ("user_login", 0.1),
    ("product_view", 0.05),
    ("cart_add", 0.2),
    ("checkout", 0.5),
    ("payment", 1.0),
];

const UNKNOWN_OPERATION_SECONDS: f64 = 0.1;

/// Business event simulation (GET /business-metrics?operation=checkout).
///
/// Picks a random operation when none is given, waits for its processing
/// time and reports it as a business operation.
#[tracing::instrument]
pub async fn business_metrics(Query(params): Query<QueryParams>) -> Response {
    // ---
    let operation = params
        .get("operation")
        .cloned()
        .unwrap_or_else(random_operation);
    let processing_time = processing_time(&operation);

    tokio::time::sleep(Duration::from_secs_f64(processing_time)).await;

    let body = json!({
        "message": format!("Business operation '{operation}' completed"),
        "operation": operation,
        "processing_time": processing_time,
        "timestamp": timestamp(),
    });

    (
        Extension(ContextFields::default().with_operation(operation)),
        Json(body),
    )
        .into_response()
}

fn random_operation() -> String {
    OPERATIONS
        .choose(&mut rand::thread_rng())
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "user_login".to_string())
}

fn processing_time(operation: &str) -> f64 {
    OPERATIONS
        .iter()
        .find(|(name, _)| *name == operation)
        .map(|(_, seconds)| *seconds)
        .unwrap_or(UNKNOWN_OPERATION_SECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_operations_have_fixed_times() {
        assert_eq!(processing_time("payment"), 1.0);
        assert_eq!(processing_time("product_view"), 0.05);
        assert_eq!(processing_time("refund"), UNKNOWN_OPERATION_SECONDS);
    }

    #[test]
    fn random_operation_is_always_known() {
        for _ in 0..20 {
            let op = random_operation();
            assert!(OPERATIONS.iter().any(|(name, _)| *name == op), "{op}");
        }
    }
}
