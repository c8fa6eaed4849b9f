use super::shared_types::timestamp;
use axum::Json;
use serde_json::{json, Value};

/// Greeting with the service version and current time.
pub async fn root_handler() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    Json(json!({
        "message": "Hello, World! Monitored by the golden signals demo",
        "version": version,
        "timestamp": timestamp(),
    }))
}
