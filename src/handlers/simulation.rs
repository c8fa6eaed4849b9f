//! Golden-signal simulations: latency, errors, CPU and memory saturation.
//!
//! Each handler attaches the values the emission policy needs through a
//! `ContextFields` response extension.

use super::shared_types::{api_error, internal_error, query_param, ApiError, QueryParams};
use crate::lifecycle::{ContextFields, BYTES_PER_MB};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use rand::Rng;
use serde_json::{json, Value};
use std::hint::black_box;
use std::time::{Duration, Instant};

/// How long `/memory-usage` keeps its allocation alive.
const MEMORY_HOLD: Duration = Duration::from_secs(1);

/// Latency simulation (GET /delay?seconds=1).
///
/// Sleeps for `seconds` and reports a business value of ten times the delay.
/// Negative or non-finite values are rejected with 400.
#[tracing::instrument]
pub async fn delay(Query(params): Query<QueryParams>) -> Result<Response, ApiError> {
    // ---
    let seconds: f64 = query_param(&params, "seconds", 1.0);
    let pause = Duration::try_from_secs_f64(seconds).map_err(|_| {
        api_error(
            StatusCode::BAD_REQUEST,
            "seconds must be a finite, non-negative number",
        )
    })?;

    tokio::time::sleep(pause).await;

    let business_value = seconds * 10.0;
    let body = json!({
        "message": format!("Delayed response after {seconds} seconds"),
        "delay": seconds,
        "business_value": business_value,
    });

    Ok((
        Extension(ContextFields::default().with_business_value(business_value)),
        Json(body),
    )
        .into_response())
}

/// Error simulation (GET /error?rate=50).
///
/// With probability `rate`% answers 400, 404 or 500 (chosen uniformly),
/// otherwise 200.
#[tracing::instrument]
pub async fn error(Query(params): Query<QueryParams>) -> Response {
    // ---
    let rate: i64 = query_param(&params, "rate", 50);

    match simulated_failure(rate) {
        Some(status) => {
            let message = match status.as_u16() {
                400 => "Bad request simulation",
                404 => "Resource not found simulation",
                _ => "Internal server error simulation",
            };
            api_error(status, message).into_response()
        }
        None => Json(json!({ "message": "Success! No error generated this time" })).into_response(),
    }
}

/// Draw the outcome of one `/error` call.
fn simulated_failure(rate: i64) -> Option<StatusCode> {
    let mut rng = rand::thread_rng();
    if rng.gen_range(1..=100) > rate {
        return None;
    }

    let status = match rng.gen_range(0..3) {
        0 => StatusCode::BAD_REQUEST,
        1 => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Some(status)
}

/// CPU saturation (GET /cpu-intensive?iterations=100000).
///
/// Sums `i²` for `i in 0..iterations` on the blocking pool and reports the
/// wall-clock time spent.
#[tracing::instrument]
pub async fn cpu_intensive(Query(params): Query<QueryParams>) -> Result<Response, ApiError> {
    // ---
    let iterations: u64 = query_param(&params, "iterations", 100_000);

    let (result, elapsed) = tokio::task::spawn_blocking(move || {
        let start = Instant::now();
        let result = sum_of_squares(iterations);
        (result, start.elapsed())
    })
    .await
    .map_err(|err| internal_error("CPU-intensive operation failed", err.into()))?;

    let execution_time = elapsed.as_secs_f64();
    // JSON numbers stop at u64; larger sums are reported as strings.
    let result = u64::try_from(result)
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(result.to_string()));
    let body = json!({
        "message": "CPU-intensive operation completed",
        "iterations": iterations,
        "result": result,
        "execution_time": execution_time,
    });

    Ok((
        Extension(ContextFields::default().with_cpu_execution_seconds(execution_time)),
        Json(body),
    )
        .into_response())
}

fn sum_of_squares(iterations: u64) -> u128 {
    (0..iterations).fold(0u128, |acc, i| {
        let i = black_box(i) as u128;
        acc.wrapping_add(i * i)
    })
}

/// Memory saturation (GET /memory-usage?size=10).
///
/// Allocates and touches `size` MB, holds it for about a second, then
/// releases it. Sizes above the configured cap are rejected with 400; the
/// requested size is attached either way.
#[tracing::instrument(skip(state))]
pub async fn memory_usage(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Response {
    // ---
    let size_mb: u64 = query_param(&params, "size", 10);
    let fields = Extension(ContextFields::default().with_memory_size_mb(size_mb));

    let len = match allocation_len(size_mb, state.memory_max_mb()) {
        Ok(len) => len,
        Err(rejection) => return (fields, rejection).into_response(),
    };
    let data = vec![1u8; len];

    tokio::time::sleep(MEMORY_HOLD).await;

    let body = json!({
        "message": format!("Allocated {size_mb} MB of memory"),
        "size_bytes": data.len(),
    });
    drop(data);

    (fields, Json(body)).into_response()
}

fn allocation_len(size_mb: u64, max_mb: u64) -> Result<usize, ApiError> {
    if size_mb > max_mb {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("size must be at most {max_mb} MB"),
        ));
    }

    size_mb
        .checked_mul(BYTES_PER_MB)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "size is too large"))
}
