use super::context::{ContextFields, RequestContext, ResponseDescriptor};
use super::hooks::HookManager;
use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::sync::Arc;

/// Axum adapter for [`HookManager`].
///
/// Install with `axum::middleware::from_fn_with_state(hooks, request_lifecycle)`
/// as a router-wide layer so that the 404 fallback is covered as well.
pub async fn request_lifecycle(
    State(hooks): State<Arc<HookManager>>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let mut ctx = RequestContext::new(request.method().as_str(), request.uri().path());
    hooks.run_before(&mut ctx);

    let mut response = next.run(request).await;

    if let Some(fields) = response.extensions_mut().remove::<ContextFields>() {
        ctx.attach(fields);
    }

    let descriptor = hooks.run_after(&ctx, ResponseDescriptor::new(response.status()));
    descriptor.apply_to(&mut response);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::create_memory_metrics;
    use crate::lifecycle::{EmissionPolicy, MetricNames};
    use anyhow::Result;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Extension, Json, Router,
    };
    use tower::ServiceExt;

    fn router(hooks: HookManager) -> Router {
        Router::new()
            .route(
                "/delay",
                get(|| async {
                    (
                        Extension(ContextFields::default().with_business_value(7.5)),
                        Json(serde_json::json!({ "ok": true })),
                    )
                }),
            )
            .route("/boom", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .layer(from_fn_with_state(Arc::new(hooks), request_lifecycle))
    }

    async fn call(app: Router, uri: &str) -> Response {
        app.oneshot(HttpRequest::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn handler_fields_reach_the_policy() {
        let sink = create_memory_metrics();
        let policy = Arc::new(EmissionPolicy::new(sink.clone(), "webapp", MetricNames::prometheus()));
        let mut hooks = HookManager::new();
        policy.install(&mut hooks);

        let response = call(router(hooks), "/delay?seconds=0").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.extensions().get::<ContextFields>().is_none());

        let gauge = sink
            .events()
            .into_iter()
            .find(|e| e.name == "business_value")
            .expect("business value gauge");
        assert_eq!(gauge.value, 7.5);
    }

    #[tokio::test]
    async fn fallback_and_error_responses_run_after_hooks() {
        let sink = create_memory_metrics();
        let policy = Arc::new(EmissionPolicy::new(sink.clone(), "webapp", MetricNames::statsd()));
        let mut hooks = HookManager::new();
        policy.install(&mut hooks);
        let app = router(hooks);

        assert_eq!(call(app.clone(), "/missing").await.status(), StatusCode::NOT_FOUND);
        assert_eq!(call(app, "/boom").await.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let errors: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.name == "error_count")
            .map(|e| (e.labels["endpoint"].clone(), e.labels["status"].clone()))
            .collect();
        assert_eq!(
            errors,
            vec![
                ("/missing".to_string(), "404".to_string()),
                ("/boom".to_string(), "500".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn after_hook_headers_are_applied_to_the_response() {
        let mut hooks = HookManager::new();
        hooks.register_after(
            |ctx: &RequestContext, mut response: ResponseDescriptor| -> Result<ResponseDescriptor> {
                response.headers.insert("x-endpoint", ctx.path().parse()?);
                Ok(response)
            },
        );

        let response = call(router(hooks), "/boom").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-endpoint"], "/boom");
    }
}
