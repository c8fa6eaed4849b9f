use axum::http::{HeaderMap, StatusCode};
use std::time::{Duration, Instant};

/// Typed fields a handler can attach to its request.
///
/// Handlers return this as a response extension, e.g.
/// `(Extension(ContextFields::default().with_business_value(v)), Json(body))`,
/// and the lifecycle middleware moves it into the [`RequestContext`] before
/// any after-hook runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextFields {
    /// Value computed by `/delay`.
    pub business_value: Option<f64>,

    /// Wall-clock seconds spent in the `/cpu-intensive` loop.
    pub cpu_execution_seconds: Option<f64>,

    /// Megabytes allocated by `/memory-usage`.
    pub memory_size_mb: Option<u64>,

    /// Business operation performed by `/business-metrics`.
    pub operation: Option<String>,
}

impl ContextFields {
    // ---
    pub fn with_business_value(mut self, value: f64) -> Self {
        self.business_value = Some(value);
        self
    }

    pub fn with_cpu_execution_seconds(mut self, seconds: f64) -> Self {
        self.cpu_execution_seconds = Some(seconds);
        self
    }

    pub fn with_memory_size_mb(mut self, size_mb: u64) -> Self {
        self.memory_size_mb = Some(size_mb);
        self
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

/// Per-request state shared by the hooks of a single request.
///
/// Created by the middleware when the request arrives and dropped once the
/// after-hooks have run. It is never stored anywhere else, so nothing in it
/// can leak into another request's metrics.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: String,
    path: String,
    started_at: Option<Instant>,
    fields: ContextFields,
}

impl RequestContext {
    // ---
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            started_at: None,
            fields: ContextFields::default(),
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn fields(&self) -> &ContextFields {
        &self.fields
    }

    /// Stamp the request start time.
    pub fn start_timer(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Time since [`start_timer`](Self::start_timer), or `None` if the timer
    /// was never started.
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| start.elapsed())
    }

    /// Merge handler-attached fields; values present in `fields` win.
    pub fn attach(&mut self, fields: ContextFields) {
        let ContextFields {
            business_value,
            cpu_execution_seconds,
            memory_size_mb,
            operation,
        } = fields;

        self.fields.business_value = business_value.or(self.fields.business_value);
        self.fields.cpu_execution_seconds =
            cpu_execution_seconds.or(self.fields.cpu_execution_seconds);
        self.fields.memory_size_mb = memory_size_mb.or(self.fields.memory_size_mb);
        if operation.is_some() {
            self.fields.operation = operation;
        }
    }
}

/// What the after-hooks see of a response: its status and any headers they
/// want to add. The body stays with the framework and is never touched.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseDescriptor {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// True for any 4xx or 5xx status.
    pub fn is_error(&self) -> bool {
        (400..600).contains(&self.status_code())
    }

    /// Copy the (possibly hook-modified) status and added headers onto a
    /// framework response.
    pub fn apply_to<B>(self, response: &mut axum::http::Response<B>) {
        *response.status_mut() = self.status;
        response.headers_mut().extend(self.headers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_is_none_until_timer_started() {
        let mut ctx = RequestContext::new("GET", "/delay");
        assert!(ctx.elapsed().is_none());

        ctx.start_timer();
        assert!(ctx.elapsed().is_some());
    }

    #[test]
    fn attach_keeps_existing_values_when_new_ones_are_absent() {
        let mut ctx = RequestContext::new("GET", "/cpu-intensive");
        ctx.attach(ContextFields::default().with_cpu_execution_seconds(0.25));
        ctx.attach(ContextFields::default().with_operation("checkout"));

        assert_eq!(ctx.fields().cpu_execution_seconds, Some(0.25));
        assert_eq!(ctx.fields().operation.as_deref(), Some("checkout"));
        assert_eq!(ctx.fields().business_value, None);
    }

    #[test]
    fn error_classification_covers_4xx_and_5xx_only() {
        assert!(!ResponseDescriptor::new(StatusCode::OK).is_error());
        assert!(!ResponseDescriptor::new(StatusCode::PERMANENT_REDIRECT).is_error());
        assert!(ResponseDescriptor::new(StatusCode::BAD_REQUEST).is_error());
        assert!(ResponseDescriptor::new(StatusCode::NOT_FOUND).is_error());
        assert!(ResponseDescriptor::new(StatusCode::INTERNAL_SERVER_ERROR).is_error());
    }

    #[test]
    fn apply_to_overwrites_status_and_adds_headers() {
        let mut descriptor = ResponseDescriptor::new(StatusCode::ACCEPTED);
        descriptor
            .headers
            .insert("x-request-path", "/delay".parse().unwrap());

        let mut response = axum::http::Response::new(());
        descriptor.apply_to(&mut response);

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers()["x-request-path"], "/delay");
    }
}
