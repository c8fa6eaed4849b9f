//! Request lifecycle pipeline.
//!
//! Every inbound request flows through the same sequence:
//!
//! 1. the middleware builds a request-scoped [`RequestContext`]
//! 2. [`HookManager`] runs the registered before-hooks (start timer, ...)
//! 3. the route handler executes and may attach [`ContextFields`] to its response
//! 4. [`HookManager`] runs the registered after-hooks in registration order
//! 5. the [`EmissionPolicy`] hooks turn the finished request into metric events
//!
//! The hook manager and the policy know nothing about axum; only
//! `middleware.rs` does.

mod context;
mod hooks;
mod middleware;
mod policy;

pub use context::{ContextFields, RequestContext, ResponseDescriptor};
pub use hooks::{AfterHook, BeforeHook, HookManager};
pub use middleware::request_lifecycle;
pub use policy::{EmissionPolicy, MetricNames, BYTES_PER_MB, DATABASE_ENDPOINTS};
