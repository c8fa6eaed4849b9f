use super::context::{RequestContext, ResponseDescriptor};
use anyhow::{anyhow, Result};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Callback run before the handler. May mutate the request context.
pub trait BeforeHook: Send + Sync {
    fn before(&self, ctx: &mut RequestContext) -> Result<()>;
}

impl<F> BeforeHook for F
where
    F: Fn(&mut RequestContext) -> Result<()> + Send + Sync,
{
    fn before(&self, ctx: &mut RequestContext) -> Result<()> {
        self(ctx)
    }
}

/// Callback run after the handler. Receives the response descriptor and
/// returns the descriptor the next hook (or the client) will see.
pub trait AfterHook: Send + Sync {
    fn after(&self, ctx: &RequestContext, response: ResponseDescriptor)
        -> Result<ResponseDescriptor>;
}

impl<F> AfterHook for F
where
    F: Fn(&RequestContext, ResponseDescriptor) -> Result<ResponseDescriptor> + Send + Sync,
{
    fn after(
        &self,
        ctx: &RequestContext,
        response: ResponseDescriptor,
    ) -> Result<ResponseDescriptor> {
        self(ctx, response)
    }
}

/// Ordered before/after callbacks wrapped around every request.
///
/// Hooks run exactly once per request, in registration order. A hook that
/// fails (returns `Err` or panics) stops the remaining hooks of the same
/// phase for that request only; the request itself always completes.
#[derive(Clone, Default)]
pub struct HookManager {
    before: Vec<Arc<dyn BeforeHook>>,
    after: Vec<Arc<dyn AfterHook>>,
}

impl HookManager {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_before(&mut self, hook: impl BeforeHook + 'static) -> &mut Self {
        self.before.push(Arc::new(hook));
        self
    }

    pub fn register_after(&mut self, hook: impl AfterHook + 'static) -> &mut Self {
        self.after.push(Arc::new(hook));
        self
    }

    pub fn before_count(&self) -> usize {
        self.before.len()
    }

    pub fn after_count(&self) -> usize {
        self.after.len()
    }

    /// Run all before-hooks against `ctx`.
    pub fn run_before(&self, ctx: &mut RequestContext) {
        // ---
        for (index, hook) in self.before.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| hook.before(ctx)))
                .unwrap_or_else(|_| Err(anyhow!("before-hook panicked")));

            if let Err(err) = outcome {
                tracing::warn!(
                    hook = index,
                    path = ctx.path(),
                    "Skipping remaining before-hooks: {err:#}"
                );
                return;
            }
        }
    }

    /// Run all after-hooks and return the descriptor to apply to the
    /// response. On failure the descriptor produced by the last successful
    /// hook is returned unchanged.
    pub fn run_after(&self, ctx: &RequestContext, response: ResponseDescriptor) -> ResponseDescriptor {
        // ---
        let mut current = response;

        for (index, hook) in self.after.iter().enumerate() {
            let input = current.clone();
            let outcome = catch_unwind(AssertUnwindSafe(|| hook.after(ctx, input)))
                .unwrap_or_else(|_| Err(anyhow!("after-hook panicked")));

            match outcome {
                Ok(next) => current = next,
                Err(err) => {
                    tracing::warn!(
                        hook = index,
                        path = ctx.path(),
                        status = current.status_code(),
                        "Skipping remaining after-hooks: {err:#}"
                    );
                    break;
                }
            }
        }

        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use axum::http::StatusCode;
    use std::sync::Mutex;

    fn recorder() -> Arc<Mutex<Vec<&'static str>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn push_after(
        log: &Arc<Mutex<Vec<&'static str>>>,
        name: &'static str,
    ) -> impl AfterHook + 'static {
        let log = Arc::clone(log);
        move |_: &RequestContext, response: ResponseDescriptor| -> Result<ResponseDescriptor> {
            log.lock().unwrap().push(name);
            Ok(response)
        }
    }

    #[test]
    fn before_hooks_run_in_registration_order() {
        let log = recorder();
        let mut hooks = HookManager::new();

        for name in ["start_timer", "track_active"] {
            let log = Arc::clone(&log);
            hooks.register_before(move |_: &mut RequestContext| -> Result<()> {
                log.lock().unwrap().push(name);
                Ok(())
            });
        }

        let mut ctx = RequestContext::new("GET", "/");
        hooks.run_before(&mut ctx);

        assert_eq!(*log.lock().unwrap(), vec!["start_timer", "track_active"]);
    }

    #[test]
    fn before_hook_can_stamp_the_context() {
        let mut hooks = HookManager::new();
        hooks.register_before(|ctx: &mut RequestContext| -> Result<()> {
            ctx.start_timer();
            Ok(())
        });

        let mut ctx = RequestContext::new("GET", "/");
        hooks.run_before(&mut ctx);

        assert!(ctx.elapsed().is_some());
    }

    #[test]
    fn after_hooks_run_in_registration_order_exactly_once() {
        let log = recorder();
        let mut hooks = HookManager::new();
        hooks
            .register_after(push_after(&log, "stop_timer"))
            .register_after(push_after(&log, "record_request_data"));

        let ctx = RequestContext::new("GET", "/");
        hooks.run_after(&ctx, ResponseDescriptor::new(StatusCode::OK));

        assert_eq!(*log.lock().unwrap(), vec!["stop_timer", "record_request_data"]);
    }

    #[test]
    fn after_hooks_can_replace_the_descriptor() {
        let mut hooks = HookManager::new();
        hooks.register_after(|_: &RequestContext, mut response: ResponseDescriptor| -> Result<ResponseDescriptor> {
            response.headers.insert("x-served-by", "webapp".parse()?);
            Ok(response)
        });

        let ctx = RequestContext::new("GET", "/");
        let descriptor = hooks.run_after(&ctx, ResponseDescriptor::new(StatusCode::OK));

        assert_eq!(descriptor.headers["x-served-by"], "webapp");
    }

    #[test]
    fn failing_after_hook_aborts_the_rest_and_keeps_last_descriptor() {
        let log = recorder();
        let mut hooks = HookManager::new();
        hooks
            .register_after(|_: &RequestContext, mut response: ResponseDescriptor| -> Result<ResponseDescriptor> {
                response.headers.insert("x-first", "1".parse()?);
                Ok(response)
            })
            .register_after(|_: &RequestContext, mut response: ResponseDescriptor| -> Result<ResponseDescriptor> {
                response.status = StatusCode::IM_A_TEAPOT;
                bail!("sink exploded")
            })
            .register_after(push_after(&log, "never"));

        let ctx = RequestContext::new("GET", "/error");
        let descriptor = hooks.run_after(&ctx, ResponseDescriptor::new(StatusCode::NOT_FOUND));

        assert_eq!(descriptor.status, StatusCode::NOT_FOUND);
        assert_eq!(descriptor.headers["x-first"], "1");
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn panicking_after_hook_is_isolated() {
        let log = recorder();
        let mut hooks = HookManager::new();
        hooks
            .register_after(|_: &RequestContext, _: ResponseDescriptor| -> Result<ResponseDescriptor> {
                panic!("hook bug")
            })
            .register_after(push_after(&log, "never"));

        let ctx = RequestContext::new("GET", "/");
        let descriptor = hooks.run_after(&ctx, ResponseDescriptor::new(StatusCode::CREATED));

        assert_eq!(descriptor.status, StatusCode::CREATED);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn failing_before_hook_skips_the_remaining_before_hooks() {
        let log = recorder();
        let mut hooks = HookManager::new();
        hooks.register_before(|_: &mut RequestContext| -> Result<()> {
            bail!("clock unavailable")
        });
        {
            let log = Arc::clone(&log);
            hooks.register_before(move |_: &mut RequestContext| -> Result<()> {
                log.lock().unwrap().push("never");
                Ok(())
            });
        }

        let mut ctx = RequestContext::new("GET", "/");
        hooks.run_before(&mut ctx);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(hooks.before_count(), 2);
    }
}
