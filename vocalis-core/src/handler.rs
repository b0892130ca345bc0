//! # Handler
//!
//! The terminal point of request processing: a handler receives the request
//! and produces a [`Reply`](crate::Reply) or an error.
//!
//! # Usage Patterns
//!
//! 1. **Async fn**: `async fn help(request: Request) -> SkillResult { ... }`
//! 2. **Closure**: `|request: Request| async move { Reply::new(&request).speak("Hi").ok() }`
//! 3. **Struct implementation**: `impl Handler for MyHandler`
//!
//! Handlers are stored type-erased as [`BoxHandler`].

use crate::{error::SkillResult, request::Request};
use futures::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};

/// Produces a reply for a request.
///
/// This trait uses native `async fn` for static dispatch. For storage in
/// routing tables use [`DynHandler`] through [`BoxHandler`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle skill requests",
    label = "missing `Handler` implementation",
    note = "Handlers are `async fn(Request) -> SkillResult` or implement `Handler::call`."
)]
pub trait Handler: Send + Sync + 'static {
    /// Handle one request.
    fn call(&self, request: Request) -> impl Future<Output = SkillResult> + Send;
}

// Blanket impl for closures and async fns
impl<F, Fut> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SkillResult> + Send,
{
    fn call(&self, request: Request) -> impl Future<Output = SkillResult> + Send {
        (self)(request)
    }
}

/// Dynamic object-safe version of [`Handler`].
pub trait DynHandler: Send + Sync + 'static {
    /// Handle one request (dynamic dispatch version).
    fn call_dyn(&self, request: Request) -> BoxFuture<'_, SkillResult>;
}

impl<T: Handler> DynHandler for T {
    fn call_dyn(&self, request: Request) -> BoxFuture<'_, SkillResult> {
        Box::pin(self.call(request))
    }
}

/// A shared, type-erased handler.
#[derive(Clone)]
pub struct BoxHandler(Arc<dyn DynHandler>);

impl BoxHandler {
    /// Erase a handler's type.
    pub fn new(handler: impl Handler) -> Self {
        Self(Arc::new(handler))
    }
}

impl Handler for BoxHandler {
    async fn call(&self, request: Request) -> SkillResult {
        self.0.call_dyn(request).await
    }
}

impl fmt::Debug for BoxHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxHandler(..)")
    }
}
