//! # Middleware
//!
//! Middleware runs before a handler and decides whether the handler runs at
//! all. Calling [`Next::run`] passes the request on; returning without calling
//! it short-circuits everything downstream.
//!
//! A [`Chain`] is an ordered list of middleware. [`Chain::then`] composes it
//! around a handler so that the first middleware added is the outermost:
//!
//! ```rust,ignore
//! let guarded = Chain::new()
//!     .with(RequestLogger::new())
//!     .with(RequireAccount::new())
//!     .then(add_item);
//!
//! skill.route_intent("AddItem", guarded);
//! ```
//!
//! Chains are cheap to clone and can wrap any number of handlers.

use crate::{
    error::SkillResult,
    handler::{BoxHandler, Handler},
    request::Request,
};
use futures::future::BoxFuture;
use std::{fmt, future::Future, sync::Arc};

/// An interceptor in front of a handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a skill middleware",
    label = "missing `Middleware` implementation",
    note = "Middleware is `async fn(Request, Next) -> SkillResult` or implements `Middleware::handle`."
)]
pub trait Middleware: Send + Sync + 'static {
    /// Process a request, optionally passing it on with `next.run(request)`.
    fn handle(&self, request: Request, next: Next) -> impl Future<Output = SkillResult> + Send;
}

// Blanket impl for closures and async fns
impl<F, Fut> Middleware for F
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = SkillResult> + Send,
{
    fn handle(&self, request: Request, next: Next) -> impl Future<Output = SkillResult> + Send {
        (self)(request, next)
    }
}

/// Dynamic object-safe version of [`Middleware`].
pub trait DynMiddleware: Send + Sync + 'static {
    /// Process a request (dynamic dispatch version).
    fn handle_dyn(&self, request: Request, next: Next) -> BoxFuture<'_, SkillResult>;
}

impl<T: Middleware> DynMiddleware for T {
    fn handle_dyn(&self, request: Request, next: Next) -> BoxFuture<'_, SkillResult> {
        Box::pin(self.handle(request, next))
    }
}

/// The rest of the chain, ending in the handler.
#[derive(Clone, Debug)]
pub struct Next {
    rest: BoxHandler,
}

impl Next {
    /// Continue with `handler` as everything downstream.
    pub fn new(handler: BoxHandler) -> Self {
        Self { rest: handler }
    }

    /// Run the rest of the chain.
    pub async fn run(self, request: Request) -> SkillResult {
        self.rest.call(request).await
    }
}

/// An ordered list of middleware.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<Option<Arc<dyn DynMiddleware>>>,
}

impl Chain {
    /// An empty chain. Composing it yields the handler unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware.
    #[must_use]
    pub fn with(mut self, middleware: impl Middleware) -> Self {
        self.stages.push(Some(Arc::new(middleware)));
        self
    }

    /// Append a middleware that may be absent. Absent entries are skipped.
    #[must_use]
    pub fn with_optional<M: Middleware>(mut self, middleware: Option<M>) -> Self {
        self.stages
            .push(middleware.map(|m| Arc::new(m) as Arc<dyn DynMiddleware>));
        self
    }

    /// Number of middleware present.
    pub fn len(&self) -> usize {
        self.stages.iter().flatten().count()
    }

    /// Whether no middleware is present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Wrap `handler` in every middleware, first entry outermost.
    pub fn then(&self, handler: impl Handler) -> BoxHandler {
        self.stages
            .iter()
            .rev()
            .flatten()
            .fold(BoxHandler::new(handler), |next, middleware| {
                BoxHandler::new(Stage {
                    middleware: Arc::clone(middleware),
                    next,
                })
            })
    }
}

impl fmt::Debug for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("len", &self.len())
            .finish()
    }
}

struct Stage {
    middleware: Arc<dyn DynMiddleware>,
    next: BoxHandler,
}

impl Handler for Stage {
    async fn call(&self, request: Request) -> SkillResult {
        self.middleware
            .handle_dyn(request, Next::new(self.next.clone()))
            .await
    }
}
