//! Conditional middleware.

use vocalis_core::{Middleware, Next, Request, SkillResult};

/// Runs an inner middleware only when a predicate holds.
///
/// When the predicate is `false` the request goes straight to `next`.
///
/// # Example
///
/// ```rust,ignore
/// // Only list changes need a linked account.
/// let guard = When::new(
///     |request: &Request| request.intent_name() != "ReadList",
///     RequireAccount::new(),
/// );
/// ```
#[derive(Debug, Clone)]
pub struct When<P, M> {
    predicate: P,
    inner: M,
}

impl<P, M> When<P, M> {
    /// Run `inner` for requests matching `predicate`.
    pub const fn new(predicate: P, inner: M) -> Self {
        Self { predicate, inner }
    }
}

impl<P, M> Middleware for When<P, M>
where
    P: Fn(&Request) -> bool + Send + Sync + 'static,
    M: Middleware,
{
    async fn handle(&self, request: Request, next: Next) -> SkillResult {
        if (self.predicate)(&request) {
            self.inner.handle(request, next).await
        } else {
            next.run(request).await
        }
    }
}
