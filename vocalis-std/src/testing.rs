//! Testing utilities for Vocalis.
//!
//! Doubles for exercising routing and middleware without real handlers.
//!
//! # Features
//!
//! - [`CountingHandler`]: A handler that counts calls and speaks fixed text
//! - [`RecordingMiddleware`]: Middleware that records what passed through it
//! - [`ShortCircuit`]: Middleware that answers without calling the rest of the chain

use std::sync::{
    Arc, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use vocalis_core::{Handler, Middleware, Next, Reply, Request, SkillResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts its calls and speaks a fixed reply.
///
/// Clones share the counter, so keep one clone for assertions and hand the
/// other to the skill.
///
/// # Example
///
/// ```rust,ignore
/// let help = CountingHandler::speaking("Try adding milk.");
/// skill.route_intent(intents::HELP, help.clone());
///
/// skill.handle(Request::for_intent(intents::HELP, [])).await?;
/// assert_eq!(help.count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
    speech: Arc<str>,
}

impl CountingHandler {
    /// A counter that speaks `"ok"`.
    pub fn new() -> Self {
        Self::speaking("ok")
    }

    /// A counter that speaks `speech`.
    pub fn speaking(speech: impl Into<Arc<str>>) -> Self {
        Self {
            count: Arc::new(AtomicUsize::new(0)),
            speech: speech.into(),
        }
    }

    /// Number of calls so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Default for CountingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl Handler for CountingHandler {
    async fn call(&self, request: Request) -> SkillResult {
        self.count.fetch_add(1, Ordering::SeqCst);
        Reply::new(&request).speak(&self.speech).ok()
    }
}

// ============================================================================
// Recording Middleware
// ============================================================================

/// What a [`RecordingMiddleware`] saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    /// Label of the recorder that saw the request.
    pub label: String,
    /// Request id.
    pub request_id: String,
    /// Intent name, empty for non-intent requests.
    pub intent_name: String,
}

/// Middleware that records every request and then calls `next`.
///
/// Recorders created with [`labelled`](Self::labelled) share one log, which
/// makes the order of a chain observable.
///
/// # Example
///
/// ```rust,ignore
/// let outer = RecordingMiddleware::new("outer");
/// let inner = outer.labelled("inner");
/// let handler = Chain::new().with(outer.clone()).with(inner).then(CountingHandler::new());
///
/// handler.call(Request::launch()).await?;
/// assert_eq!(outer.labels(), vec!["outer", "inner"]);
/// ```
#[derive(Debug, Clone)]
pub struct RecordingMiddleware {
    label: String,
    log: Arc<Mutex<Vec<Recorded>>>,
}

impl RecordingMiddleware {
    /// A recorder with its own log.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            log: Arc::default(),
        }
    }

    /// Another recorder writing to the same log under a different label.
    pub fn labelled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            log: Arc::clone(&self.log),
        }
    }

    /// Everything recorded so far, in order.
    pub fn entries(&self) -> Vec<Recorded> {
        lock(&self.log).clone()
    }

    /// Labels of everything recorded so far, in order.
    pub fn labels(&self) -> Vec<String> {
        lock(&self.log).iter().map(|r| r.label.clone()).collect()
    }

    /// Number of entries recorded.
    pub fn count(&self) -> usize {
        lock(&self.log).len()
    }

    /// Clear the shared log.
    pub fn clear(&self) {
        lock(&self.log).clear();
    }
}

impl Middleware for RecordingMiddleware {
    async fn handle(&self, request: Request, next: Next) -> SkillResult {
        lock(&self.log).push(Recorded {
            label: self.label.clone(),
            request_id: request.request_id().to_string(),
            intent_name: request.intent_name().to_string(),
        });
        next.run(request).await
    }
}

// ============================================================================
// Short Circuit
// ============================================================================

/// Middleware that answers with fixed speech and never calls `next`.
#[derive(Debug, Clone)]
pub struct ShortCircuit {
    speech: Arc<str>,
    hits: Arc<AtomicUsize>,
}

impl ShortCircuit {
    /// Answer every request with `speech`.
    pub fn speaking(speech: impl Into<Arc<str>>) -> Self {
        Self {
            speech: speech.into(),
            hits: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of requests answered.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Middleware for ShortCircuit {
    async fn handle(&self, request: Request, _next: Next) -> SkillResult {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Reply::new(&request).speak(&self.speech).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vocalis_core::Chain;

    #[tokio::test]
    async fn test_counting_handler_shares_count() {
        let counter = CountingHandler::speaking("hello");
        let clone = counter.clone();
        let reply = clone.call(Request::launch()).await.unwrap();
        assert_eq!(reply.speech(), Some("<speak>hello</speak>"));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn test_recording_order() {
        let outer = RecordingMiddleware::new("outer");
        let inner = outer.labelled("inner");
        let handler = Chain::new()
            .with(outer.clone())
            .with(inner)
            .then(CountingHandler::new());

        handler.call(Request::for_intent("Moo", [])).await.unwrap();
        assert_eq!(outer.labels(), vec!["outer", "inner"]);
        assert_eq!(outer.entries()[0].intent_name, "Moo");

        outer.clear();
        assert_eq!(outer.count(), 0);
    }

    #[tokio::test]
    async fn test_short_circuit_never_reaches_handler() {
        let stop = ShortCircuit::speaking("closed");
        let counter = CountingHandler::new();
        let handler = Chain::new().with(stop.clone()).then(counter.clone());

        let reply = handler.call(Request::launch()).await.unwrap();
        assert_eq!(reply.speech(), Some("<speak>closed</speak>"));
        assert_eq!(stop.hits(), 1);
        assert_eq!(counter.count(), 0);
    }
}
