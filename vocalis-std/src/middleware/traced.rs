//! Tracing span around the downstream chain.

use tracing::Instrument;
use vocalis_core::{Middleware, Next, Request, SkillResult};

/// Runs everything after it inside an `info` span.
///
/// The span is named `skill_request` and records the label given at
/// construction plus the request id, request type and intent name, so log
/// lines emitted by later middleware and the handler are tagged with them.
#[derive(Debug, Clone, Copy)]
pub struct Traced {
    label: &'static str,
}

impl Traced {
    /// A span tagged with `label`.
    pub const fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl Middleware for Traced {
    async fn handle(&self, request: Request, next: Next) -> SkillResult {
        let span = tracing::info_span!(
            "skill_request",
            label = %self.label,
            request.id = request.request_id(),
            request.kind = %request.kind(),
            intent.name = request.intent_name(),
        );
        next.run(request).instrument(span).await
    }
}
