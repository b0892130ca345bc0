//! Request start/finish logging.

use std::time::Instant;
use vocalis_core::{Middleware, Next, Request, SkillResult};

/// Logs the start and end of every request it sees.
///
/// Each entry carries the request id, user id and device id; the start entry
/// adds the intent name and resolved slot values, the finish entry adds the
/// elapsed time and any error. The full request JSON and the reply speech may
/// contain personal data, so they are only logged when switched on.
///
/// # Example
///
/// ```rust,ignore
/// let chain = Chain::new().with(RequestLogger::new().with_response_speech());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger {
    request_json: bool,
    response_speech: bool,
}

impl RequestLogger {
    /// A logger with the optional fields switched off.
    pub const fn new() -> Self {
        Self {
            request_json: false,
            response_speech: false,
        }
    }

    /// Include the whole request as JSON in the start entry.
    #[must_use]
    pub const fn with_request_json(mut self) -> Self {
        self.request_json = true;
        self
    }

    /// Include the reply's SSML in the finish entry.
    #[must_use]
    pub const fn with_response_speech(mut self) -> Self {
        self.response_speech = true;
        self
    }

    fn log_start(&self, request: &Request) {
        let request_json = if self.request_json {
            serde_json::to_string(request).ok()
        } else {
            None
        };
        tracing::info!(
            request.id = request.request_id(),
            user.id = request.user_id(),
            device.id = request.device_id(),
            intent.name = request.intent().map(|i| i.name.as_str()),
            intent.slots = %slot_summary(request),
            request.json = request_json.as_deref(),
            "request started"
        );
    }

    fn log_finish(&self, request: &Request, result: &SkillResult, started: Instant) {
        let elapsed = started.elapsed();
        let speech = match result {
            Ok(reply) if self.response_speech => reply.speech(),
            _ => None,
        };
        let error = result.as_ref().err().map(ToString::to_string);
        tracing::info!(
            request.id = request.request_id(),
            user.id = request.user_id(),
            device.id = request.device_id(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            elapsed = ?elapsed,
            error = error.as_deref(),
            response.speech = speech,
            "request complete"
        );
    }
}

impl Middleware for RequestLogger {
    async fn handle(&self, request: Request, next: Next) -> SkillResult {
        self.log_start(&request);
        let started = Instant::now();
        let logged = request.clone();
        let result = next.run(request).await;
        self.log_finish(&logged, &result, started);
        result
    }
}

/// `name=value` pairs of resolved slot values, sorted by name.
fn slot_summary(request: &Request) -> String {
    let mut pairs: Vec<String> = request
        .slots()
        .iter()
        .map(|slot| format!("{}={}", slot.name, slot.resolve()))
        .collect();
    pairs.sort();
    pairs.join(" ")
}
