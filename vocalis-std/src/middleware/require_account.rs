//! Account-link guard.

use vocalis_core::{
    Middleware, Next, Reply, Request, SkillResult,
    speech::Template,
};

/// Spoken by [`RequireAccount`] unless a template is supplied.
pub const DEFAULT_ACCOUNT_PROMPT: &str =
    "I'm sorry. You must connect your account using the Alexa app in order to use this feature.";

/// Lets a request through only when the user has linked an account.
///
/// Requests without an access token are answered directly with the guard's
/// template, rendered with the request as its value, and never reach the
/// handler.
#[derive(Debug, Clone)]
pub struct RequireAccount {
    template: Template,
}

impl RequireAccount {
    /// A guard that speaks [`DEFAULT_ACCOUNT_PROMPT`].
    pub fn new() -> Self {
        Self {
            template: Template::literal(DEFAULT_ACCOUNT_PROMPT),
        }
    }

    /// Speak `template` instead of the default prompt.
    #[must_use]
    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }
}

impl Default for RequireAccount {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for RequireAccount {
    async fn handle(&self, request: Request, next: Next) -> SkillResult {
        if request.access_token().is_some() {
            return next.run(request).await;
        }
        tracing::info!(
            request.id = request.request_id(),
            user.id = request.user_id(),
            device.id = request.device_id(),
            "missing user access token"
        );
        Reply::new(&request)
            .speak_template(&self.template, &request)
            .ok()
    }
}
