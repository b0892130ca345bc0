//! # Skill
//!
//! The router. A [`Skill`] maps each inbound request to exactly one handler:
//!
//! | Request type | Handler | Error when missing |
//! |--------------|---------|--------------------|
//! | `IntentRequest` | registered for the intent name | [`UnknownIntent`] |
//! | `CanFulfillIntentRequest` | [`Skill::can_fulfill_intent`] | [`NoHandlerRegistered`] |
//! | `LaunchRequest` | [`Skill::launch`] | [`NoHandlerRegistered`] |
//! | anything else | none | [`UnsupportedRequestType`] |
//!
//! Registration happens once at startup; afterwards the skill is only read and
//! can serve concurrent requests.
//!
//! [`UnknownIntent`]: SkillError::UnknownIntent
//! [`NoHandlerRegistered`]: SkillError::NoHandlerRegistered
//! [`UnsupportedRequestType`]: SkillError::UnsupportedRequestType

use crate::{
    error::{SkillError, SkillResult},
    handler::{BoxHandler, Handler},
    request::{Request, RequestType},
};
use std::collections::HashMap;

/// Routes requests to handlers.
#[derive(Debug, Clone, Default)]
pub struct Skill {
    name: String,
    intents: HashMap<String, BoxHandler>,
    launch: Option<BoxHandler>,
    can_fulfill: Option<BoxHandler>,
}

impl Skill {
    /// An unnamed skill with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A skill with a name used in log output.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The skill's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle `IntentRequest`s for `intent_name`. Registering a name twice
    /// replaces the first handler.
    pub fn route_intent(
        &mut self,
        intent_name: impl Into<String>,
        handler: impl Handler,
    ) -> &mut Self {
        let intent_name = intent_name.into();
        if self
            .intents
            .insert(intent_name.clone(), BoxHandler::new(handler))
            .is_some()
        {
            tracing::warn!(skill = %self.name, intent = %intent_name, "intent handler replaced");
        }
        self
    }

    /// Handle `LaunchRequest`s.
    pub fn launch(&mut self, handler: impl Handler) -> &mut Self {
        self.launch = Some(BoxHandler::new(handler));
        self
    }

    /// Handle `CanFulfillIntentRequest`s.
    pub fn can_fulfill_intent(&mut self, handler: impl Handler) -> &mut Self {
        self.can_fulfill = Some(BoxHandler::new(handler));
        self
    }

    /// Whether any handler has been registered.
    pub fn is_configured(&self) -> bool {
        !self.intents.is_empty() || self.launch.is_some() || self.can_fulfill.is_some()
    }

    /// Registered intent names, sorted.
    pub fn intent_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.intents.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Dispatch one request.
    pub async fn handle(&self, request: Request) -> SkillResult {
        let handler = self.route(&request)?;
        tracing::debug!(
            skill = %self.name,
            request_type = %request.kind(),
            intent = request.intent_name(),
            request_id = request.request_id(),
            "dispatching request"
        );
        handler.call(request).await
    }

    /// Decode a JSON request, dispatch it, and encode the reply.
    pub async fn handle_json(&self, body: &[u8]) -> Result<Vec<u8>, SkillError> {
        let request: Request = serde_json::from_slice(body).map_err(SkillError::Decode)?;
        let reply = self.handle(request).await?;
        serde_json::to_vec(&reply).map_err(SkillError::Encode)
    }

    fn route(&self, request: &Request) -> Result<&BoxHandler, SkillError> {
        match request.kind() {
            RequestType::Intent => {
                let intent = request.intent().ok_or_else(|| {
                    SkillError::MalformedRequest("IntentRequest is missing intent data".into())
                })?;
                self.intents
                    .get(&intent.name)
                    .ok_or_else(|| SkillError::UnknownIntent(intent.name.clone()))
            }
            RequestType::CanFulfillIntent => self
                .can_fulfill
                .as_ref()
                .ok_or(SkillError::NoHandlerRegistered(RequestType::CanFulfillIntent)),
            RequestType::Launch => self
                .launch
                .as_ref()
                .ok_or(SkillError::NoHandlerRegistered(RequestType::Launch)),
            RequestType::Other(other) => Err(SkillError::UnsupportedRequestType(other.clone())),
        }
    }
}

impl Handler for Skill {
    async fn call(&self, request: Request) -> SkillResult {
        self.handle(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Reply, Slot, intents};
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    fn speaker(text: &'static str, calls: &Arc<AtomicUsize>) -> impl Handler {
        let calls = calls.clone();
        move |request: Request| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Reply::new(&request).speak(text).ok() }
        }
    }

    fn skill(calls: &Arc<AtomicUsize>) -> Skill {
        let mut skill = Skill::named("test");
        skill
            .route_intent("Foo", speaker("foo", calls))
            .route_intent(intents::HELP, speaker("help", calls))
            .launch(speaker("launch", calls))
            .can_fulfill_intent(speaker("yes", calls));
        skill
    }

    #[test]
    fn test_configuration_state() {
        let calls = Arc::default();
        assert!(!Skill::new().is_configured());
        let s = skill(&calls);
        assert!(s.is_configured());
        assert_eq!(s.intent_names(), vec!["AMAZON.HelpIntent", "Foo"]);
        assert_eq!(s.name(), "test");
    }

    #[tokio::test]
    async fn test_routes_by_type_and_name() {
        let calls = Arc::default();
        let s = skill(&calls);

        let reply = s.handle(Request::for_intent("Foo", [])).await.unwrap();
        assert_eq!(reply.speech(), Some("<speak>foo</speak>"));

        let reply = s.handle(Request::for_intent(intents::HELP, [])).await.unwrap();
        assert_eq!(reply.speech(), Some("<speak>help</speak>"));

        let reply = s.handle(Request::launch()).await.unwrap();
        assert_eq!(reply.speech(), Some("<speak>launch</speak>"));

        let reply = s
            .handle(Request::can_fulfill_intent("Foo", [Slot::new("a", "b")]))
            .await
            .unwrap();
        assert_eq!(reply.speech(), Some("<speak>yes</speak>"));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_unknown_intent_has_no_side_effects() {
        let calls = Arc::default();
        let s = skill(&calls);
        let err = s.handle(Request::for_intent("Nope", [])).await.unwrap_err();
        assert!(matches!(err, SkillError::UnknownIntent(ref n) if n == "Nope"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_intent_payload() {
        let calls = Arc::default();
        let mut request = Request::for_intent("Foo", []);
        request.body.intent = None;
        let err = skill(&calls).handle(request).await.unwrap_err();
        assert!(matches!(err, SkillError::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn test_unregistered_request_types() {
        let s = Skill::new();
        assert!(matches!(
            s.handle(Request::launch()).await,
            Err(SkillError::NoHandlerRegistered(RequestType::Launch))
        ));
        assert!(matches!(
            s.handle(Request::can_fulfill_intent("Foo", [])).await,
            Err(SkillError::NoHandlerRegistered(RequestType::CanFulfillIntent))
        ));

        let mut request = Request::launch();
        request.body.kind = RequestType::Other("SessionEndedRequest".into());
        assert!(matches!(
            s.handle(request).await,
            Err(SkillError::UnsupportedRequestType(ref t)) if t == "SessionEndedRequest"
        ));
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let calls = Arc::default();
        let mut s = skill(&calls);
        s.route_intent("Foo", speaker("second", &calls));
        let reply = s.handle(Request::for_intent("Foo", [])).await.unwrap();
        assert_eq!(reply.speech(), Some("<speak>second</speak>"));
    }

    #[tokio::test]
    async fn test_handle_json() {
        let calls = Arc::default();
        let s = skill(&calls);
        let body = serde_json::to_vec(&Request::for_intent("Foo", [])).unwrap();
        let out = s.handle_json(&body).await.unwrap();
        let out: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(out["response"]["outputSpeech"]["ssml"], "<speak>foo</speak>");

        assert!(matches!(
            s.handle_json(b"{not json").await,
            Err(SkillError::Decode(_))
        ));
    }
}
