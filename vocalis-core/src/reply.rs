//! The outbound reply builder.
//!
//! Every builder method borrows the current [`Reply`] and returns a new one, so
//! a partially built reply can be branched without either branch seeing the
//! other's changes:
//!
//! ```rust,ignore
//! let base = Reply::new(&request).card("Groceries", "Your list");
//! let empty = base.speak("Your list is empty.");
//! let full = base.speak_template(&LIST, &items).end_session(false);
//! ```

use crate::{
    error::{SkillError, SkillResult},
    request::{Identity, Request},
    slots::{Slot, Slots},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vocalis_speech::{LanguageTag, Template, TemplateContext};

/// Spoken when a template fails to render.
pub const TEMPLATE_APOLOGY: &str = "I'm sorry. I seem to have trouble with words, today.";

/// Directive type that asks the device to prompt for one slot.
pub const ELICIT_SLOT_DIRECTIVE: &str = "Dialog.ElicitSlot";

/// A reply to a [`Request`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    /// Envelope version, always `"1.0"` for built replies.
    pub version: String,
    /// Attributes the platform will send back on the next turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_attributes: Option<Map<String, Value>>,
    /// The reply proper.
    #[serde(rename = "response")]
    pub body: ReplyBody,
    #[serde(skip)]
    locale: LanguageTag,
    #[serde(skip)]
    identity: Identity,
}

/// The `response` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyBody {
    /// What the device says.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_speech: Option<OutputSpeech>,
    /// What the companion app or screen shows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,
    /// What the device says if the user stays silent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    /// Follow-up instructions for the device.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,
    /// Omitted only when explicitly cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

/// SSML speech.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpeech {
    /// Always `"SSML"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// The markup, wrapped in `<speak>`.
    pub ssml: String,
}

impl OutputSpeech {
    fn ssml(text_or_ssml: &str) -> Self {
        Self {
            kind: "SSML".into(),
            ssml: wrap_ssml(text_or_ssml),
        }
    }
}

/// A simple card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Always `"Simple"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Card title.
    pub title: String,
    /// Card body.
    pub content: String,
}

/// The reprompt section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    /// Reprompt speech.
    pub output_speech: OutputSpeech,
}

/// A device directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    /// Directive type, e.g. `Dialog.ElicitSlot`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Slot the device should prompt for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_to_elicit: Option<String>,
    /// Intent the answer is routed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_intent: Option<UpdatedIntent>,
}

/// The intent carried by an elicit directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedIntent {
    /// Target intent name.
    pub name: String,
    /// Always `"NONE"` for elicitation.
    pub confirmation_status: String,
    /// Carried-over slots.
    pub slots: Slots,
}

impl Reply {
    /// Begin a reply to `request`: version `1.0`, ending the session.
    pub fn new(request: &Request) -> Self {
        Self {
            version: "1.0".into(),
            session_attributes: None,
            body: ReplyBody {
                should_end_session: Some(true),
                ..ReplyBody::default()
            },
            locale: request.language(),
            identity: request.identity(),
        }
    }

    /// Whether the session should end after this reply.
    #[must_use]
    pub fn end_session(&self, flag: bool) -> Self {
        self.with_body(ReplyBody {
            should_end_session: Some(flag),
            ..self.body.clone()
        })
    }

    /// Leave the session flag out of the reply entirely.
    #[must_use]
    pub fn clear_end_session(&self) -> Self {
        self.with_body(ReplyBody {
            should_end_session: None,
            ..self.body.clone()
        })
    }

    /// Speak plain text or SSML.
    #[must_use]
    pub fn speak(&self, text_or_ssml: &str) -> Self {
        self.with_body(ReplyBody {
            output_speech: Some(OutputSpeech::ssml(text_or_ssml)),
            ..self.body.clone()
        })
    }

    /// Speak a template rendered for the request's locale.
    ///
    /// A render failure is logged and the fixed apology is spoken instead.
    #[must_use]
    pub fn speak_template<T: Serialize + ?Sized>(&self, template: &Template, value: &T) -> Self {
        let rendered = TemplateContext::new(self.locale.clone(), value)
            .and_then(|context| template.render(&context));
        match rendered {
            Ok(text) => self.speak(&text),
            Err(err) => {
                tracing::error!(
                    template = template.name().unwrap_or("<unnamed>"),
                    locale = %self.locale,
                    request_id = %self.identity.request_id,
                    error = %err,
                    "unable to speak template"
                );
                self.speak(TEMPLATE_APOLOGY)
            }
        }
    }

    /// Show a simple card.
    #[must_use]
    pub fn card(&self, title: &str, text: &str) -> Self {
        self.with_body(ReplyBody {
            card: Some(Card {
                kind: "Simple".into(),
                title: title.into(),
                content: text.into(),
            }),
            ..self.body.clone()
        })
    }

    /// Ask the device to prompt for `slot_name` and route the answer to
    /// `intent_name`, carrying over the request's other slots.
    ///
    /// Always keeps the session open.
    #[must_use]
    pub fn elicit_slot(&self, request: &Request, intent_name: &str, slot_name: &str) -> Self {
        let slots = request.slots().resolved().with(Slot::new(slot_name, ""));
        let mut directives = self.body.directives.clone();
        directives.push(Directive {
            kind: ELICIT_SLOT_DIRECTIVE.into(),
            slot_to_elicit: Some(slot_name.into()),
            updated_intent: Some(UpdatedIntent {
                name: intent_name.into(),
                confirmation_status: "NONE".into(),
                slots,
            }),
        });
        self.with_body(ReplyBody {
            directives,
            should_end_session: Some(false),
            ..self.body.clone()
        })
    }

    /// Speech used if the user does not answer.
    #[must_use]
    pub fn reprompt(&self, text_or_ssml: &str) -> Self {
        self.with_body(ReplyBody {
            reprompt: Some(Reprompt {
                output_speech: OutputSpeech::ssml(text_or_ssml),
            }),
            ..self.body.clone()
        })
    }

    /// Store a session attribute for the next turn.
    #[must_use]
    pub fn session_attribute(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut attributes = self.session_attributes.clone().unwrap_or_default();
        attributes.insert(key.into(), value.into());
        Self {
            session_attributes: Some(attributes),
            ..self.clone()
        }
    }

    /// Carry the request's session attributes into this reply. Attributes
    /// already set on the reply win.
    #[must_use]
    pub fn keep_session_attributes(&self, request: &Request) -> Self {
        let Some(incoming) = request.session_attributes().filter(|a| !a.is_empty()) else {
            return self.clone();
        };
        let mut attributes = incoming.clone();
        if let Some(own) = &self.session_attributes {
            attributes.extend(own.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Self {
            session_attributes: Some(attributes),
            ..self.clone()
        }
    }

    /// Finish with success.
    pub fn ok(self) -> SkillResult {
        Ok(self)
    }

    /// Finish with an unrecoverable failure.
    ///
    /// Reserve this for paths the skill cannot answer at all; a reply that
    /// apologizes is usually better.
    pub fn fail(message: impl Into<String>) -> SkillResult {
        Err(SkillError::Failed(message.into()))
    }

    /// The wrapped SSML being spoken, if any.
    pub fn speech(&self) -> Option<&str> {
        self.body.output_speech.as_ref().map(|s| s.ssml.as_str())
    }

    /// The wrapped reprompt SSML, if any.
    pub fn reprompt_speech(&self) -> Option<&str> {
        self.body
            .reprompt
            .as_ref()
            .map(|r| r.output_speech.ssml.as_str())
    }

    /// The session flag.
    pub fn should_end_session(&self) -> Option<bool> {
        self.body.should_end_session
    }

    /// Locale of the request this reply answers.
    pub fn locale(&self) -> &LanguageTag {
        &self.locale
    }

    /// Identity of the request this reply answers.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn with_body(&self, body: ReplyBody) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }
}

/// Wrap text in `<speak>` unless it already is SSML.
pub fn wrap_ssml(text_or_ssml: &str) -> String {
    if text_or_ssml.starts_with("<speak") {
        text_or_ssml.to_string()
    } else {
        format!("<speak>{text_or_ssml}</speak>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply() -> Reply {
        Reply::new(&Request::launch())
    }

    #[test]
    fn test_new_reply_defaults() {
        let r = reply();
        assert_eq!(r.version, "1.0");
        assert_eq!(r.should_end_session(), Some(true));
        assert!(r.body.output_speech.is_none());
        assert!(r.body.card.is_none());
        assert_eq!(r.identity(), &Request::launch().identity());
    }

    #[test]
    fn test_end_session_does_not_mutate() {
        let r = reply().end_session(false);
        assert_eq!(r.should_end_session(), Some(false));
        let flipped = r.end_session(true);
        assert_eq!(flipped.should_end_session(), Some(true));
        assert_eq!(r.should_end_session(), Some(false));
        assert_eq!(r.clear_end_session().should_end_session(), None);
    }

    #[test]
    fn test_speak_wraps_ssml_once() {
        let r = reply().speak("Hello");
        assert_eq!(r.speech(), Some("<speak>Hello</speak>"));
        assert!(r.body.card.is_none());

        let ssml = r.speak("<speak>The cow goes woof</speak>");
        assert_eq!(ssml.speech(), Some("<speak>The cow goes woof</speak>"));

        let _ = ssml.speak("Goodbye");
        assert_eq!(ssml.speech(), Some("<speak>The cow goes woof</speak>"));
        assert_eq!(wrap_ssml(&wrap_ssml("x")), wrap_ssml("x"));
    }

    #[test]
    fn test_speak_template_by_locale() {
        let t = Template::builder("Hello World {{ value }}")
            .translation("es", "Hola Mundo {{ value }}")
            .build()
            .unwrap();
        let run = |locale: &str| {
            Reply::new(&Request::launch().with_locale(locale))
                .speak_template(&t, "Foo")
                .speech()
                .map(str::to_string)
        };

        assert_eq!(run("").as_deref(), Some("<speak>Hello World Foo</speak>"));
        assert_eq!(run("en-US").as_deref(), Some("<speak>Hello World Foo</speak>"));
        assert_eq!(run("es-MX").as_deref(), Some("<speak>Hola Mundo Foo</speak>"));
        assert_eq!(run("es-ES").as_deref(), Some("<speak>Hola Mundo Foo</speak>"));
        assert_eq!(run("it-IT").as_deref(), Some("<speak>Hello World Foo</speak>"));
    }

    #[test]
    fn test_speak_template_failure_apologizes() {
        let t = Template::builder("{{ value.missing }}").build().unwrap();
        let r = reply().speak_template(&t, &json!({}));
        assert_eq!(r.speech(), Some(format!("<speak>{TEMPLATE_APOLOGY}</speak>").as_str()));
    }

    #[test]
    fn test_card() {
        let r = reply().card("", "");
        let card = r.body.card.clone().unwrap();
        assert_eq!(card.kind, "Simple");
        assert_eq!(card.title, "");

        let r = reply().card("Hello", "World, Bro");
        let _ = r.card("FOO", "BAR");
        let card = r.body.card.unwrap();
        assert_eq!(card.title, "Hello");
        assert_eq!(card.content, "World, Bro");
    }

    #[test]
    fn test_elicit_slot_forces_open_session() {
        let request = Request::for_intent(
            "Foo",
            [Slot::resolved("food", "za", "pizza"), Slot::new("size", "large")],
        );
        let r = Reply::new(&request)
            .end_session(true)
            .elicit_slot(&request, "Order", "size");

        assert_eq!(r.should_end_session(), Some(false));
        assert_eq!(r.body.directives.len(), 1);
        let directive = &r.body.directives[0];
        assert_eq!(directive.kind, ELICIT_SLOT_DIRECTIVE);
        assert_eq!(directive.slot_to_elicit.as_deref(), Some("size"));

        let intent = directive.updated_intent.as_ref().unwrap();
        assert_eq!(intent.name, "Order");
        assert_eq!(intent.confirmation_status, "NONE");
        assert_eq!(intent.slots.get("food"), Some(&Slot::new("food", "pizza")));
        assert_eq!(intent.slots.get("size"), Some(&Slot::new("size", "")));

        assert_eq!(request.slots().resolve("size"), "large");
    }

    #[test]
    fn test_elicit_slot_inserts_absent_slot() {
        let request = Request::for_intent("Foo", []);
        let r = reply().elicit_slot(&request, "Order", "size");
        let intent = r.body.directives[0].updated_intent.as_ref().unwrap();
        assert_eq!(intent.slots.len(), 1);
        assert_eq!(intent.slots.resolve("size"), "");
    }

    #[test]
    fn test_reprompt() {
        let r = reply().reprompt("Anything else?");
        assert_eq!(r.reprompt_speech(), Some("<speak>Anything else?</speak>"));
        assert!(r.speech().is_none());
    }

    #[test]
    fn test_session_attributes() {
        let request = Request::launch()
            .with_session_attribute("step", 1)
            .with_session_attribute("name", "bob");
        let r = reply()
            .session_attribute("step", 2)
            .keep_session_attributes(&request);
        let attributes = r.session_attributes.unwrap();
        assert_eq!(attributes.get("step"), Some(&json!(2)));
        assert_eq!(attributes.get("name"), Some(&json!("bob")));

        assert!(reply().keep_session_attributes(&Request::launch()).session_attributes.is_none());
    }

    #[test]
    fn test_ok_and_fail() {
        assert!(reply().speak("hi").ok().is_ok());
        assert!(matches!(Reply::fail("boom"), Err(SkillError::Failed(m)) if m == "boom"));
    }

    #[test]
    fn test_wire_shape() {
        let r = reply()
            .speak("Hi")
            .card("Title", "Body")
            .clear_end_session();
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({
                "version": "1.0",
                "response": {
                    "outputSpeech": {"type": "SSML", "ssml": "<speak>Hi</speak>"},
                    "card": {"type": "Simple", "title": "Title", "content": "Body"}
                }
            })
        );

        let ended = serde_json::to_value(reply()).unwrap();
        assert_eq!(ended["response"]["shouldEndSession"], json!(true));
    }
}
