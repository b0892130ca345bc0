//! The inbound event.
//!
//! [`Request`] mirrors the JSON envelope a voice platform posts to a skill
//! backend. Field names follow the wire format through `serde` renames, so a
//! request can be decoded straight from the body the transport received.
//!
//! Most handlers only need the accessors: [`Request::intent_name`],
//! [`Request::slots`], [`Request::language`] and the identity fields. The
//! fixtures ([`Request::launch`], [`Request::for_intent`], ...) build requests
//! for tests.

use crate::slots::{Slot, Slots};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{fmt, sync::LazyLock};
use vocalis_speech::LanguageTag;

static NO_SLOTS: LazyLock<Slots> = LazyLock::new(Slots::new);

/// Kind of interaction carried by a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    /// The user opened the skill without asking for anything (`LaunchRequest`).
    Launch,
    /// The user asked for something specific (`IntentRequest`).
    Intent,
    /// The platform asks whether the skill could handle an intent
    /// (`CanFulfillIntentRequest`).
    CanFulfillIntent,
    /// Any other request type, kept verbatim.
    Other(String),
}

impl RequestType {
    /// The wire name of this request type.
    pub fn as_str(&self) -> &str {
        match self {
            RequestType::Launch => "LaunchRequest",
            RequestType::Intent => "IntentRequest",
            RequestType::CanFulfillIntent => "CanFulfillIntentRequest",
            RequestType::Other(other) => other,
        }
    }
}

impl Default for RequestType {
    fn default() -> Self {
        RequestType::Other(String::new())
    }
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "LaunchRequest" => RequestType::Launch,
            "IntentRequest" => RequestType::Intent,
            "CanFulfillIntentRequest" => RequestType::CanFulfillIntent,
            _ => RequestType::Other(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        match value {
            RequestType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An inbound skill request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Envelope version.
    #[serde(default)]
    pub version: String,
    /// Session data. Absent for out-of-session requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    /// The request proper.
    #[serde(rename = "request")]
    pub body: RequestBody,
    /// Device and platform state.
    #[serde(default)]
    pub context: Context,
}

/// Session section of a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Whether this request opened the session.
    #[serde(default)]
    pub new: bool,
    /// Session identifier.
    #[serde(default)]
    pub session_id: String,
    /// Skill the session belongs to.
    #[serde(default)]
    pub application: Application,
    /// Attributes the skill returned on the previous turn.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attributes: Map<String, Value>,
    /// Account that owns the device.
    #[serde(default)]
    pub user: User,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The `request` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// Request type.
    #[serde(rename = "type")]
    pub kind: RequestType,
    /// Unique id of this request.
    #[serde(default)]
    pub request_id: String,
    /// ISO 8601 timestamp set by the platform.
    #[serde(default)]
    pub timestamp: String,
    /// Locale tag such as `en-US`.
    #[serde(default)]
    pub locale: String,
    /// The intent, present on intent and can-fulfill requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    /// Reason a session ended, when applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Dialog state for multi-turn dialogs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog_state: Option<String>,
}

/// An intent and its slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intent {
    /// Intent name.
    pub name: String,
    /// Slot values.
    #[serde(default)]
    pub slots: Slots,
    /// `NONE`, `CONFIRMED` or `DENIED`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<String>,
}

/// The `context` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// Platform state.
    #[serde(rename = "System", default)]
    pub system: System,
    /// Audio player state, present on devices that play audio.
    #[serde(
        rename = "AudioPlayer",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub audio_player: Option<AudioPlayer>,
}

/// The `context.System` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct System {
    /// Account that owns the device.
    #[serde(default)]
    pub user: User,
    /// Device the request came from.
    #[serde(default)]
    pub device: Device,
    /// Skill being invoked.
    #[serde(default)]
    pub application: Application,
    /// Base URL of the platform API.
    #[serde(default)]
    pub api_endpoint: String,
    /// Token for calling the platform API.
    #[serde(default)]
    pub api_access_token: String,
}

/// Audio player state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayer {
    /// `IDLE`, `PLAYING`, ...
    #[serde(default)]
    pub player_activity: String,
    /// Token of the current stream.
    #[serde(default)]
    pub token: String,
    /// Playback offset.
    #[serde(default)]
    pub offset_in_milliseconds: u64,
}

/// Skill identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Skill id.
    #[serde(rename = "applicationId", default)]
    pub application_id: String,
}

/// User identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User id.
    #[serde(default)]
    pub user_id: String,
    /// Account-linking token, when the user linked an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Device identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device id.
    #[serde(default)]
    pub device_id: String,
    /// Interfaces the device supports.
    #[serde(default)]
    pub supported_interfaces: Map<String, Value>,
}

/// The identifying fields of a request, bundled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Request id.
    pub request_id: String,
    /// User id.
    pub user_id: String,
    /// Account-linking token.
    pub access_token: Option<String>,
    /// Device id.
    pub device_id: String,
    /// Skill id.
    pub skill_id: String,
    /// Session id.
    pub session_id: String,
    /// Raw locale tag.
    pub locale: String,
}

impl Request {
    /// The request type.
    pub fn kind(&self) -> &RequestType {
        &self.body.kind
    }

    /// Unique id of this request.
    pub fn request_id(&self) -> &str {
        &self.body.request_id
    }

    /// User id, from `context.System` or else the session.
    pub fn user_id(&self) -> &str {
        non_empty(&self.context.system.user.user_id)
            .or_else(|| self.session.as_ref().map(|s| s.user.user_id.as_str()))
            .unwrap_or_default()
    }

    /// Account-linking token, from `context.System` or else the session.
    pub fn access_token(&self) -> Option<&str> {
        self.context
            .system
            .user
            .access_token
            .as_deref()
            .and_then(non_empty)
            .or_else(|| {
                self.session
                    .as_ref()
                    .and_then(|s| s.user.access_token.as_deref())
                    .and_then(non_empty)
            })
    }

    /// Device id.
    pub fn device_id(&self) -> &str {
        &self.context.system.device.device_id
    }

    /// Skill id, from `context.System` or else the session.
    pub fn skill_id(&self) -> &str {
        non_empty(&self.context.system.application.application_id)
            .or_else(|| {
                self.session
                    .as_ref()
                    .map(|s| s.application.application_id.as_str())
            })
            .unwrap_or_default()
    }

    /// Session id, empty outside of a session.
    pub fn session_id(&self) -> &str {
        self.session
            .as_ref()
            .map(|s| s.session_id.as_str())
            .unwrap_or_default()
    }

    /// Attributes the skill stored on the previous turn.
    pub fn session_attributes(&self) -> Option<&Map<String, Value>> {
        self.session.as_ref().map(|s| &s.attributes)
    }

    /// The raw locale tag.
    pub fn locale(&self) -> &str {
        &self.body.locale
    }

    /// The parsed locale. A missing or malformed tag yields the root tag.
    pub fn language(&self) -> LanguageTag {
        LanguageTag::parse(&self.body.locale).unwrap_or_default()
    }

    /// The intent, if any.
    pub fn intent(&self) -> Option<&Intent> {
        self.body.intent.as_ref()
    }

    /// The intent name, empty when there is no intent.
    pub fn intent_name(&self) -> &str {
        self.intent().map(|i| i.name.as_str()).unwrap_or_default()
    }

    /// The intent's slots; empty when there is no intent.
    pub fn slots(&self) -> &Slots {
        self.intent().map(|i| &i.slots).unwrap_or(&*NO_SLOTS)
    }

    /// All identifying fields at once.
    pub fn identity(&self) -> Identity {
        Identity {
            request_id: self.request_id().to_string(),
            user_id: self.user_id().to_string(),
            access_token: self.access_token().map(str::to_string),
            device_id: self.device_id().to_string(),
            skill_id: self.skill_id().to_string(),
            session_id: self.session_id().to_string(),
            locale: self.locale().to_string(),
        }
    }
}

// ============================================================================
// Fixtures
// ============================================================================

impl Request {
    fn fixture(kind: RequestType, intent: Option<Intent>) -> Self {
        let user = User {
            user_id: "amzn1.ask.account.test".into(),
            access_token: None,
        };
        let application = Application {
            application_id: "amzn1.ask.skill.test".into(),
        };
        Self {
            version: "1.0".into(),
            session: Some(Session {
                new: true,
                session_id: "amzn1.echo-api.session.test".into(),
                application: application.clone(),
                attributes: Map::new(),
                user: user.clone(),
            }),
            body: RequestBody {
                kind,
                request_id: "amzn1.echo-api.request.test".into(),
                timestamp: String::new(),
                locale: "en-US".into(),
                intent,
                reason: None,
                dialog_state: None,
            },
            context: Context {
                system: System {
                    user,
                    device: Device {
                        device_id: "amzn1.ask.device.test".into(),
                        supported_interfaces: Map::new(),
                    },
                    application,
                    api_endpoint: "https://api.amazonalexa.com".into(),
                    api_access_token: String::new(),
                },
                audio_player: None,
            },
        }
    }

    /// A `LaunchRequest` with test identities and locale `en-US`.
    pub fn launch() -> Self {
        Self::fixture(RequestType::Launch, None)
    }

    /// An `IntentRequest` for `name` carrying `slots`.
    pub fn for_intent(name: impl Into<String>, slots: impl IntoIterator<Item = Slot>) -> Self {
        Self::fixture(RequestType::Intent, Some(fixture_intent(name, slots)))
    }

    /// A `CanFulfillIntentRequest` for `name` carrying `slots`.
    pub fn can_fulfill_intent(
        name: impl Into<String>,
        slots: impl IntoIterator<Item = Slot>,
    ) -> Self {
        Self::fixture(
            RequestType::CanFulfillIntent,
            Some(fixture_intent(name, slots)),
        )
    }

    /// Replace the locale tag.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.body.locale = locale.into();
        self
    }

    /// Replace the user id in both the system context and the session.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        if let Some(session) = &mut self.session {
            session.user.user_id = user_id.clone();
        }
        self.context.system.user.user_id = user_id;
        self
    }

    /// Set the account-linking token in both the system context and the session.
    #[must_use]
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        if let Some(session) = &mut self.session {
            session.user.access_token = Some(token.clone());
        }
        self.context.system.user.access_token = Some(token);
        self
    }

    /// Replace the device id.
    #[must_use]
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.context.system.device.device_id = device_id.into();
        self
    }

    /// Replace the session id, opening a session if there is none.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session.get_or_insert_with(Session::default).session_id = session_id.into();
        self
    }

    /// Store a session attribute, opening a session if there is none.
    #[must_use]
    pub fn with_session_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.session
            .get_or_insert_with(Session::default)
            .attributes
            .insert(key.into(), value.into());
        self
    }
}

fn fixture_intent(name: impl Into<String>, slots: impl IntoIterator<Item = Slot>) -> Intent {
    Intent {
        name: name.into(),
        slots: slots.into_iter().collect(),
        confirmation_status: Some("NONE".into()),
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}
