//! # vocalis-core
//!
//! Request model, reply builder and dispatch for voice skill backends.
//!
//! Processing one request is a single pass:
//!
//! ```text
//! Request ──▶ Skill (route by type / intent) ──▶ Chain (middleware) ──▶ Handler ──▶ Reply
//! ```
//!
//! - [`Request`] - The inbound event, decoded with `serde`
//! - [`Slots`] - Slot values with entity resolution
//! - [`Reply`] - Immutable reply builder
//! - [`Handler`] / [`Middleware`] - Async processing traits, implemented by closures
//! - [`Chain`] - Ordered middleware composed around a handler
//! - [`Skill`] - The router
//!
//! # Error Types
//!
//! - [`SkillError`] - Dispatch and handler failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
mod handler;
pub mod intents;
mod middleware;
mod reply;
mod request;
mod skill;
mod slots;

// Re-exports
pub use error::{BoxError, SkillError, SkillResult};
pub use handler::{BoxHandler, DynHandler, Handler};
pub use middleware::{Chain, DynMiddleware, Middleware, Next};
pub use reply::{
    Card, Directive, ELICIT_SLOT_DIRECTIVE, OutputSpeech, Reply, ReplyBody, Reprompt,
    TEMPLATE_APOLOGY, UpdatedIntent, wrap_ssml,
};
pub use request::{
    Application, AudioPlayer, Context, Device, Identity, Intent, Request, RequestBody,
    RequestType, Session, System, User,
};
pub use skill::Skill;
pub use slots::{
    ER_SUCCESS_MATCH, ResolutionAuthority, ResolutionStatus, ResolutionValue, ResolutionValues,
    Resolutions, Slot, Slots,
};
pub use vocalis_speech as speech;
