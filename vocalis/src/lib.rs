//! # vocalis - Voice Skill Backend Framework
//!
//! `vocalis` turns a decoded voice-assistant request into a reply. A [`Skill`]
//! routes each request to one handler by request type and intent name,
//! optional [`Middleware`] runs in front of handlers, and [`Template`]s render
//! speech in the request's language.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use vocalis::prelude::*;
//!
//! lazy_static::lazy_static! {
//!     static ref WELCOME: Template = Template::builder("Welcome back, {{ value }}.")
//!         .translation("es", "Bienvenido de nuevo, {{ value }}.")
//!         .build()
//!         .expect("welcome template");
//! }
//!
//! async fn launch(request: Request) -> SkillResult {
//!     Reply::new(&request).speak_template(&WELCOME, "friend").ok()
//! }
//!
//! let mut skill = Skill::named("groceries");
//! skill
//!     .launch(launch)
//!     .route_intent("AddItem", Chain::new().with(RequireAccount::new()).then(add_item));
//!
//! let reply = skill.handle(request).await?;
//! ```
//!
//! Moving bytes between the platform and [`Skill::handle`] (or
//! [`Skill::handle_json`]) is left to the host.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use vocalis_core::{
    // Errors
    BoxError,
    // Handler
    BoxHandler,
    // Middleware
    Chain,
    DynHandler,
    DynMiddleware,
    Handler,
    // Request
    Identity,
    Intent,
    Middleware,
    Next,
    // Reply
    Reply,
    Request,
    RequestType,
    // Router
    Skill,
    SkillError,
    SkillResult,
    // Slots
    Slot,
    Slots,
    intents,
};

pub use vocalis_speech::{
    // Templates
    HelperError,
    LanguageTag,
    LocaleError,
    Template,
    TemplateBuilder,
    TemplateContext,
    TemplateError,
    TemplateOption,
    helpers,
};

/// Wire types of requests and replies.
pub mod wire {
    pub use vocalis_core::{
        Application, AudioPlayer, Card, Context, Device, Directive, ELICIT_SLOT_DIRECTIVE,
        ER_SUCCESS_MATCH, OutputSpeech, ReplyBody, Reprompt, RequestBody, ResolutionAuthority,
        ResolutionStatus, ResolutionValue, ResolutionValues, Resolutions, Session, System,
        TEMPLATE_APOLOGY, UpdatedIntent, User, wrap_ssml,
    };
}

/// Standard middleware implementations.
pub mod middleware {
    #![allow(clippy::wildcard_imports)]
    pub use vocalis_std::middleware::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use vocalis_std::testing::*;
}

/// Prelude module - common imports for Vocalis.
///
/// # Usage
///
/// ```rust,ignore
/// use vocalis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Core traits
        Chain,
        Handler,
        Middleware,
        Next,
        Reply,
        Request,
        Skill,
        SkillError,
        SkillResult,
        Slot,
        Slots,
        // Templates
        LanguageTag,
        Template,
        TemplateContext,
        helpers,
        intents,
        // Standard middleware
        middleware::{RequestLogger, RequireAccount, Traced, When},
    };
}
