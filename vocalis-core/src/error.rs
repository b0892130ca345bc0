//! Error types for skill dispatch.
//!
//! - [`SkillError`] - Everything a dispatch can fail with
//! - [`SkillResult`] - What handlers and middleware return

use crate::{reply::Reply, request::RequestType};
use thiserror::Error;
use vocalis_speech::TemplateError;

/// A boxed error type for handler-defined failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The outcome of handling one request.
pub type SkillResult = Result<Reply, SkillError>;

/// Errors surfaced by a [`Skill`](crate::Skill) or a handler.
#[derive(Error, Debug)]
pub enum SkillError {
    /// The request claimed to carry an intent but had none.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// No handler is registered for the intent name.
    #[error("unknown intent: {0}")]
    UnknownIntent(String),

    /// A request type was received that has no registered handler.
    #[error("no handler registered for {0}")]
    NoHandlerRegistered(RequestType),

    /// The request type is not one the router dispatches.
    #[error("unsupported request type: {0}")]
    UnsupportedRequestType(String),

    /// A template failed outside of `speak_template`.
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A handler gave up, see [`Reply::fail`].
    #[error("{0}")]
    Failed(String),

    /// The inbound JSON could not be decoded.
    #[error("request decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// The reply could not be encoded.
    #[error("reply encode error: {0}")]
    Encode(#[source] serde_json::Error),

    /// A handler-defined error.
    #[error(transparent)]
    Custom(BoxError),
}

impl SkillError {
    /// Wrap any error as [`SkillError::Custom`].
    pub fn custom(err: impl Into<BoxError>) -> Self {
        SkillError::Custom(err.into())
    }
}

impl From<BoxError> for SkillError {
    fn from(err: BoxError) -> Self {
        SkillError::Custom(err)
    }
}
