//! Error types for speech templates.
//!
//! - [`TemplateError`] - Compilation and evaluation failures
//! - [`LocaleError`] - Malformed locale tags
//! - [`HelperError`] - Failures reported by helper functions

use thiserror::Error;

/// Errors raised while building or rendering a [`Template`](crate::Template).
#[derive(Error, Debug)]
pub enum TemplateError {
    /// A pattern could not be compiled.
    #[error("template compile error ({locale}): {message}")]
    Compile {
        /// The locale whose pattern failed.
        locale: String,
        /// What went wrong, with the byte offset when known.
        message: String,
    },

    /// A referenced data field does not exist in the context.
    #[error("template field not found: {0}")]
    MissingField(String),

    /// An `#each` block was given something other than a list, map or null.
    #[error("template field is not iterable: {0}")]
    NotIterable(String),

    /// A helper function returned an error.
    #[error("template helper `{name}` failed: {source}")]
    Helper {
        /// Name the helper was registered under.
        name: String,
        /// The helper's own error.
        #[source]
        source: HelperError,
    },

    /// A helper function panicked during evaluation.
    #[error("template helper `{0}` panicked")]
    HelperPanicked(String),

    /// The value supplied to the context could not be serialized.
    #[error("template context could not be serialized: {0}")]
    Context(#[from] serde_json::Error),
}

impl TemplateError {
    pub(crate) fn compile(locale: impl ToString, message: impl Into<String>) -> Self {
        TemplateError::Compile {
            locale: locale.to_string(),
            message: message.into(),
        }
    }
}

/// A locale tag could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    /// A subtag has the wrong length or contains non-alphanumeric characters.
    #[error("invalid subtag `{subtag}` in locale `{tag}`")]
    InvalidSubtag {
        /// The full tag being parsed.
        tag: String,
        /// The offending subtag.
        subtag: String,
    },

    /// Extra subtags follow the region.
    #[error("unexpected trailing subtags in locale `{0}`")]
    Trailing(String),
}

/// Error returned by a helper function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HelperError {
    /// The helper was called with the wrong number of arguments.
    #[error("expected {expected} argument(s), got {actual}")]
    Arity {
        /// Human readable expectation, e.g. `"1"` or `"1 or 2"`.
        expected: &'static str,
        /// Number of arguments actually passed.
        actual: usize,
    },

    /// An argument had an unusable type.
    #[error("argument {index} must be {expected}")]
    ArgumentType {
        /// Zero-based argument position.
        index: usize,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// Any other helper-defined failure.
    #[error("{0}")]
    Message(String),
}

impl From<String> for HelperError {
    fn from(message: String) -> Self {
        HelperError::Message(message)
    }
}

impl From<&str> for HelperError {
    fn from(message: &str) -> Self {
        HelperError::Message(message.to_string())
    }
}
