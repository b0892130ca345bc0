//! # vocalis-speech
//!
//! Localized speech text for voice skills.
//!
//! This crate has no knowledge of requests or replies; `vocalis-core` builds on
//! it to render speech for a request's locale.
//!
//! # Pieces
//!
//! - [`LanguageTag`] - Parsed locale with a [fallback chain](LanguageTag::fallback_chain)
//! - [`Template`] - One compiled pattern per locale plus a base pattern
//! - [`TemplateContext`] - Locale, render time and data value seen by patterns
//! - [`helpers`] - Ready-made helper functions
//!
//! # Example
//!
//! ```rust,ignore
//! use vocalis_speech::{LanguageTag, Template, TemplateContext, helpers};
//!
//! let t = Template::builder("You have {{ len value }} {{ plural (len value) \"item\" \"items\" }}.")
//!     .helper("len", helpers::len)
//!     .helper("plural", helpers::plural)
//!     .translation("es", "Tienes {{ len value }} {{ plural (len value) \"cosa\" \"cosas\" }}.")
//!     .build()?;
//!
//! let ctx = TemplateContext::new(LanguageTag::parse("es-MX")?, &["pan", "leche"])?;
//! assert_eq!(t.render(&ctx)?, "Tienes 2 cosas.");
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod error;
pub mod helpers;
mod locale;
mod pattern;
mod template;

pub use error::{HelperError, LocaleError, TemplateError};
pub use helpers::Helper;
pub use locale::{FallbackChain, LanguageTag};
pub use template::{Template, TemplateBuilder, TemplateContext, TemplateOption};
