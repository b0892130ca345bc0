//! Locale tags and the fallback chain.
//!
//! A [`LanguageTag`] is the subset of BCP 47 that voice platforms actually send:
//! a language, an optional script and an optional region (`en-US`, `es-MX`,
//! `zh-Hant-TW`). Lookups that miss walk the tag's [`fallback_chain`], dropping
//! one subtag at a time until the root tag is reached.
//!
//! [`fallback_chain`]: LanguageTag::fallback_chain

use crate::error::LocaleError;
use std::{fmt, str::FromStr};

/// A parsed `language[-Script][-REGION]` tag.
///
/// The default value is the root tag, which carries no subtags at all and
/// displays as `und`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LanguageTag {
    language: Option<String>,
    script: Option<String>,
    region: Option<String>,
}

impl LanguageTag {
    /// The root tag (`und`).
    pub const fn root() -> Self {
        Self {
            language: None,
            script: None,
            region: None,
        }
    }

    /// `en-US`, the default base language of a template.
    pub fn american_english() -> Self {
        Self {
            language: Some("en".into()),
            script: None,
            region: Some("US".into()),
        }
    }

    /// Parse a tag such as `es-MX` or `en_gb`.
    ///
    /// An empty string and `und` both parse to the root tag.
    pub fn parse(tag: &str) -> Result<Self, LocaleError> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Ok(Self::root());
        }

        let mut parsed = Self::root();
        let mut subtags = trimmed.split(['-', '_']).peekable();

        let language = subtags.next().unwrap_or_default();
        if !is_alpha(language, 2..=8) {
            return Err(invalid(trimmed, language));
        }
        if !language.eq_ignore_ascii_case("und") {
            parsed.language = Some(language.to_ascii_lowercase());
        }

        if let Some(script) = subtags.next_if(|s| is_alpha(s, 4..=4)) {
            let mut chars = script.chars();
            let title: String = chars
                .next()
                .map(|c| c.to_ascii_uppercase())
                .into_iter()
                .chain(chars.map(|c| c.to_ascii_lowercase()))
                .collect();
            parsed.script = Some(title);
        }

        if let Some(region) = subtags.next() {
            if is_alpha(region, 2..=2) || is_digit(region, 3) {
                parsed.region = Some(region.to_ascii_uppercase());
            } else {
                return Err(invalid(trimmed, region));
            }
        }

        if subtags.next().is_some() {
            return Err(LocaleError::Trailing(trimmed.to_string()));
        }
        Ok(parsed)
    }

    /// The language subtag, if any.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The script subtag, if any.
    pub fn script(&self) -> Option<&str> {
        self.script.as_deref()
    }

    /// The region subtag, if any.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Whether this is the root tag.
    pub fn is_root(&self) -> bool {
        self.language.is_none() && self.script.is_none() && self.region.is_none()
    }

    /// The next more general tag: region is dropped first, then script, then
    /// language. The parent of the root tag is the root tag.
    pub fn parent(&self) -> Self {
        let mut parent = self.clone();
        if parent.region.take().is_some() {
            return parent;
        }
        if parent.script.take().is_some() {
            return parent;
        }
        Self::root()
    }

    /// Iterate from this tag through each parent, ending with the root tag.
    pub fn fallback_chain(&self) -> FallbackChain {
        FallbackChain {
            next: Some(self.clone()),
        }
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.language.as_deref().unwrap_or("und"))?;
        if let Some(script) = &self.script {
            write!(f, "-{script}")?;
        }
        if let Some(region) = &self.region {
            write!(f, "-{region}")?;
        }
        Ok(())
    }
}

impl FromStr for LanguageTag {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for LanguageTag {
    type Error = LocaleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

/// Iterator returned by [`LanguageTag::fallback_chain`].
#[derive(Debug, Clone)]
pub struct FallbackChain {
    next: Option<LanguageTag>,
}

impl Iterator for FallbackChain {
    type Item = LanguageTag;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if !current.is_root() {
            self.next = Some(current.parent());
        }
        Some(current)
    }
}

fn is_alpha(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_digit(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn invalid(tag: &str, subtag: &str) -> LocaleError {
    LocaleError::InvalidSubtag {
        tag: tag.to_string(),
        subtag: subtag.to_string(),
    }
}
