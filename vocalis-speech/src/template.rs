//! Localized templates.
//!
//! A [`Template`] holds one compiled pattern per locale plus a base pattern that
//! always answers when no translation matches. Rendering walks the requested
//! locale's fallback chain (`es-MX` → `es` → root) and uses the first
//! translation found, falling back to the base pattern at the root.

use crate::{
    error::{HelperError, TemplateError},
    helpers::Helper,
    locale::LanguageTag,
    pattern::{Helpers, Pattern},
};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::{collections::HashMap, sync::Arc};

/// An immutable, shareable, localized template.
///
/// Cloning is cheap; all clones share the compiled patterns.
#[derive(Debug, Clone)]
pub struct Template {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: Option<String>,
    base_language: LanguageTag,
    base: Pattern,
    translations: HashMap<LanguageTag, Pattern>,
}

impl Template {
    /// Start building a template whose base-language pattern is `text`.
    pub fn builder(text: impl Into<String>) -> TemplateBuilder {
        TemplateBuilder {
            text: text.into(),
            name: None,
            base_language: LanguageTag::american_english(),
            options: Vec::new(),
        }
    }

    /// Build a template from a base pattern and a list of options.
    ///
    /// Equivalent to feeding each option to a [`TemplateBuilder`].
    pub fn from_options(
        text: impl Into<String>,
        options: impl IntoIterator<Item = TemplateOption>,
    ) -> Result<Self, TemplateError> {
        let mut builder = Self::builder(text);
        builder.options.extend(options);
        builder.build()
    }

    /// A template that always renders `text` as written, with no substitutions.
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            inner: Arc::new(Inner {
                name: None,
                base_language: LanguageTag::american_english(),
                base: Pattern::literal(&text),
                translations: HashMap::new(),
            }),
        }
    }

    /// The name given at build time, used in log output.
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// The locale served by the base pattern.
    pub fn base_language(&self) -> &LanguageTag {
        &self.inner.base_language
    }

    /// Locales with an explicit translation, excluding the base language.
    pub fn locales(&self) -> impl Iterator<Item = &LanguageTag> {
        self.inner.translations.keys()
    }

    /// Render for the context's locale. The result is trimmed.
    ///
    /// Never fails because of the locale; an unknown locale renders the base
    /// pattern.
    pub fn render(&self, context: &TemplateContext) -> Result<String, TemplateError> {
        let (selected, pattern) = self.select(&context.locale);
        tracing::trace!(
            template = self.name().unwrap_or("<unnamed>"),
            requested = %context.locale,
            selected = %selected,
            "rendering template"
        );
        let rendered = pattern.render(&context.to_value())?;
        Ok(rendered.trim().to_string())
    }

    fn select(&self, locale: &LanguageTag) -> (&LanguageTag, &Pattern) {
        let inner = &*self.inner;
        for tag in locale.fallback_chain() {
            if tag == inner.base_language {
                break;
            }
            if let Some((tag, pattern)) = inner.translations.get_key_value(&tag) {
                return (tag, pattern);
            }
        }
        (&inner.base_language, &inner.base)
    }
}

/// A single construction option.
///
/// Options are applied in two phases regardless of the order given: every
/// helper first, then every translation.
#[derive(Debug, Clone)]
pub enum TemplateOption {
    /// Register a helper function under a name.
    Helper(String, Helper),
    /// Add a pattern for a locale tag.
    Translation(String, String),
}

impl TemplateOption {
    /// A helper registration.
    pub fn helper<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        TemplateOption::Helper(name.into(), Helper::new(f))
    }

    /// A translation for `locale`.
    pub fn translation(locale: impl Into<String>, text: impl Into<String>) -> Self {
        TemplateOption::Translation(locale.into(), text.into())
    }

    fn phase(&self) -> u8 {
        match self {
            TemplateOption::Helper(..) => 0,
            TemplateOption::Translation(..) => 1,
        }
    }
}

/// Builder returned by [`Template::builder`].
#[derive(Debug, Clone)]
#[must_use]
pub struct TemplateBuilder {
    text: String,
    name: Option<String>,
    base_language: LanguageTag,
    options: Vec<TemplateOption>,
}

impl TemplateBuilder {
    /// Name the template for log output.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Locale served by the base pattern. Defaults to `en-US`.
    pub fn base_language(mut self, tag: LanguageTag) -> Self {
        self.base_language = tag;
        self
    }

    /// Register a helper callable from any of this template's patterns.
    pub fn helper<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        self.options.push(TemplateOption::helper(name, f));
        self
    }

    /// Add a translation for `locale` (for example `"es-MX"` or `"fr"`).
    pub fn translation(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.options.push(TemplateOption::translation(locale, text));
        self
    }

    /// Compile every pattern.
    ///
    /// A translation for the base language is replaced by the base pattern.
    pub fn build(self) -> Result<Template, TemplateError> {
        let mut options = self.options;
        options.sort_by_key(TemplateOption::phase);

        let mut helpers = Helpers::new();
        let mut translations = HashMap::new();
        for option in options {
            match option {
                TemplateOption::Helper(name, helper) => {
                    helpers.insert(name, helper);
                }
                TemplateOption::Translation(locale, text) => {
                    let tag = LanguageTag::parse(&locale)
                        .map_err(|e| TemplateError::compile(&locale, e.to_string()))?;
                    let pattern = Pattern::compile(&text, &helpers)
                        .map_err(|message| TemplateError::compile(&tag, message))?;
                    translations.insert(tag, pattern);
                }
            }
        }

        let base = Pattern::compile(&self.text, &helpers)
            .map_err(|message| TemplateError::compile(&self.base_language, message))?;
        translations.remove(&self.base_language);

        Ok(Template {
            inner: Arc::new(Inner {
                name: self.name,
                base_language: self.base_language,
                base,
                translations,
            }),
        })
    }
}

/// Everything a pattern can see while rendering.
///
/// Patterns address the fields as `locale`, `now` (RFC 3339) and `value`.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    locale: LanguageTag,
    now: DateTime<Utc>,
    value: Value,
}

impl TemplateContext {
    /// Serialize `value` for rendering in `locale` at the current time.
    pub fn new<T: Serialize + ?Sized>(
        locale: LanguageTag,
        value: &T,
    ) -> Result<Self, TemplateError> {
        Ok(Self {
            locale,
            now: Utc::now(),
            value: serde_json::to_value(value)?,
        })
    }

    /// Override the render time.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// The requested locale.
    pub fn locale(&self) -> &LanguageTag {
        &self.locale
    }

    /// The render time.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn to_value(&self) -> Value {
        json!({
            "locale": self.locale.to_string(),
            "now": self.now.to_rfc3339_opts(SecondsFormat::Secs, true),
            "value": self.value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers;
    use chrono::TimeZone;

    fn ctx(locale: &str, value: Value) -> TemplateContext {
        TemplateContext::new(LanguageTag::parse(locale).unwrap(), &value).unwrap()
    }

    fn greeting() -> Template {
        Template::builder("  Hello, {{ value }}!  ")
            .name("greeting")
            .translation("es", "¡Hola, {{ value }}!")
            .translation("es-MX", "¿Qué onda, {{ value }}?")
            .translation("fr", "Bonjour, {{ value }} !")
            .build()
            .unwrap()
    }

    #[test]
    fn test_exact_match_and_fallback() {
        let t = greeting();
        let name = json!("Ana");
        assert_eq!(t.render(&ctx("es-MX", name.clone())).unwrap(), "¿Qué onda, Ana?");
        assert_eq!(t.render(&ctx("es-ES", name.clone())).unwrap(), "¡Hola, Ana!");
        assert_eq!(t.render(&ctx("fr-CA", name.clone())).unwrap(), "Bonjour, Ana !");
        assert_eq!(t.render(&ctx("de-DE", name.clone())).unwrap(), "Hello, Ana!");
        assert_eq!(t.render(&ctx("", name)).unwrap(), "Hello, Ana!");
    }

    #[test]
    fn test_fallback_is_idempotent() {
        let t = greeting();
        let first = t.render(&ctx("es-AR", json!("x"))).unwrap();
        let second = t.render(&ctx("es", json!("x"))).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_base_language_cannot_be_overridden() {
        let t = Template::builder("base")
            .translation("en-US", "override")
            .translation("en", "english")
            .build()
            .unwrap();
        assert_eq!(t.render(&ctx("en-US", Value::Null)).unwrap(), "base");
        assert_eq!(t.render(&ctx("en-GB", Value::Null)).unwrap(), "english");
        assert_eq!(t.locales().count(), 1);
    }

    #[test]
    fn test_helpers_apply_before_translations() {
        let t = Template::from_options(
            "{{ shout value }}",
            [
                TemplateOption::translation("es", "{{ shout value }}!!"),
                TemplateOption::helper("shout", helpers::upper),
            ],
        )
        .unwrap();
        assert_eq!(t.render(&ctx("es-MX", json!("hola"))).unwrap(), "HOLA!!");
        assert_eq!(t.render(&ctx("en-US", json!("hi"))).unwrap(), "HI");
    }

    #[test]
    fn test_compile_errors_fail_build() {
        let err = Template::builder("ok")
            .translation("es", "{{#if value}}sin cerrar")
            .build()
            .unwrap_err();
        assert!(matches!(err, TemplateError::Compile { ref locale, .. } if locale == "es"));

        assert!(Template::builder("{{ value").build().is_err());
        assert!(Template::builder("ok").translation("not a tag", "x").build().is_err());
    }

    #[test]
    fn test_unregistered_helper_without_arguments_fails_build() {
        assert!(Template::builder("Hi {{ shout }}").build().is_err());

        let err = Template::builder("Hi")
            .translation("fr", "Salut {{ nom }}")
            .build()
            .unwrap_err();
        assert!(matches!(err, TemplateError::Compile { ref locale, .. } if locale == "fr"));

        let t = Template::builder("Hi {{ shout }}")
            .helper("shout", |_: &[Value]| Ok(Value::from("HEY")))
            .build()
            .unwrap();
        assert_eq!(t.render(&ctx("en-US", Value::Null)).unwrap(), "Hi HEY");
    }

    #[test]
    fn test_literal() {
        let t = Template::literal("{{ not a pattern }}");
        assert_eq!(t.render(&ctx("en-US", Value::Null)).unwrap(), "{{ not a pattern }}");
    }

    #[test]
    fn test_context_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let t = Template::builder("{{ locale }} {{ now }}").build().unwrap();
        let rendered = t.render(&ctx("es-mx", Value::Null).at(now)).unwrap();
        assert_eq!(rendered, "es-MX 2024-03-01T12:30:00Z");
    }

    #[test]
    fn test_templates_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Template>();
        assert_send_sync::<TemplateContext>();
    }
}
