//! Helper functions callable from template patterns.
//!
//! A helper receives its evaluated arguments as JSON values and returns a JSON
//! value. Helpers are registered per template with
//! [`TemplateBuilder::helper`](crate::TemplateBuilder::helper); nothing here is
//! registered implicitly.
//!
//! ```rust,ignore
//! let t = Template::builder("You have {{ len value }} {{ plural (len value) \"item\" \"items\" }}.")
//!     .helper("len", helpers::len)
//!     .build()?;
//! ```

use crate::{error::HelperError, pattern::display};
use serde_json::Value;
use std::{fmt, sync::Arc};

type HelperFn = dyn Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync;

/// A named function that patterns may call as `{{ name arg ... }}`.
#[derive(Clone)]
pub struct Helper(Arc<HelperFn>);

impl Helper {
    /// Wrap a function as a helper.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, HelperError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub(crate) fn call(&self, args: &[Value]) -> Result<Value, HelperError> {
        (self.0)(args)
    }
}

impl fmt::Debug for Helper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Helper(..)")
    }
}

/// `len x`: characters in a string, entries in an array or object, 0 for null.
pub fn len(args: &[Value]) -> Result<Value, HelperError> {
    let [value] = args else {
        return Err(HelperError::Arity {
            expected: "1",
            actual: args.len(),
        });
    };
    let n = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => {
            return Err(HelperError::ArgumentType {
                index: 0,
                expected: "a string, array or object",
            });
        }
    };
    Ok(Value::from(n))
}

/// `join list [sep] [last_sep]`: joins rendered items.
///
/// `join value.items ", " " and "` renders `a, b and c`. The separator defaults
/// to `", "` and the last separator defaults to the separator.
pub fn join(args: &[Value]) -> Result<Value, HelperError> {
    let (list, sep, last_sep) = match args {
        [list] => (list, ", ", None),
        [list, sep] => (list, string_arg(sep, 1)?, None),
        [list, sep, last] => (list, string_arg(sep, 1)?, Some(string_arg(last, 2)?)),
        _ => {
            return Err(HelperError::Arity {
                expected: "1 to 3",
                actual: args.len(),
            });
        }
    };
    let items: Vec<String> = match list {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(display).collect(),
        _ => {
            return Err(HelperError::ArgumentType {
                index: 0,
                expected: "an array",
            });
        }
    };

    let joined = match (items.split_last(), last_sep) {
        (Some((last, rest)), Some(last_sep)) if !rest.is_empty() => {
            format!("{}{}{}", rest.join(sep), last_sep, last)
        }
        _ => items.join(sep),
    };
    Ok(Value::String(joined))
}

/// `upper s`: uppercases a string.
pub fn upper(args: &[Value]) -> Result<Value, HelperError> {
    single_string(args).map(|s| Value::String(s.to_uppercase()))
}

/// `lower s`: lowercases a string.
pub fn lower(args: &[Value]) -> Result<Value, HelperError> {
    single_string(args).map(|s| Value::String(s.to_lowercase()))
}

/// `default x fallback`: `x` unless it is falsy, otherwise `fallback`.
pub fn default(args: &[Value]) -> Result<Value, HelperError> {
    let [value, fallback] = args else {
        return Err(HelperError::Arity {
            expected: "2",
            actual: args.len(),
        });
    };
    if crate::pattern::is_truthy(value) {
        Ok(value.clone())
    } else {
        Ok(fallback.clone())
    }
}

/// `plural count singular plural`: picks a word form by count.
pub fn plural(args: &[Value]) -> Result<Value, HelperError> {
    let [count, singular, plural] = args else {
        return Err(HelperError::Arity {
            expected: "3",
            actual: args.len(),
        });
    };
    let count = count.as_f64().ok_or(HelperError::ArgumentType {
        index: 0,
        expected: "a number",
    })?;
    let word = if count == 1.0 {
        string_arg(singular, 1)?
    } else {
        string_arg(plural, 2)?
    };
    Ok(Value::String(word.to_string()))
}

fn single_string(args: &[Value]) -> Result<&str, HelperError> {
    match args {
        [value] => string_arg(value, 0),
        _ => Err(HelperError::Arity {
            expected: "1",
            actual: args.len(),
        }),
    }
}

fn string_arg(value: &Value, index: usize) -> Result<&str, HelperError> {
    value.as_str().ok_or(HelperError::ArgumentType {
        index,
        expected: "a string",
    })
}
