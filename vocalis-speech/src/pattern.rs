//! Pattern compiler and evaluator.
//!
//! Patterns are plain text with tags:
//!
//! | Tag | Meaning |
//! |-----|---------|
//! | `{{ expr }}` | Substitute, escaping XML special characters for SSML |
//! | `{{{ expr }}}` | Substitute without escaping |
//! | `{{#if expr}} .. {{else}} .. {{/if}}` | Conditional |
//! | `{{#each expr}} .. {{else}} .. {{/each}}` | Loop, `this` and `@index` bound inside |
//!
//! An `expr` is a path (`value.items.0`, `locale`, `this.name`), a literal
//! (`"text"`, `42`, `true`, `null`) or a helper call (`join value ", "`).
//! Helper calls nest with parentheses: `plural (len value) "item" "items"`.
//!
//! Helper names are resolved when the pattern is compiled, so a helper must be
//! known before any pattern that calls it with arguments.

use crate::{error::TemplateError, helpers::Helper};
use serde_json::Value;
use std::{
    collections::HashMap,
    iter::Peekable,
    panic::{self, AssertUnwindSafe},
    vec,
};

pub(crate) type Helpers = HashMap<String, Helper>;

/// A compiled pattern.
#[derive(Debug, Clone)]
pub(crate) struct Pattern {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone)]
enum Node {
    Text(String),
    Print { expr: Expr, escape: bool },
    If { cond: Expr, then: Vec<Node>, otherwise: Vec<Node> },
    Each { list: Expr, body: Vec<Node>, otherwise: Vec<Node> },
}

#[derive(Debug, Clone)]
enum Expr {
    Literal(Value),
    Path(Path),
    Call {
        name: String,
        helper: Helper,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone)]
struct Path {
    root: PathRoot,
    segments: Vec<String>,
    source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PathRoot {
    Context,
    This,
    Index,
}

impl Pattern {
    /// Compile `source` against the helpers known so far.
    ///
    /// Errors are returned as messages; the caller attaches the locale.
    pub(crate) fn compile(source: &str, helpers: &Helpers) -> Result<Self, String> {
        let tokens = lex(source)?;
        let mut parser = Parser {
            tokens: tokens.into_iter(),
            helpers,
        };
        let (nodes, _) = parser.nodes(None)?;
        Ok(Self { nodes })
    }

    /// A pattern that renders `text` verbatim.
    pub(crate) fn literal(text: &str) -> Self {
        Self {
            nodes: vec![Node::Text(text.to_string())],
        }
    }

    /// Render against a context object.
    pub(crate) fn render(&self, context: &Value) -> Result<String, TemplateError> {
        let mut out = String::new();
        let scope = Scope {
            root: context,
            item: None,
        };
        render_nodes(&self.nodes, scope, &mut out)?;
        Ok(out)
    }
}

// ============================================================================
// Lexing
// ============================================================================

enum Token {
    Text(String),
    Tag {
        body: String,
        raw: bool,
        offset: usize,
    },
}

fn lex(source: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        if start > 0 {
            tokens.push(Token::Text(rest[..start].to_string()));
        }
        let raw = rest[start + 2..].starts_with('{');
        let (open, close) = if raw { (3, "}}}") } else { (2, "}}") };
        let body_start = start + open;
        let Some(len) = rest[body_start..].find(close) else {
            return Err(format!("unterminated tag at byte {}", offset + start));
        };
        tokens.push(Token::Tag {
            body: rest[body_start..body_start + len].trim().to_string(),
            raw,
            offset: offset + start,
        });

        let consumed = body_start + len + close.len();
        rest = &rest[consumed..];
        offset += consumed;
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }
    Ok(tokens)
}

// ============================================================================
// Parsing
// ============================================================================

#[derive(Debug, PartialEq, Eq)]
enum Stop {
    End,
    Else,
    Close,
}

struct Parser<'h> {
    tokens: vec::IntoIter<Token>,
    helpers: &'h Helpers,
}

impl Parser<'_> {
    fn nodes(&mut self, block: Option<&str>) -> Result<(Vec<Node>, Stop), String> {
        let mut nodes = Vec::new();

        while let Some(token) = self.tokens.next() {
            let (body, raw, offset) = match token {
                Token::Text(text) => {
                    nodes.push(Node::Text(text));
                    continue;
                }
                Token::Tag { body, raw, offset } => (body, raw, offset),
            };

            if let Some(open) = body.strip_prefix('#') {
                nodes.push(self.block(open, offset)?);
            } else if let Some(name) = body.strip_prefix('/') {
                let name = name.trim();
                return match block {
                    Some(open) if open == name => Ok((nodes, Stop::Close)),
                    Some(open) => Err(format!(
                        "`/{name}` closes an open `#{open}` block at byte {offset}"
                    )),
                    None => Err(format!("unexpected `/{name}` at byte {offset}")),
                };
            } else if body == "else" {
                if block.is_none() {
                    return Err(format!("`else` outside of a block at byte {offset}"));
                }
                return Ok((nodes, Stop::Else));
            } else {
                nodes.push(Node::Print {
                    expr: self.expr(&body, offset)?,
                    escape: !raw,
                });
            }
        }

        match block {
            Some(open) => Err(format!("unclosed `#{open}` block")),
            None => Ok((nodes, Stop::End)),
        }
    }

    fn block(&mut self, open: &str, offset: usize) -> Result<Node, String> {
        let (keyword, source) = open.split_once(char::is_whitespace).unwrap_or((open, ""));
        if keyword != "if" && keyword != "each" {
            return Err(format!("unknown block `#{keyword}` at byte {offset}"));
        }
        let expr = self.expr(source.trim(), offset)?;

        let (body, stop) = self.nodes(Some(keyword))?;
        let otherwise = match stop {
            Stop::Else => match self.nodes(Some(keyword))? {
                (nodes, Stop::Close) => nodes,
                _ => return Err(format!("second `else` in `#{keyword}` at byte {offset}")),
            },
            _ => Vec::new(),
        };

        Ok(if keyword == "if" {
            Node::If {
                cond: expr,
                then: body,
                otherwise,
            }
        } else {
            Node::Each {
                list: expr,
                body,
                otherwise,
            }
        })
    }

    fn expr(&self, source: &str, offset: usize) -> Result<Expr, String> {
        let atoms = atomize(source).map_err(|e| format!("{e} at byte {offset}"))?;
        if atoms.is_empty() {
            return Err(format!("empty expression at byte {offset}"));
        }
        let mut atoms = atoms.into_iter().peekable();
        self.parse(&mut atoms, false)
            .map_err(|e| format!("{e} in `{source}` at byte {offset}"))
    }

    fn parse(
        &self,
        atoms: &mut Peekable<vec::IntoIter<Atom>>,
        nested: bool,
    ) -> Result<Expr, String> {
        let expr = match atoms.next() {
            Some(Atom::Word(name)) if self.helpers.contains_key(&name) => {
                let helper = self.helpers[&name].clone();
                let mut args = Vec::new();
                while let Some(atom) = atoms.peek() {
                    if *atom == Atom::Close {
                        break;
                    }
                    args.push(self.arg(atoms)?);
                }
                Expr::Call { name, helper, args }
            }
            Some(Atom::Word(name)) if !matches!(atoms.peek(), None | Some(Atom::Close)) => {
                return Err(format!("unknown helper `{name}`"));
            }
            Some(first) => {
                let value = self.operand(first, atoms)?;
                match atoms.peek() {
                    None | Some(Atom::Close) => value,
                    Some(_) => return Err("unexpected arguments".to_string()),
                }
            }
            None => return Err("empty expression".to_string()),
        };

        match (nested, atoms.next()) {
            (true, Some(Atom::Close)) | (false, None) => Ok(expr),
            (true, _) => Err("unclosed `(`".to_string()),
            (false, Some(_)) => Err("unexpected `)`".to_string()),
        }
    }

    fn arg(&self, atoms: &mut Peekable<vec::IntoIter<Atom>>) -> Result<Expr, String> {
        match atoms.next() {
            Some(atom) => self.operand(atom, atoms),
            None => Err("missing argument".to_string()),
        }
    }

    fn operand(
        &self,
        atom: Atom,
        atoms: &mut Peekable<vec::IntoIter<Atom>>,
    ) -> Result<Expr, String> {
        match atom {
            Atom::Open => self.parse(atoms, true),
            Atom::Close => Err("unexpected `)`".to_string()),
            Atom::Str(s) => Ok(Expr::Literal(Value::String(s))),
            Atom::Word(word) => word_expr(&word),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Atom {
    Word(String),
    Str(String),
    Open,
    Close,
}

fn atomize(source: &str) -> Result<Vec<Atom>, String> {
    let mut atoms = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                atoms.push(Atom::Open);
            }
            ')' => {
                chars.next();
                atoms.push(Atom::Close);
            }
            '"' | '\'' => {
                chars.next();
                let mut s = String::new();
                let mut closed = false;
                while let Some(c2) = chars.next() {
                    match c2 {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                s.push(escaped);
                            }
                        }
                        q if q == c => {
                            closed = true;
                            break;
                        }
                        other => s.push(other),
                    }
                }
                if !closed {
                    return Err("unterminated string literal".to_string());
                }
                atoms.push(Atom::Str(s));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c2) = chars.peek() {
                    if c2.is_whitespace() || matches!(c2, '(' | ')' | '"' | '\'') {
                        break;
                    }
                    word.push(c2);
                    chars.next();
                }
                atoms.push(Atom::Word(word));
            }
        }
    }
    Ok(atoms)
}

/// Top-level fields of a render context.
const CONTEXT_ROOTS: [&str; 3] = ["locale", "now", "value"];

fn word_expr(word: &str) -> Result<Expr, String> {
    match word {
        "true" => return Ok(Expr::Literal(Value::Bool(true))),
        "false" => return Ok(Expr::Literal(Value::Bool(false))),
        "null" => return Ok(Expr::Literal(Value::Null)),
        _ => {}
    }

    let numeric = word
        .trim_start_matches('-')
        .starts_with(|c: char| c.is_ascii_digit());
    if numeric {
        return serde_json::from_str::<serde_json::Number>(word)
            .map(|n| Expr::Literal(Value::Number(n)))
            .map_err(|_| format!("invalid number `{word}`"));
    }

    let mut segments: Vec<String> = word.split('.').map(str::to_string).collect();
    if segments.iter().any(String::is_empty) {
        return Err(format!("invalid path `{word}`"));
    }
    let root = match segments[0].as_str() {
        "this" => PathRoot::This,
        "@index" if segments.len() == 1 => PathRoot::Index,
        s if s.starts_with('@') => return Err(format!("unknown variable `{s}`")),
        s if CONTEXT_ROOTS.contains(&s) => PathRoot::Context,
        _ => return Err(format!("unknown helper or field `{word}`")),
    };
    if root != PathRoot::Context {
        segments.remove(0);
    }
    Ok(Expr::Path(Path {
        root,
        segments,
        source: word.to_string(),
    }))
}

// ============================================================================
// Evaluation
// ============================================================================

#[derive(Clone, Copy)]
struct Scope<'a> {
    root: &'a Value,
    item: Option<(&'a Value, usize)>,
}

fn render_nodes(nodes: &[Node], scope: Scope<'_>, out: &mut String) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Print { expr, escape } => {
                let value = eval(expr, scope)?;
                let text = display(&value);
                if *escape {
                    escape_into(&text, out);
                } else {
                    out.push_str(&text);
                }
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                let branch = if is_truthy(&eval(cond, scope)?) {
                    then
                } else {
                    otherwise
                };
                render_nodes(branch, scope, out)?;
            }
            Node::Each {
                list,
                body,
                otherwise,
            } => {
                let value = eval(list, scope)?;
                let items: Vec<&Value> = match &value {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items.iter().collect(),
                    Value::Object(map) => map.values().collect(),
                    _ => return Err(TemplateError::NotIterable(list.describe())),
                };
                if items.is_empty() {
                    render_nodes(otherwise, scope, out)?;
                }
                for (index, item) in items.into_iter().enumerate() {
                    let inner = Scope {
                        root: scope.root,
                        item: Some((item, index)),
                    };
                    render_nodes(body, inner, out)?;
                }
            }
        }
    }
    Ok(())
}

fn eval(expr: &Expr, scope: Scope<'_>) -> Result<Value, TemplateError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path(path) => path
            .lookup(scope)
            .ok_or_else(|| TemplateError::MissingField(path.source.clone())),
        Expr::Call { name, helper, args } => {
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<_>, _>>()?;
            match panic::catch_unwind(AssertUnwindSafe(|| helper.call(&args))) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(source)) => Err(TemplateError::Helper {
                    name: name.clone(),
                    source,
                }),
                Err(_) => Err(TemplateError::HelperPanicked(name.clone())),
            }
        }
    }
}

impl Expr {
    fn describe(&self) -> String {
        match self {
            Expr::Literal(value) => value.to_string(),
            Expr::Path(path) => path.source.clone(),
            Expr::Call { name, .. } => name.clone(),
        }
    }
}

impl Path {
    fn lookup(&self, scope: Scope<'_>) -> Option<Value> {
        let start = match self.root {
            PathRoot::Context => scope.root,
            PathRoot::This => scope.item?.0,
            PathRoot::Index => return scope.item.map(|(_, index)| Value::from(index)),
        };
        self.segments
            .iter()
            .try_fold(start, |current, segment| match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            })
            .cloned()
    }
}

/// Render a value as speech text. Null renders empty, containers as JSON.
pub(crate) fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Truthiness used by `#if` and the `default` helper.
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
}
