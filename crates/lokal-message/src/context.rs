#![forbid(unsafe_code)]

//! Interpolation context and formatted output.
//!
//! A [`CompiledMessage`](crate::compiler::CompiledMessage) is a pure mapping
//! from an [`InterpolationContext`] to a [`MessageOutput`]. The context
//! bundles everything a single evaluation needs: positional and named
//! arguments, the plural choice count, the case index selected by the
//! resolver, the modifier registry, and the linked-message resolver
//! callback. Missing arguments and modifiers are non-fatal; they interpolate
//! as empty/unmodified and report through `tracing`.

use rustc_hash::FxHashMap;

/// An interpolation argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Int(i64),
    Float(f64),
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

/// A pure string transform applied to linked-message output.
pub type ModifierFn = Box<dyn Fn(&str) -> String>;

/// Modifier registry contents: name to transform.
pub type ModifierMap = FxHashMap<String, ModifierFn>;

/// Whether evaluation concatenates to a string or collects typed parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Concatenate everything into a single string.
    #[default]
    Text,
    /// Collect an ordered list of typed parts (for rich-format callers).
    Parts,
}

/// The node kind a [`MessagePart`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Text,
    List,
    Named,
    Linked,
}

/// One typed output part in [`OutputMode::Parts`] mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePart {
    pub kind: PartKind,
    pub value: String,
}

/// The result of evaluating a compiled message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageOutput {
    Text(String),
    Parts(Vec<MessagePart>),
}

impl MessageOutput {
    /// Flatten either mode into plain text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::Parts(parts) => parts.into_iter().map(|p| p.value).collect(),
        }
    }
}

/// Everything one message evaluation needs, supplied by the resolver.
pub struct InterpolationContext<'a> {
    /// Positional arguments for `{0}`-style nodes.
    pub list: &'a [Value],
    /// Named arguments for `{name}`-style nodes.
    pub named: &'a FxHashMap<String, Value>,
    /// Plural choice count; also the implicit value of `{count}` / `{n}`
    /// when no named argument overrides them.
    pub choice: Option<i64>,
    /// Case selected by the resolver's plural rule (0 for non-plural).
    pub case_index: usize,
    /// Output mode requested by the caller.
    pub mode: OutputMode,
    /// Modifier registry for `@.modifier:key` links.
    pub modifiers: &'a ModifierMap,
    /// Resolves a linked keypath to already-formatted text. The resolver
    /// captures the locale; re-entrant resolution uses a fresh
    /// fallback-visited set.
    pub linked: &'a dyn Fn(&str) -> String,
}

impl<'a> InterpolationContext<'a> {
    /// Context with no arguments, no modifiers, and a no-op link resolver.
    #[must_use]
    pub fn new(
        list: &'a [Value],
        named: &'a FxHashMap<String, Value>,
        modifiers: &'a ModifierMap,
        linked: &'a dyn Fn(&str) -> String,
    ) -> Self {
        Self {
            list,
            named,
            choice: None,
            case_index: 0,
            mode: OutputMode::Text,
            modifiers,
            linked,
        }
    }

    /// Set the plural choice count.
    #[must_use]
    pub fn with_choice(mut self, choice: i64) -> Self {
        self.choice = Some(choice);
        self
    }

    /// Set the selected plural case.
    #[must_use]
    pub fn with_case_index(mut self, case_index: usize) -> Self {
        self.case_index = case_index;
        self
    }

    /// Set the output mode.
    #[must_use]
    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }
}
