#![forbid(unsafe_code)]

//! Per-locale message trees with dotted-path lookup.
//!
//! Message tables nest: a locale maps keys to either source strings or
//! further groups, addressed by `.`-joined keypaths (`message.hello`). A
//! flat key that happens to contain dots wins over the nested walk, so both
//! layouts coexist.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key | Path not in the locale | `lookup` returns `None` |
//! | Path into a leaf | `a.b` where `a` is a string | `None` |
//! | Path onto a group | `a` where `a` is a group | `None` (flatten is a collaborator concern) |
//! | Missing locale | Locale never set | `None` |

use rustc_hash::FxHashMap;

/// A node in a locale's message table: a message source or a nested group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTree {
    /// A message source string. The empty string is a valid message,
    /// distinct from a missing key.
    Leaf(String),
    /// A nested group of keys.
    Group(FxHashMap<String, MessageTree>),
}

impl MessageTree {
    /// A leaf message.
    #[must_use]
    pub fn leaf(source: impl Into<String>) -> Self {
        Self::Leaf(source.into())
    }

    /// A group built from `(key, subtree)` pairs.
    #[must_use]
    pub fn group<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, MessageTree)>,
    {
        Self::Group(
            entries
                .into_iter()
                .map(|(key, tree)| (key.into(), tree))
                .collect(),
        )
    }

    /// An empty group.
    #[must_use]
    pub fn empty() -> Self {
        Self::Group(FxHashMap::default())
    }

    /// Resolve a dotted keypath to a message source.
    ///
    /// A flat entry under the literal path is preferred; otherwise the path
    /// is split on `.` and walked through nested groups. A path that ends
    /// on a group is a miss.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&str> {
        if let Self::Group(map) = self {
            if let Some(Self::Leaf(source)) = map.get(path) {
                return Some(source);
            }
        }
        let mut node = self;
        for segment in path.split('.') {
            match node {
                Self::Group(map) => node = map.get(segment)?,
                Self::Leaf(_) => return None,
            }
        }
        match node {
            Self::Leaf(source) => Some(source),
            Self::Group(_) => None,
        }
    }

    /// Insert a message at a dotted keypath, creating intermediate groups
    /// and overwriting leaves that stand in the way.
    pub fn insert_path(&mut self, path: &str, source: String) {
        if let Self::Leaf(_) = self {
            *self = Self::empty();
        }
        if let Self::Group(map) = self {
            match path.split_once('.') {
                None => {
                    map.insert(path.to_string(), Self::Leaf(source));
                }
                Some((head, rest)) => {
                    map.entry(head.to_string())
                        .or_insert_with(Self::empty)
                        .insert_path(rest, source);
                }
            }
        }
    }

    /// Deep-merge `other` into `self`: groups merge recursively, leaves
    /// overwrite.
    pub fn merge(&mut self, other: MessageTree) {
        match other {
            Self::Group(entries) => {
                if let Self::Group(map) = self {
                    for (key, value) in entries {
                        match map.entry(key) {
                            std::collections::hash_map::Entry::Occupied(mut slot) => {
                                slot.get_mut().merge(value);
                            }
                            std::collections::hash_map::Entry::Vacant(slot) => {
                                slot.insert(value);
                            }
                        }
                    }
                } else {
                    *self = Self::Group(entries);
                }
            }
            leaf => *self = leaf,
        }
    }

    /// Build a tree from a JSON value: strings become leaves, objects
    /// become groups. Any other JSON type is rejected.
    #[cfg(feature = "serde")]
    pub fn from_json(value: &serde_json::Value) -> Result<Self, MessageTreeError> {
        match value {
            serde_json::Value::String(source) => Ok(Self::Leaf(source.clone())),
            serde_json::Value::Object(entries) => {
                let mut map = FxHashMap::default();
                for (key, value) in entries {
                    map.insert(key.clone(), Self::from_json(value)?);
                }
                Ok(Self::Group(map))
            }
            other => Err(MessageTreeError::UnsupportedValue(format!("{other}"))),
        }
    }
}

/// Errors building a message tree from external data.
#[cfg(feature = "serde")]
#[derive(Debug, Clone)]
pub enum MessageTreeError {
    /// The value was neither a string nor an object.
    UnsupportedValue(String),
}

#[cfg(feature = "serde")]
impl std::fmt::Display for MessageTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedValue(value) => {
                write!(f, "unsupported message value: {value}")
            }
        }
    }
}

#[cfg(feature = "serde")]
impl std::error::Error for MessageTreeError {}

/// Message tables for every locale.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    locales: FxHashMap<String, MessageTree>,
}

impl MessageStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The message tree for a locale, if any.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&MessageTree> {
        self.locales.get(locale)
    }

    /// Replace a locale's message tree wholesale.
    pub fn set(&mut self, locale: impl Into<String>, tree: MessageTree) {
        self.locales.insert(locale.into(), tree);
    }

    /// Deep-merge a tree into a locale's table.
    pub fn merge(&mut self, locale: impl Into<String>, tree: MessageTree) {
        self.locales
            .entry(locale.into())
            .or_insert_with(MessageTree::empty)
            .merge(tree);
    }

    /// Insert a single message at a dotted keypath.
    pub fn insert(&mut self, locale: impl Into<String>, key: &str, source: impl Into<String>) {
        self.locales
            .entry(locale.into())
            .or_insert_with(MessageTree::empty)
            .insert_path(key, source.into());
    }

    /// Resolve a keypath in one locale (no fallback).
    #[must_use]
    pub fn lookup(&self, locale: &str, key: &str) -> Option<&str> {
        self.locales.get(locale)?.lookup(key)
    }

    /// All registered locale tags, sorted.
    #[must_use]
    pub fn available_locales(&self) -> Vec<&str> {
        let mut locales: Vec<&str> = self.locales.keys().map(String::as_str).collect();
        locales.sort_unstable();
        locales
    }
}
