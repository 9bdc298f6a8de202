#![forbid(unsafe_code)]

//! Compiled messages and the process-wide compile cache.
//!
//! Compilation lowers a parsed [`Resource`] into a [`CompiledMessage`]: a
//! pure mapping from an [`InterpolationContext`] to a [`MessageOutput`].
//! Case selection happens in the resolver; the compiled message is handed
//! the already-chosen case index and evaluates that case's nodes in order.
//!
//! # Key schema
//!
//! The cache key is `(locale, message key, source text)`. Two lookups with
//! the same triple return the identical `Arc`; compiled messages are
//! immutable and identity-stable for the life of the cache entry.
//!
//! # Invalidation
//!
//! Replacing a locale's message table must call
//! [`MessageCache::evict_locale`]; entries are never mutated in place.
//!
//! The cache is not `Sync`: evaluation is single-threaded and synchronous.
//! A multi-threaded host must serialize table writes against resolve calls.

use std::cell::RefCell;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::ast::{Node, Resource};
use crate::context::{InterpolationContext, MessageOutput, MessagePart, OutputMode, PartKind};
use crate::parser::{parse, ParseError};

/// A compiled message: evaluate with [`CompiledMessage::format`].
#[derive(Debug)]
pub struct CompiledMessage {
    resource: Resource,
}

impl CompiledMessage {
    /// Wrap an already-parsed resource.
    #[must_use]
    pub fn new(resource: Resource) -> Self {
        Self { resource }
    }

    /// Number of plural alternatives in the underlying resource.
    #[must_use]
    pub fn case_count(&self) -> usize {
        self.resource.case_count()
    }

    /// Evaluate the case selected by `ctx.case_index` (clamped to the last
    /// case) node-by-node, in order.
    #[must_use]
    pub fn format(&self, ctx: &InterpolationContext<'_>) -> MessageOutput {
        // The parser guarantees at least one case; a hand-built empty
        // resource formats as the empty message.
        let Some(last) = self.resource.cases.len().checked_sub(1) else {
            return match ctx.mode {
                OutputMode::Text => MessageOutput::Text(String::new()),
                OutputMode::Parts => MessageOutput::Parts(Vec::new()),
            };
        };
        let case = &self.resource.cases[ctx.case_index.min(last)];

        match ctx.mode {
            OutputMode::Text => {
                let mut out = String::new();
                for node in &case.nodes {
                    out.push_str(&eval_node(node, ctx).1);
                }
                MessageOutput::Text(out)
            }
            OutputMode::Parts => {
                let mut parts = Vec::with_capacity(case.nodes.len());
                for node in &case.nodes {
                    let (kind, value) = eval_node(node, ctx);
                    parts.push(MessagePart { kind, value });
                }
                MessageOutput::Parts(parts)
            }
        }
    }
}

fn eval_node(node: &Node, ctx: &InterpolationContext<'_>) -> (PartKind, String) {
    match node {
        Node::Text(text) => (PartKind::Text, text.clone()),
        Node::List(index) => {
            let value = match ctx.list.get(*index) {
                Some(value) => value.to_string(),
                None => {
                    tracing::warn!(index = *index, "missing positional argument in interpolation");
                    String::new()
                }
            };
            (PartKind::List, value)
        }
        Node::Named(key) => {
            let value = match ctx.named.get(key) {
                Some(value) => value.to_string(),
                // `count`/`n` fall back to the plural choice.
                None => match ctx.choice {
                    Some(choice) if key == "count" || key == "n" => choice.to_string(),
                    _ => {
                        tracing::warn!(key = %key, "missing named argument in interpolation");
                        String::new()
                    }
                },
            };
            (PartKind::Named, value)
        }
        Node::Linked { key, modifier } => {
            let raw = (ctx.linked)(key);
            let value = match modifier {
                Some(name) => match ctx.modifiers.get(name) {
                    Some(apply) => apply(&raw),
                    None => {
                        tracing::warn!(modifier = %name, "unknown modifier in linked message");
                        raw
                    }
                },
                None => raw,
            };
            (PartKind::Linked, value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    locale: String,
    key: String,
    source: String,
}

/// Process-wide cache of compiled messages, keyed by
/// `(locale, message key, source text)`.
#[derive(Debug, Default)]
pub struct MessageCache {
    entries: RefCell<FxHashMap<CacheKey, Arc<CompiledMessage>>>,
}

impl MessageCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached compiled message for the triple, compiling (and
    /// caching) on a miss. A hit returns the identical `Arc`.
    pub fn get_or_compile(
        &self,
        locale: &str,
        key: &str,
        source: &str,
    ) -> Result<Arc<CompiledMessage>, ParseError> {
        let cache_key = CacheKey {
            locale: locale.to_string(),
            key: key.to_string(),
            source: source.to_string(),
        };
        if let Some(hit) = self.entries.borrow().get(&cache_key) {
            return Ok(Arc::clone(hit));
        }
        tracing::debug!(locale, key, "compiling message source");
        let resource = parse(source)?;
        let compiled = Arc::new(CompiledMessage::new(resource));
        self.entries
            .borrow_mut()
            .insert(cache_key, Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Drop every entry belonging to `locale`.
    pub fn evict_locale(&self, locale: &str) {
        self.entries
            .borrow_mut()
            .retain(|key, _| key.locale != locale);
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    /// Number of cached messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}
