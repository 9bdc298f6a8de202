#![forbid(unsafe_code)]

//! Locale-fallback translation runtime for Lokal.
//!
//! Owns the mutable localization state (message trees per locale,
//! datetime/number format tables, plural rules, modifiers, warn filters)
//! and exposes the `translate` operation: walk the fallback-locale chain,
//! pick the plural case, compile-or-fetch the message, interpolate, and
//! fall back (default string, missing handler, bare key, or the
//! not-resolved sentinel) when the key is absent everywhere.
//!
//! The message-format engine itself (scanner → tokenizer → parser →
//! compiled message) lives in [`lokal_message`], re-exported here as
//! [`message`].

pub mod formats;
pub mod modifiers;
pub mod plural;
pub mod store;
pub mod translator;
pub mod warn;

pub use lokal_message as message;

pub use formats::{format_options, FormatOptions, FormatTable, LocaleFormats};
pub use message::{
    MessageOutput, MessagePart, ModifierFn, ModifierMap, OutputMode, ParseError, PartKind, Value,
};
pub use modifiers::ModifierRegistry;
pub use plural::{default_plural_index, PluralRuleFn, PluralRules};
pub use store::{MessageStore, MessageTree};
#[cfg(feature = "serde")]
pub use store::MessageTreeError;
pub use translator::{
    DefaultMessage, MissingHandler, PostTranslationHook, Translated, TranslateOptions, Translator,
};
pub use warn::WarnFilter;
