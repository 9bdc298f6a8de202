#![forbid(unsafe_code)]

//! The runtime resolver: locale fallback, plural selection, and missing-key
//! handling around the compiled-message engine.
//!
//! One [`Translator`] owns the localization state for a scope; independent
//! instances share nothing. Resolution walks the candidate locale chain
//! (requested locale, then configured fallbacks, duplicates skipped), picks
//! the plural case, evaluates the compiled message, and otherwise degrades
//! deterministically: explicit default, missing handler, the not-resolved
//! sentinel, or the bare key, in that order. Missing keys never error; only
//! structurally invalid message source does.
//!
//! Warnings go through `tracing`, gated by [`WarnFilter`]s that per-call
//! boolean overrides replace.
//!
//! Evaluation is single-threaded and synchronous; a multi-threaded host
//! must serialize table writes against resolve calls.

use lokal_message::{
    InterpolationContext, MessageCache, MessageOutput, MessagePart, OutputMode, ParseError, Value,
};
use rustc_hash::FxHashMap;

use crate::formats::{FormatTable, LocaleFormats};
use crate::modifiers::ModifierRegistry;
use crate::plural::PluralRules;
use crate::store::{MessageStore, MessageTree};
use crate::warn::WarnFilter;

/// Host hook invoked when a key resolves nowhere. Returning `None` falls
/// back to the bare key. Configuring a handler suppresses missing-key
/// warnings.
pub type MissingHandler = Box<dyn Fn(&str, &str) -> Option<String>>;

/// Host hook applied to every resolved text result.
pub type PostTranslationHook = Box<dyn Fn(String) -> String>;

/// The explicit fallback message of a single translate call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultMessage {
    /// Use this literal as the message source.
    Literal(String),
    /// Use the key itself as the message source.
    UseKey,
}

/// Per-call inputs to [`Translator::translate`].
#[derive(Debug, Default)]
pub struct TranslateOptions {
    /// Positional arguments for `{0}`-style interpolation.
    pub list: Vec<Value>,
    /// Named arguments for `{name}`-style interpolation.
    pub named: FxHashMap<String, Value>,
    /// Plural choice count; selects the case and feeds implicit
    /// `{count}` / `{n}` substitution.
    pub plural: Option<i64>,
    /// Locale override for this call.
    pub locale: Option<String>,
    /// Fallback message when the key resolves nowhere.
    pub default_message: Option<DefaultMessage>,
    /// Per-call override of the missing-warning filter.
    pub missing_warn: Option<bool>,
    /// Per-call override of the fallback-warning filter.
    pub fallback_warn: Option<bool>,
    /// Plain text or typed parts.
    pub mode: OutputMode,
}

impl TranslateOptions {
    /// Options with no arguments and no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set positional arguments.
    #[must_use]
    pub fn with_list<I, V>(mut self, list: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.list = list.into_iter().map(Into::into).collect();
        self
    }

    /// Add one named argument.
    #[must_use]
    pub fn with_named(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(key.into(), value.into());
        self
    }

    /// Set the plural choice count.
    #[must_use]
    pub fn with_plural(mut self, choice: i64) -> Self {
        self.plural = Some(choice);
        self
    }

    /// Override the locale for this call.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Supply a literal default message.
    #[must_use]
    pub fn with_default(mut self, source: impl Into<String>) -> Self {
        self.default_message = Some(DefaultMessage::Literal(source.into()));
        self
    }

    /// Use the key itself as the default message source.
    #[must_use]
    pub fn with_key_as_default(mut self) -> Self {
        self.default_message = Some(DefaultMessage::UseKey);
        self
    }

    /// Override missing-warning gating for this call.
    #[must_use]
    pub fn with_missing_warn(mut self, enabled: bool) -> Self {
        self.missing_warn = Some(enabled);
        self
    }

    /// Override fallback-warning gating for this call.
    #[must_use]
    pub fn with_fallback_warn(mut self, enabled: bool) -> Self {
        self.fallback_warn = Some(enabled);
        self
    }

    /// Request typed output parts instead of a flat string.
    #[must_use]
    pub fn with_parts(mut self) -> Self {
        self.mode = OutputMode::Parts;
        self
    }
}

/// The outcome of a translate call.
#[derive(Debug, Clone, PartialEq)]
pub enum Translated {
    /// Flat text output.
    Text(String),
    /// Typed output parts ([`OutputMode::Parts`]).
    Parts(Vec<MessagePart>),
    /// The not-resolved sentinel: the key resolved nowhere and the
    /// translator is configured as unresolving.
    NotResolved,
}

impl Translated {
    /// The text output, if this is a resolved flat result.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Flatten any resolved output into text.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::Parts(parts) => Some(parts.into_iter().map(|part| part.value).collect()),
            Self::NotResolved => None,
        }
    }

    /// Whether the key resolved to output.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::NotResolved)
    }
}

/// The runtime resolver for one localization scope.
pub struct Translator {
    locale: String,
    fallback_locales: Vec<String>,
    messages: MessageStore,
    datetime_formats: FormatTable,
    number_formats: FormatTable,
    plural_rules: PluralRules,
    modifiers: ModifierRegistry,
    missing: Option<MissingHandler>,
    missing_warn: WarnFilter,
    fallback_warn: WarnFilter,
    fallback_format: bool,
    unresolving: bool,
    post_translation: Option<PostTranslationHook>,
    cache: MessageCache,
}

impl std::fmt::Debug for Translator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Translator")
            .field("locale", &self.locale)
            .field("fallback_locales", &self.fallback_locales)
            .field("available_locales", &self.available_locales())
            .finish_non_exhaustive()
    }
}

impl Translator {
    /// A translator for `locale` with no messages, default warn filters,
    /// and the built-in modifiers.
    #[must_use]
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            fallback_locales: Vec::new(),
            messages: MessageStore::new(),
            datetime_formats: FormatTable::new(),
            number_formats: FormatTable::new(),
            plural_rules: PluralRules::new(),
            modifiers: ModifierRegistry::new(),
            missing: None,
            missing_warn: WarnFilter::All,
            fallback_warn: WarnFilter::All,
            fallback_format: false,
            unresolving: false,
            post_translation: None,
            cache: MessageCache::new(),
        }
    }

    // -----------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------

    /// The current locale.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Change the current locale.
    pub fn set_locale(&mut self, locale: impl Into<String>) {
        self.locale = locale.into();
    }

    /// The configured fallback chain.
    #[must_use]
    pub fn fallback_locales(&self) -> &[String] {
        &self.fallback_locales
    }

    /// Set the ordered fallback-locale chain.
    pub fn set_fallback_locales<I, L>(&mut self, locales: I)
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.fallback_locales = locales.into_iter().map(Into::into).collect();
    }

    /// Install the missing-key handler.
    pub fn set_missing_handler(
        &mut self,
        handler: impl Fn(&str, &str) -> Option<String> + 'static,
    ) {
        self.missing = Some(Box::new(handler));
    }

    /// Install the post-translation hook, applied to text results.
    pub fn set_post_translation(&mut self, hook: impl Fn(String) -> String + 'static) {
        self.post_translation = Some(Box::new(hook));
    }

    /// Gate missing-key warnings.
    pub fn set_missing_warn(&mut self, filter: impl Into<WarnFilter>) {
        self.missing_warn = filter.into();
    }

    /// Gate fallback warnings.
    pub fn set_fallback_warn(&mut self, filter: impl Into<WarnFilter>) {
        self.fallback_warn = filter.into();
    }

    /// When set, an unresolved key is formatted as its own message source.
    pub fn set_fallback_format(&mut self, enabled: bool) {
        self.fallback_format = enabled;
    }

    /// When set, an unresolved key yields [`Translated::NotResolved`]
    /// instead of the bare key.
    pub fn set_unresolving(&mut self, enabled: bool) {
        self.unresolving = enabled;
    }

    /// Override the plural rule for a locale.
    pub fn set_plural_rule(
        &mut self,
        locale: impl Into<String>,
        rule: impl Fn(i64, usize) -> usize + 'static,
    ) {
        self.plural_rules.set(locale, rule);
    }

    /// Register a link modifier.
    pub fn register_modifier(
        &mut self,
        name: impl Into<String>,
        transform: impl Fn(&str) -> String + 'static,
    ) {
        self.modifiers.register(name, transform);
    }

    // -----------------------------------------------------------------
    // Message and format tables
    // -----------------------------------------------------------------

    /// The message tree for a locale.
    #[must_use]
    pub fn get_locale_message(&self, locale: &str) -> Option<&MessageTree> {
        self.messages.get(locale)
    }

    /// Replace a locale's messages wholesale, evicting its compiled cache.
    pub fn set_locale_message(&mut self, locale: &str, tree: MessageTree) {
        self.messages.set(locale, tree);
        self.cache.evict_locale(locale);
    }

    /// Deep-merge messages into a locale, evicting its compiled cache.
    pub fn merge_locale_message(&mut self, locale: &str, tree: MessageTree) {
        self.messages.merge(locale, tree);
        self.cache.evict_locale(locale);
    }

    /// Insert one message at a dotted keypath, evicting the locale's
    /// compiled cache.
    pub fn add_message(&mut self, locale: &str, key: &str, source: impl Into<String>) {
        self.messages.insert(locale, key, source);
        self.cache.evict_locale(locale);
    }

    /// All locales with a message table, sorted.
    #[must_use]
    pub fn available_locales(&self) -> Vec<&str> {
        self.messages.available_locales()
    }

    /// Whether `key` resolves directly in `locale` (or the current locale);
    /// the fallback chain is not consulted.
    #[must_use]
    pub fn has_translation(&self, key: &str, locale: Option<&str>) -> bool {
        let locale = locale.unwrap_or(&self.locale);
        self.messages.lookup(locale, key).is_some()
    }

    /// The datetime formats for a locale.
    #[must_use]
    pub fn get_datetime_format(&self, locale: &str) -> Option<&LocaleFormats> {
        self.datetime_formats.get(locale)
    }

    /// Replace a locale's datetime formats wholesale.
    pub fn set_datetime_format(&mut self, locale: &str, formats: LocaleFormats) {
        self.datetime_formats.set(locale, formats);
    }

    /// Merge datetime formats into a locale, name by name.
    pub fn merge_datetime_format(&mut self, locale: &str, formats: LocaleFormats) {
        self.datetime_formats.merge(locale, formats);
    }

    /// The number formats for a locale.
    #[must_use]
    pub fn get_number_format(&self, locale: &str) -> Option<&LocaleFormats> {
        self.number_formats.get(locale)
    }

    /// Replace a locale's number formats wholesale.
    pub fn set_number_format(&mut self, locale: &str, formats: LocaleFormats) {
        self.number_formats.set(locale, formats);
    }

    /// Merge number formats into a locale, name by name.
    pub fn merge_number_format(&mut self, locale: &str, formats: LocaleFormats) {
        self.number_formats.merge(locale, formats);
    }

    // -----------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------

    /// Resolve `key` with the given options.
    ///
    /// Missing keys never error; they degrade to the explicit default, the
    /// missing handler, [`Translated::NotResolved`] (unresolving mode), or
    /// the bare key. `Err` means the resolved message source itself is
    /// structurally invalid, which affects only this key.
    pub fn translate(
        &self,
        key: &str,
        options: &TranslateOptions,
    ) -> Result<Translated, ParseError> {
        let result = self.resolve(key, options)?;
        Ok(match (&self.post_translation, result) {
            (Some(hook), Translated::Text(text)) => Translated::Text(hook(text)),
            (_, other) => other,
        })
    }

    /// Convenience resolve-to-string: parse failures and the not-resolved
    /// sentinel collapse to the bare key.
    #[must_use]
    pub fn t(&self, key: &str) -> String {
        match self.translate(key, &TranslateOptions::default()) {
            Ok(translated) => translated.into_text().unwrap_or_else(|| key.to_string()),
            Err(_) => key.to_string(),
        }
    }

    fn resolve(&self, key: &str, options: &TranslateOptions) -> Result<Translated, ParseError> {
        let start_locale = options.locale.as_deref().unwrap_or(&self.locale);
        let fallback_warn = effective(options.fallback_warn, &self.fallback_warn);

        // Candidate chain: requested locale plus fallbacks, skipping any
        // locale already in the chain.
        let mut chain: Vec<&str> = Vec::with_capacity(1 + self.fallback_locales.len());
        chain.push(start_locale);
        for fallback in &self.fallback_locales {
            if chain.iter().any(|tried| *tried == fallback.as_str()) {
                continue;
            }
            chain.push(fallback);
        }

        let mut found: Option<(&str, &str)> = None;
        for (hop, locale) in chain.iter().copied().enumerate() {
            if let Some(source) = self.messages.lookup(locale, key) {
                found = Some((locale, source));
                break;
            }
            if hop + 1 < chain.len() && fallback_warn.applies(key) {
                let rest = chain[hop + 1..].join(",");
                tracing::warn!("Fall back to translate '{key}' with '{rest}' locale.");
            }
        }

        if let Some((locale, source)) = found {
            return self.format_message(key, locale, source, options);
        }

        // The key resolved nowhere. Degrade in precedence order.
        let default_source = match &options.default_message {
            Some(DefaultMessage::Literal(source)) => Some(source.as_str()),
            Some(DefaultMessage::UseKey) => Some(key),
            None if self.fallback_format => Some(key),
            None => None,
        };
        if let Some(source) = default_source {
            return self.format_message(key, start_locale, source, options);
        }

        if let Some(missing) = &self.missing {
            return Ok(Translated::Text(
                missing(start_locale, key).unwrap_or_else(|| key.to_string()),
            ));
        }

        if effective(options.missing_warn, &self.missing_warn).applies(key) {
            tracing::warn!("Cannot translate the value of '{key}'. Use the value of key as default.");
        }
        if self.unresolving {
            return Ok(Translated::NotResolved);
        }
        Ok(Translated::Text(key.to_string()))
    }

    fn format_message(
        &self,
        key: &str,
        locale: &str,
        source: &str,
        options: &TranslateOptions,
    ) -> Result<Translated, ParseError> {
        let compiled = self.cache.get_or_compile(locale, key, source)?;
        let case_count = compiled.case_count();
        let case_index = if case_count > 1 {
            self.plural_rules
                .index_for(locale, options.plural.unwrap_or(1), case_count)
        } else {
            0
        };

        // Linked messages resolve in the locale the parent message came
        // from, re-entrantly and with their own fallback walk.
        let linked = |linked_key: &str| -> String {
            let link_options = TranslateOptions {
                list: options.list.clone(),
                named: options.named.clone(),
                plural: options.plural,
                locale: Some(locale.to_string()),
                default_message: None,
                missing_warn: options.missing_warn,
                fallback_warn: options.fallback_warn,
                mode: OutputMode::Text,
            };
            match self.resolve(linked_key, &link_options) {
                Ok(translated) => translated
                    .into_text()
                    .unwrap_or_else(|| linked_key.to_string()),
                Err(error) => {
                    tracing::warn!(key = linked_key, %error, "failed to format linked message");
                    linked_key.to_string()
                }
            }
        };

        let ctx = InterpolationContext {
            list: &options.list,
            named: &options.named,
            choice: options.plural,
            case_index,
            mode: options.mode,
            modifiers: self.modifiers.map(),
            linked: &linked,
        };
        Ok(match compiled.format(&ctx) {
            MessageOutput::Text(text) => Translated::Text(text),
            MessageOutput::Parts(parts) => Translated::Parts(parts),
        })
    }
}

fn effective(override_flag: Option<bool>, configured: &WarnFilter) -> WarnFilter {
    match override_flag {
        Some(flag) => WarnFilter::from(flag),
        None => configured.clone(),
    }
}
