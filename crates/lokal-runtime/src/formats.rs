#![forbid(unsafe_code)]

//! Datetime/number format tables for rich-output callers.
//!
//! The runtime stores named format specs per locale, option bags like
//! `{ style: "currency", currency: "USD" }`, and exposes get/set/merge
//! passthroughs. Executing the specs (actual date or number rendering) is a
//! collaborator concern and out of scope here.

use rustc_hash::FxHashMap;

/// One named format spec: option key to option value.
pub type FormatOptions = FxHashMap<String, String>;

/// A locale's named format specs.
pub type LocaleFormats = FxHashMap<String, FormatOptions>;

/// Named format specs for every locale. Used twice by the translator: once
/// for datetime formats, once for number formats.
#[derive(Debug, Clone, Default)]
pub struct FormatTable {
    locales: FxHashMap<String, LocaleFormats>,
}

impl FormatTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The named formats for a locale, if any.
    #[must_use]
    pub fn get(&self, locale: &str) -> Option<&LocaleFormats> {
        self.locales.get(locale)
    }

    /// Replace a locale's formats wholesale.
    pub fn set(&mut self, locale: impl Into<String>, formats: LocaleFormats) {
        self.locales.insert(locale.into(), formats);
    }

    /// Merge formats into a locale's table, name by name. An incoming name
    /// replaces an existing spec of the same name.
    pub fn merge(&mut self, locale: impl Into<String>, formats: LocaleFormats) {
        let slot = self.locales.entry(locale.into()).or_default();
        for (name, options) in formats {
            slot.insert(name, options);
        }
    }
}

/// Build a [`FormatOptions`] from `(key, value)` pairs.
#[must_use]
pub fn format_options<'a, I>(pairs: I) -> FormatOptions
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}
