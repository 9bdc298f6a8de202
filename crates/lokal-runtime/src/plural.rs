#![forbid(unsafe_code)]

//! Plural-rule table: choice count to case index, per locale.
//!
//! A message with pipe-separated alternatives needs a rule to turn the
//! numeric choice count into a case index. The generic default maps 0 to
//! the first case, 1 to the second (when present), and larger counts to the
//! last case. Languages with richer plural systems register a rule per
//! locale, which replaces the default entirely; rule output is clamped to
//! the case count so a misbehaving rule can never select out of range.

use rustc_hash::FxHashMap;

/// A plural rule: `(choice count, case count) -> case index`.
pub type PluralRuleFn = Box<dyn Fn(i64, usize) -> usize>;

/// The generic rule used when a locale has no override: `|choice|` clamped
/// to the last case. 0 selects case 0; 1 selects case 1 if present, else
/// the last case; larger counts select `min(choice, cases - 1)`.
#[must_use]
pub fn default_plural_index(choice: i64, case_count: usize) -> usize {
    if case_count <= 1 {
        return 0;
    }
    (choice.unsigned_abs() as usize).min(case_count - 1)
}

/// Per-locale plural-rule overrides.
#[derive(Default)]
pub struct PluralRules {
    rules: FxHashMap<String, PluralRuleFn>,
}

impl std::fmt::Debug for PluralRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut locales: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        locales.sort_unstable();
        f.debug_struct("PluralRules")
            .field("locales", &locales)
            .finish()
    }
}

impl PluralRules {
    /// Create an empty rule table (every locale uses the default rule).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for a locale, replacing the default and any earlier
    /// override.
    pub fn set(&mut self, locale: impl Into<String>, rule: impl Fn(i64, usize) -> usize + 'static) {
        self.rules.insert(locale.into(), Box::new(rule));
    }

    /// Whether a locale has an override.
    #[must_use]
    pub fn contains(&self, locale: &str) -> bool {
        self.rules.contains_key(locale)
    }

    /// Case index for `choice` in `locale`, clamped to `case_count`.
    #[must_use]
    pub fn index_for(&self, locale: &str, choice: i64, case_count: usize) -> usize {
        if case_count <= 1 {
            return 0;
        }
        let index = match self.rules.get(locale) {
            Some(rule) => rule(choice, case_count),
            None => default_plural_index(choice, case_count),
        };
        index.min(case_count - 1)
    }
}
