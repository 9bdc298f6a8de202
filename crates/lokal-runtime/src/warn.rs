#![forbid(unsafe_code)]

//! Gating for missing-translation and fallback warnings.
//!
//! Warnings are emitted through `tracing` and gated per key: a boolean
//! enables/disables them wholesale, a pattern restricts them to matching
//! keys. Both the translator configuration and individual translate calls
//! carry filters; a per-call boolean override replaces the configured one.

use regex::Regex;

/// Which keys a warning category fires for.
#[derive(Debug, Clone)]
pub enum WarnFilter {
    /// Warn for every key.
    All,
    /// Never warn.
    Never,
    /// Warn only for keys matching the pattern.
    Keys(Regex),
}

impl WarnFilter {
    /// Whether a warning should fire for `key`.
    #[must_use]
    pub fn applies(&self, key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Never => false,
            Self::Keys(pattern) => pattern.is_match(key),
        }
    }
}

impl Default for WarnFilter {
    fn default() -> Self {
        Self::All
    }
}

impl From<bool> for WarnFilter {
    fn from(enabled: bool) -> Self {
        if enabled { Self::All } else { Self::Never }
    }
}

impl From<Regex> for WarnFilter {
    fn from(pattern: Regex) -> Self {
        Self::Keys(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_gate_wholesale() {
        assert!(WarnFilter::from(true).applies("anything"));
        assert!(!WarnFilter::from(false).applies("anything"));
    }

    #[test]
    fn patterns_gate_per_key() {
        let filter = WarnFilter::from(Regex::new("^hi").unwrap());
        assert!(filter.applies("hi kazupon!"));
        assert!(!filter.applies("hello"));
    }

    #[test]
    fn default_warns_for_everything() {
        assert!(WarnFilter::default().applies("hello"));
    }
}
