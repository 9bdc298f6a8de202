#![forbid(unsafe_code)]

//! Modifier registry for `@.modifier:key` links.
//!
//! A modifier is a pure string transform applied to the resolved text of a
//! linked message. `upper`, `lower`, and `capitalize` ship built in; hosts
//! register additional ones (or replace the built-ins) by name.

use lokal_message::{ModifierFn, ModifierMap};

/// Named string transforms available to linked messages.
pub struct ModifierRegistry {
    map: ModifierMap,
}

impl std::fmt::Debug for ModifierRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.map.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ModifierRegistry")
            .field("names", &names)
            .finish()
    }
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierRegistry {
    /// Registry with the built-in modifiers.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("upper", |s| s.to_uppercase());
        registry.register("lower", |s| s.to_lowercase());
        registry.register("capitalize", capitalize);
        registry
    }

    /// Registry with no modifiers at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            map: ModifierMap::default(),
        }
    }

    /// Register a modifier, replacing any existing one of the same name.
    pub fn register(&mut self, name: impl Into<String>, transform: impl Fn(&str) -> String + 'static) {
        self.map.insert(name.into(), Box::new(transform));
    }

    /// The transform registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ModifierFn> {
        self.map.get(name)
    }

    /// The raw name-to-transform map, as the interpolation context expects.
    #[must_use]
    pub fn map(&self) -> &ModifierMap {
        &self.map
    }
}

fn capitalize(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
