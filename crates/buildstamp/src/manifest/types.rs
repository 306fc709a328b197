//! Manifest Types
//!
//! In-memory form of a packaging manifest: a main attribute section followed
//! by optional per-entry sections.

use std::collections::BTreeMap;

/// Attribute carrying the implementation version
pub const IMPLEMENTATION_VERSION: &str = "Implementation-Version";

/// Attribute carrying the build timestamp
pub const BUILD_TIME: &str = "Build-Time";

/// Attribute that opens every per-entry section
pub const ENTRY_NAME: &str = "Name";

/// Ordered attribute section
///
/// Names compare ASCII-case-insensitively; the spelling of the first
/// occurrence is kept for iteration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by attribute name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();

        match self
            .entries
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed packaging manifest
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    main: Attributes,
    entries: BTreeMap<String, Attributes>,
}

impl Manifest {
    pub fn new(main: Attributes, entries: BTreeMap<String, Attributes>) -> Self {
        Self { main, entries }
    }

    /// Main (top-level) attribute section
    pub fn main_attributes(&self) -> &Attributes {
        &self.main
    }

    /// Per-entry section for the given `Name:` value
    pub fn entry_attributes(&self, name: &str) -> Option<&Attributes> {
        self.entries.get(name)
    }

    pub fn implementation_version(&self) -> Option<&str> {
        self.main.get(IMPLEMENTATION_VERSION)
    }

    pub fn build_time(&self) -> Option<&str> {
        self.main.get(BUILD_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut attrs = Attributes::new();
        attrs.insert("Implementation-Version", "1.0");
        assert_eq!(attrs.get("implementation-version"), Some("1.0"));
        assert_eq!(attrs.get("IMPLEMENTATION-VERSION"), Some("1.0"));
    }

    #[test]
    fn test_insert_replaces_case_variant() {
        let mut attrs = Attributes::new();
        assert_eq!(attrs.insert("Build-Time", "a"), None);
        assert_eq!(attrs.insert("build-time", "b"), Some("a".to_string()));
        assert_eq!(attrs.len(), 1);

        let (name, value) = attrs.iter().next().unwrap();
        assert_eq!(name, "Build-Time");
        assert_eq!(value, "b");
    }

    #[test]
    fn test_absent_attribute() {
        let manifest = Manifest::default();
        assert!(manifest.implementation_version().is_none());
        assert!(manifest.build_time().is_none());
        assert!(manifest.entry_attributes("com/example/").is_none());
    }
}
