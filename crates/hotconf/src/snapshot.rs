//! Immutable section → key → value mapping.
//!
//! A [`Snapshot`] is the complete result of one parse of a configuration
//! file. Stores never mutate a snapshot in place; a reload builds a fresh one
//! and swaps it in whole.

use std::collections::HashMap;

/// Section that receives `key=value` lines appearing before any header.
pub const DEFAULT_SECTION: &str = "Default";

/// Keys and values of a single section.
pub type Section = HashMap<String, String>;

/// The parsed contents of a configuration file.
///
/// Section and key names are case-sensitive. Keys are unique within a
/// section; iteration order is unspecified.
///
/// # Example
///
/// ```
/// use hotconf::parse_str;
///
/// let parsed = parse_str("name = demo\n[server]\nport = 8080\n");
/// let snapshot = parsed.snapshot;
///
/// assert_eq!(snapshot.get("Default", "name"), Some("demo"));
/// assert_eq!(snapshot.get("server", "port"), Some("8080"));
/// assert_eq!(snapshot.get("server", "host"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    sections: HashMap<String, Section>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key` inside `section`.
    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(String::as_str)
    }

    /// Borrow a whole section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    /// Returns `true` if `section` holds `key`.
    #[must_use]
    pub fn contains(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    /// Iterate over section names.
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Iterate over the keys of `section`. Empty if the section is absent.
    pub fn keys<'a>(&'a self, section: &str) -> impl Iterator<Item = &'a str> {
        self.sections
            .get(section)
            .into_iter()
            .flat_map(|s| s.keys().map(String::as_str))
    }

    /// Total number of stored key/value pairs across all sections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no key/value pair is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a value, replacing any earlier one for the same pair.
    ///
    /// Keys are trimmed; a key that is empty after trimming is dropped.
    pub(crate) fn insert(&mut self, section: &str, key: &str, value: String) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }

        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("Default", "host", "localhost".to_string());
        snapshot.insert("db", "port", "5432".to_string());

        assert_eq!(snapshot.get("Default", "host"), Some("localhost"));
        assert_eq!(snapshot.get("db", "port"), Some("5432"));
        assert_eq!(snapshot.get("db", "host"), None);
        assert_eq!(snapshot.get("missing", "host"), None);
        assert_eq!(snapshot.len(), 2);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("Default", "k", "one".to_string());
        snapshot.insert("Default", "k", "two".to_string());

        assert_eq!(snapshot.get("Default", "k"), Some("two"));
        assert_eq!(snapshot.len(), 1);
    }

    #[test]
    fn test_empty_key_is_dropped() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("Default", "   ", "value".to_string());

        assert!(snapshot.is_empty());
        assert_eq!(snapshot.sections().count(), 0);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let mut snapshot = Snapshot::new();
        snapshot.insert("Server", "Port", "1".to_string());

        assert!(snapshot.contains("Server", "Port"));
        assert!(!snapshot.contains("server", "Port"));
        assert!(!snapshot.contains("Server", "port"));
    }

    #[test]
    fn test_keys_of_missing_section() {
        let snapshot = Snapshot::new();
        assert_eq!(snapshot.keys("nope").count(), 0);
        assert!(snapshot.section("nope").is_none());
    }
}
