//! Property-based tests for parser invariants.

#![allow(clippy::pedantic)]

use hotconf::{DEFAULT_SECTION, parse_reader, parse_str};
use proptest::prelude::*;

/// Names that survive trimming and contain no syntax characters.
fn name() -> impl Strategy<Value = String> {
    "[A-Za-z_][A-Za-z0-9_.-]{0,15}"
}

/// Unquoted values: no surrounding whitespace, no leading quote.
fn plain_value() -> impl Strategy<Value = String> {
    "([A-Za-z0-9_./:-][A-Za-z0-9 _./:=-]{0,30}[A-Za-z0-9_./:-])?"
}

proptest! {
    /// The parser never panics, whatever the input.
    #[test]
    fn parse_never_panics(s in ".*") {
        let _ = parse_str(&s);
    }

    /// Reader and in-memory parsing agree on valid UTF-8 input.
    #[test]
    fn reader_matches_str(s in "[\\PC\n]{0,200}") {
        let from_str = parse_str(&s);
        let from_reader = parse_reader(s.as_bytes()).unwrap();

        prop_assert_eq!(from_str.snapshot, from_reader.snapshot);
        prop_assert_eq!(from_str.warnings, from_reader.warnings);
    }

    /// A well-formed line is retrievable under its section.
    #[test]
    fn well_formed_line_is_retrievable(
        section in name(),
        key in name(),
        value in plain_value(),
        pad in " {0,3}",
    ) {
        let text = format!("[{section}]\n{pad}{key}{pad}={pad}{value}{pad}\n");
        let parsed = parse_str(&text);

        prop_assert_eq!(parsed.snapshot.get(&section, &key), Some(value.as_str()));
        prop_assert!(parsed.warnings.is_empty());
    }

    /// Quoted values come back without their quotes.
    #[test]
    fn quoted_value_is_unwrapped(key in name(), value in "[^\"\n\r]{0,30}") {
        let text = format!("{key} = \"{value}\"\n");
        let parsed = parse_str(&text);

        prop_assert_eq!(parsed.snapshot.get(DEFAULT_SECTION, &key), Some(value.as_str()));
    }

    /// Later assignments to the same key win.
    #[test]
    fn last_assignment_wins(key in name(), values in prop::collection::vec(plain_value(), 1..8)) {
        let text: String = values.iter().map(|v| format!("{key}={v}\n")).collect();
        let parsed = parse_str(&text);

        prop_assert_eq!(parsed.snapshot.get(DEFAULT_SECTION, &key), values.last().map(String::as_str));
        prop_assert_eq!(parsed.snapshot.len(), 1);
    }

    /// Lines without `=` never store anything.
    #[test]
    fn lines_without_separator_store_nothing(lines in prop::collection::vec("[^=\\[\n\r]{1,20}", 0..10)) {
        let text = lines.join("\n");
        let parsed = parse_str(&text);

        prop_assert!(parsed.snapshot.is_empty());
    }
}
