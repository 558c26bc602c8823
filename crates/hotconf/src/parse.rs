//! Line-oriented parser for INI-style configuration files.
//!
//! # Grammar
//!
//! Every line is trimmed before it is classified:
//!
//! | Line | Meaning |
//! |------|---------|
//! | empty, or starting with `#` | ignored |
//! | `[name]` | switches the current section to `name` (trimmed) |
//! | `key = value` | stores `value` under `key` in the current section |
//! | anything else | reported as a [`MalformedLine`] and skipped |
//!
//! Lines before the first header belong to [`DEFAULT_SECTION`]. A value that
//! starts with `"` is cut at the *last* `"` on the line, so
//! `key = "hello world"` yields `hello world`. There are no escape sequences.
//!
//! A UTF-8 byte-order-mark at the very start of the input is skipped.
//!
//! Malformed lines never abort a parse; they are collected in
//! [`Parsed::warnings`] so the caller can report them.

use std::io::BufRead;

use miette::Diagnostic;
use thiserror::Error;

use crate::snapshot::{DEFAULT_SECTION, Snapshot};

const BOM: char = '\u{feff}';

/// Why a line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// The line has no `=`.
    MissingSeparator,
    /// The line starts with `=`.
    EmptyKey,
    /// A quoted value has no closing `"`. An empty value is stored.
    UnterminatedQuote,
}

impl std::fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "expected `key = value`"),

            Self::EmptyKey => write!(f, "key is empty"),

            Self::UnterminatedQuote => write!(f, "quoted value is not terminated"),
        }
    }
}

/// A line the parser could not fully understand.
///
/// These are warnings: parsing continues with the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("malformed line {line}: {kind}: {text:?}")]
#[diagnostic(
    code(hotconf::parse::malformed_line),
    severity(Warning),
    help("lines must be blank, `# comment`, `[section]` or `key = value`")
)]
pub struct MalformedLine {
    /// 1-based line number.
    pub line: usize,
    /// The trimmed line text.
    pub text: String,
    /// What was wrong with it.
    pub kind: MalformedKind,
}

/// Output of a successful parse.
#[derive(Debug, Clone, Default)]
pub struct Parsed {
    /// The parsed configuration.
    pub snapshot: Snapshot,
    /// Lines that were skipped or only partially understood.
    pub warnings: Vec<MalformedLine>,
}

/// Incremental parser state.
struct LineParser {
    section: String,
    parsed: Parsed,
}

impl LineParser {
    fn new() -> Self {
        Self {
            section: DEFAULT_SECTION.to_string(),
            parsed: Parsed::default(),
        }
    }

    fn feed(&mut self, number: usize, raw: &str) {
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            return;
        }

        if line.len() >= 2 && line.starts_with('[') && line.ends_with(']') {
            let name = line[1..line.len() - 1].trim();
            self.section = if name.is_empty() {
                DEFAULT_SECTION.to_string()
            } else {
                name.to_string()
            };
            return;
        }

        let eq = match line.find('=') {
            Some(0) => return self.warn(number, line, MalformedKind::EmptyKey),
            Some(i) => i,
            None => return self.warn(number, line, MalformedKind::MissingSeparator),
        };

        let key = &line[..eq];
        let value = match unquote(line[eq + 1..].trim()) {
            Ok(v) => v,
            Err(kind) => {
                self.warn(number, line, kind);
                ""
            }
        };

        self.parsed
            .snapshot
            .insert(&self.section, key, value.to_string());
    }

    fn warn(&mut self, line: usize, text: &str, kind: MalformedKind) {
        self.parsed.warnings.push(MalformedLine {
            line,
            text: text.to_string(),
            kind,
        });
    }

    fn finish(self) -> Parsed {
        self.parsed
    }
}

/// Strip surrounding double quotes from an already trimmed value.
fn unquote(value: &str) -> Result<&str, MalformedKind> {
    if value.len() < 2 || !value.starts_with('"') {
        return Ok(value);
    }

    let inner = &value[1..];
    inner
        .rfind('"')
        .map(|end| &inner[..end])
        .ok_or(MalformedKind::UnterminatedQuote)
}

/// Parse configuration text held in memory.
///
/// # Example
///
/// ```
/// let parsed = hotconf::parse_str("key = \"hello world\"\nbroken\n");
///
/// assert_eq!(parsed.snapshot.get("Default", "key"), Some("hello world"));
/// assert_eq!(parsed.warnings.len(), 1);
/// ```
#[must_use]
pub fn parse_str(input: &str) -> Parsed {
    let input = input.strip_prefix(BOM).unwrap_or(input);
    let mut parser = LineParser::new();

    for (i, line) in input.lines().enumerate() {
        parser.feed(i + 1, line);
    }

    parser.finish()
}

/// Parse configuration text from a buffered reader.
///
/// # Errors
///
/// Returns the underlying I/O error if reading fails part way through,
/// including when the input is not valid UTF-8. A snapshot is only produced
/// once the whole input has been consumed.
pub fn parse_reader<R: BufRead>(reader: R) -> std::io::Result<Parsed> {
    let mut parser = LineParser::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let text = if i == 0 {
            line.strip_prefix(BOM).unwrap_or(&line)
        } else {
            &line
        };
        parser.feed(i + 1, text);
    }

    Ok(parser.finish())
}
