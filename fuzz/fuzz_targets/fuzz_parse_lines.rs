#![no_main]

use arbitrary::Arbitrary;
use hotconf::{DEFAULT_SECTION, parse_str};
use libfuzzer_sys::fuzz_target;

/// Structured line input so the fuzzer reaches the key/value paths quickly.
#[derive(Debug, Arbitrary)]
enum Line {
    Comment(String),
    Header(String),
    Pair { key: String, value: String },
    Quoted { key: String, value: String },
    Raw(String),
}

fuzz_target!(|lines: Vec<Line>| {
    let mut text = String::new();
    for line in &lines {
        match line {
            Line::Comment(c) => text.push_str(&format!("# {c}")),
            Line::Header(h) => text.push_str(&format!("[{h}]")),
            Line::Pair { key, value } => text.push_str(&format!("{key}={value}")),
            Line::Quoted { key, value } => text.push_str(&format!("{key} = \"{value}\"")),
            Line::Raw(r) => text.push_str(r),
        }
        text.push('\n');
    }

    let parsed = parse_str(&text);

    // Every warning points at a real line.
    let count = text.lines().count();
    for warning in &parsed.warnings {
        assert!(warning.line >= 1 && warning.line <= count);
    }

    let _ = parsed.snapshot.get(DEFAULT_SECTION, "");
});
