#![no_main]

use hotconf::{parse_reader, parse_str};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Raw bytes: the reader must return an error on bad UTF-8, never panic.
    let from_reader = parse_reader(data);

    if let Ok(text) = std::str::from_utf8(data) {
        let parsed = parse_str(text);
        let from_reader = from_reader.expect("valid UTF-8 must parse");
        assert_eq!(parsed.snapshot, from_reader.snapshot);

        // Nothing stored under an empty key.
        for section in parsed.snapshot.sections() {
            assert!(parsed.snapshot.keys(section).all(|k| !k.is_empty()));
        }
    }
});
