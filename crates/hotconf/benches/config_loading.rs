//! Performance benchmarks for parsing and lookups.
//!
//! Run with: `cargo bench -p hotconf`

use std::fs;
use std::hint::black_box;

use hotconf::{Store, parse_str};
use tempfile::TempDir;

fn main() {
    divan::main();
}

/// Build a file with `sections` sections of `keys` keys each.
fn generate(sections: usize, keys: usize) -> String {
    let mut out = String::from("# generated\nglobal = yes\n\n");
    for s in 0..sections {
        out.push_str(&format!("[section_{s}]\n"));
        for k in 0..keys {
            if k % 3 == 0 {
                out.push_str(&format!("key_{k} = \"quoted value {k}\"\n"));
            } else {
                out.push_str(&format!("key_{k} = value_{k}\n"));
            }
        }
        out.push('\n');
    }
    out
}

// ============================================================================
// Parsing
// ============================================================================

#[divan::bench(args = [1, 10, 100])]
fn parse_sections(bencher: divan::Bencher, sections: usize) {
    let text = generate(sections, 20);
    bencher.bench(|| parse_str(black_box(&text)));
}

#[divan::bench]
fn parse_with_malformed_lines(bencher: divan::Bencher) {
    let mut text = generate(10, 20);
    for i in 0..100 {
        text.push_str(&format!("broken line {i}\n=no key\n"));
    }
    bencher.bench(|| parse_str(black_box(&text)));
}

// ============================================================================
// Lookups
// ============================================================================

fn open_store(reload: bool) -> (TempDir, Store) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("bench.conf");
    fs::write(&path, generate(10, 20)).expect("write bench file");
    let store = Store::open(&path, reload).expect("open store");
    (dir, store)
}

#[divan::bench]
fn lookup_without_reload(bencher: divan::Bencher) {
    let (_dir, store) = open_store(false);
    bencher.bench(|| store.get_value(black_box("section_5"), black_box("key_7"), "d"));
}

#[divan::bench]
fn lookup_with_reload(bencher: divan::Bencher) {
    let (_dir, store) = open_store(true);
    bencher.bench(|| store.get_value(black_box("section_5"), black_box("key_7"), "d"));
    store.close();
}

#[divan::bench]
fn lookup_miss(bencher: divan::Bencher) {
    let (_dir, store) = open_store(false);
    bencher.bench(|| store.get(black_box("absent"), "d"));
}
