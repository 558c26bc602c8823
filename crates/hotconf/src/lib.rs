//! # hotconf
//!
//! An in-process store for INI-style configuration files, with optional
//! live reload when the file changes on disk.
//!
//! ## File Format
//!
//! ```text
//! # comments start with '#' and take a whole line
//! # keys before any header land in the "Default" section
//! name = demo
//!
//! [server]
//! # surrounding quotes are stripped
//! host = "0.0.0.0"
//! port = 8080
//! ```
//!
//! Section and key names are case-sensitive. Lines that cannot be read as
//! `key = value` are skipped with a warning; they never fail a load.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hotconf::Store;
//!
//! fn main() -> Result<(), hotconf::Error> {
//!     // Reload enabled: the store follows every write to app.conf.
//!     let store = Store::open("app.conf", true)?;
//!
//!     let name = store.get("name", "anonymous");
//!     let port = store.get_value("server", "port", "8080");
//!     println!("{name} listening on {port}");
//!
//!     store.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Behaviour
//!
//! - **Lookups never fail** - absent sections or keys yield the caller's default
//! - **Missing files are not fatal** - the store opens empty and retries on
//!   the next lookup until the file appears
//! - **Whole-snapshot reloads** - a reload parses into a fresh [`Snapshot`]
//!   and swaps it in; readers see the old or the new file, never a mix
//! - **Debounced watching** - bursts of writes collapse into one reload, and
//!   at most one reload runs at a time
//! - **No locking without reload** - a store opened without reload reads its
//!   snapshot lock-free
//!
//! ## Logging
//!
//! The crate reports through [`tracing`]: malformed lines at `warn`, loads
//! and dropped events at `debug`, watcher start/stop at `info` and backend
//! failures at `error`. Install a subscriber to see them.
//!
//! ## Error Handling
//!
//! Errors implement [`miette::Diagnostic`]:
//!
//! ```rust,ignore
//! match Store::open("app.conf", true) {
//!     Ok(store) => { /* use store */ }
//!     Err(e) => eprintln!("{:?}", miette::Report::from(e)),
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
pub use error::{Error, Result};

pub mod parse;
pub use parse::{MalformedKind, MalformedLine, Parsed, parse_reader, parse_str};

mod snapshot;
pub use snapshot::{DEFAULT_SECTION, Section, Snapshot};

mod store;
pub use store::{Store, StoreBuilder};

pub mod watch;
pub use watch::{Subscription, WatchError};

/// Re-export miette so callers can render diagnostics without adding it.
pub use miette;
