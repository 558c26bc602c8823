//! File watching for live reload.
//!
//! This module bridges `notify` filesystem events into a debounced callback.
//! [`Store`](crate::Store) uses it to re-parse its file after every write,
//! but a [`Subscription`] can also be used on its own.
//!
//! # Behaviour
//!
//! - **Write events only** - data writes, close-after-write, creation and
//!   renames onto the file trigger; metadata changes do not
//! - **Debouncing** - a burst of writes fires once, after the file has been
//!   quiet for the debounce window (or after `MAX_DELAY_FACTOR` windows if
//!   writes never pause)
//! - **At most one callback in flight** - events arriving while the callback
//!   runs are dropped, not queued
//! - **Fail stop** - a backend error ends the subscription; nothing is retried
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌───────────────┐     ┌─────────────────┐
//! │   notify    │────▶│   WatchLoop   │────▶│ reload thread   │
//! │  (events)   │     │  (debounce)   │     │ (callback, ≤1)  │
//! └─────────────┘     └───────────────┘     └─────────────────┘
//!                            ▲
//!                            │ Stop
//!                     ┌─────────────┐
//!                     │Subscription │
//!                     │ (user API)  │
//!                     └─────────────┘
//! ```

mod subscription;
mod types;

pub use subscription::{DEFAULT_DEBOUNCE, MAX_DELAY_FACTOR, ReloadCallback, Subscription};
pub use types::WatchError;
