//! The configuration store.
//!
//! A [`Store`] owns one [`Snapshot`] of a configuration file. With reload
//! enabled it also owns a [`Subscription`] and re-parses the file after
//! every debounced write, swapping the new snapshot in whole.
//!
//! # Loading
//!
//! Every load, whether explicit, self-healing or triggered by the watcher,
//! runs under a single load gate, so two loads never interleave. The parse
//! happens before any snapshot lock is taken; readers only ever wait for a
//! pointer swap.
//!
//! # Self-healing
//!
//! If the last load failed (the file was missing at startup, or the watch
//! could not be set up) the next lookup tries again before answering.

mod builder;
mod cell;

pub use builder::StoreBuilder;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use self::cell::SnapshotCell;
use crate::error::{Error, Result};
use crate::parse::{Parsed, parse_reader};
use crate::snapshot::{DEFAULT_SECTION, Snapshot};
use crate::watch::Subscription;

/// What started a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadTrigger {
    /// `Store::open` or `Store::load`.
    Explicit,
    /// A lookup on a store whose last load failed.
    SelfHeal,
    /// The watcher saw the file change.
    FileChanged,
}

impl LoadTrigger {
    /// Whether this load should replace the watch subscription.
    const fn resubscribes(self) -> bool {
        !matches!(self, Self::FileChanged)
    }
}

impl std::fmt::Display for LoadTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit load"),

            Self::SelfHeal => write!(f, "retry on lookup"),

            Self::FileChanged => write!(f, "file changed"),
        }
    }
}

struct Inner {
    path: PathBuf,
    reload: bool,
    debounce: Duration,
    cell: SnapshotCell,
    loaded: AtomicBool,
    closed: AtomicBool,
    epoch: AtomicU64,
    load_gate: Mutex<()>,
    subscription: Mutex<Option<Subscription>>,
}

impl Inner {
    fn load(self: &Arc<Self>, trigger: LoadTrigger) -> Result<()> {
        let _gate = self.load_gate.lock();

        let result = if self.closed.load(Ordering::Acquire) {
            Err(Error::Closed)
        } else {
            self.load_locked(trigger)
        };

        self.loaded.store(result.is_ok(), Ordering::Release);
        result
    }

    fn load_locked(self: &Arc<Self>, trigger: LoadTrigger) -> Result<()> {
        let parsed = self.read_file()?;

        for warning in &parsed.warnings {
            warn!(
                path = %self.path.display(),
                line = warning.line,
                reason = %warning.kind,
                text = %warning.text,
                "skipping malformed configuration line"
            );
        }

        // Subscribe first: a failed watch leaves the old snapshot in place.
        if self.reload && trigger.resubscribes() {
            self.resubscribe()?;
        }

        let sections = parsed.snapshot.sections().count();
        self.cell.replace(Arc::new(parsed.snapshot));
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(path = %self.path.display(), sections, epoch, %trigger, "configuration loaded");

        Ok(())
    }

    fn read_file(&self) -> Result<Parsed> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        parse_reader(BufReader::new(file)).map_err(|e| Error::io(&self.path, e))
    }

    /// Replace the current subscription with a fresh one.
    fn resubscribe(self: &Arc<Self>) -> Result<()> {
        let mut slot = self.subscription.lock();
        if let Some(mut old) = slot.take() {
            old.close();
        }

        let weak = Arc::downgrade(self);
        let subscription = Subscription::subscribe(&self.path, self.debounce, move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_file_change();
            }
        })?;

        *slot = Some(subscription);
        Ok(())
    }

    fn on_file_change(self: &Arc<Self>) {
        match self.load(LoadTrigger::FileChanged) {
            Ok(()) => {}
            Err(Error::Closed) => {
                debug!(path = %self.path.display(), "store closed, ignoring change");
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "reload failed, keeping previous configuration");
            }
        }
    }

    fn close(&self) {
        let _gate = self.load_gate.lock();
        self.closed.store(true, Ordering::Release);
        self.loaded.store(false, Ordering::Release);

        if let Some(mut subscription) = self.subscription.lock().take() {
            subscription.close();
        }
    }
}

/// An INI-style configuration file held in memory.
///
/// `Store` is cheaply cloneable; all clones share the same snapshot and
/// subscription.
///
/// # Example
///
/// ```no_run
/// use hotconf::Store;
///
/// let store = Store::open("app.conf", true)?;
///
/// let name = store.get("name", "anonymous");
/// let port = store.get_value("server", "port", "8080");
///
/// store.close();
/// # Ok::<(), hotconf::Error>(())
/// ```
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

impl Store {
    /// Open `path`, optionally keeping the store in sync with the file.
    ///
    /// Shorthand for [`StoreBuilder`] with the default debounce window.
    ///
    /// # Errors
    ///
    /// See [`StoreBuilder::open`].
    pub fn open(path: impl AsRef<Path>, reload: bool) -> Result<Self> {
        StoreBuilder::new(path).reload(reload).open()
    }

    /// Start building a store for `path`.
    #[must_use]
    pub fn builder(path: impl AsRef<Path>) -> StoreBuilder {
        StoreBuilder::new(path)
    }

    pub(crate) fn from_builder(path: PathBuf, reload: bool, debounce: Duration) -> Result<Self> {
        let store = Self {
            inner: Arc::new(Inner {
                path,
                reload,
                debounce,
                cell: SnapshotCell::new(reload),
                loaded: AtomicBool::new(false),
                closed: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                load_gate: Mutex::new(()),
                subscription: Mutex::new(None),
            }),
        };

        match store.inner.load(LoadTrigger::Explicit) {
            Ok(()) => Ok(store),
            Err(e) if e.is_not_found() => {
                debug!(path = %store.path().display(), "configuration file not found, will retry on lookup");
                Ok(store)
            }
            Err(e) => Err(e),
        }
    }

    /// Look up `key` in the `"Default"` section.
    #[must_use]
    pub fn get(&self, key: &str, default: &str) -> String {
        self.get_value(DEFAULT_SECTION, key, default)
    }

    /// Look up `key` in `section`, returning `default` if either is absent.
    ///
    /// If the last load failed, the file is loaded again first. The outcome
    /// of that attempt is only visible through [`is_loaded`](Self::is_loaded).
    #[must_use]
    pub fn get_value(&self, section: &str, key: &str, default: &str) -> String {
        if !self.is_loaded() && !self.is_closed() {
            if let Err(e) = self.inner.load(LoadTrigger::SelfHeal) {
                debug!(path = %self.path().display(), error = %e, "configuration still unavailable");
            }
        }

        self.inner
            .cell
            .read(|s| s.get(section, key).map(str::to_owned))
            .unwrap_or_else(|| default.to_owned())
    }

    /// Whether the most recent load succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(Ordering::Acquire)
    }

    /// Re-read the file and replace the snapshot.
    ///
    /// With reload enabled, the watch subscription is re-established before
    /// the new snapshot is installed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read,
    /// [`Error::Watch`] if it cannot be watched, and [`Error::Closed`] after
    /// [`close`](Self::close). The previous snapshot is kept on error; after
    /// [`Error::Watch`] the store is no longer watching.
    pub fn load(&self) -> Result<()> {
        self.inner.load(LoadTrigger::Explicit)
    }

    /// Stop reloading and mark the store as not loaded.
    ///
    /// Lookups keep answering from the last snapshot but no longer retry
    /// loading. Does nothing when reload is disabled.
    pub fn close(&self) {
        if self.inner.reload {
            self.inner.close();
        }
    }

    /// Get the current snapshot.
    ///
    /// The returned `Arc` stays valid across reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.cell.get()
    }

    /// Number of snapshots installed so far.
    ///
    /// Compare two readings to find out whether a reload happened in between.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::Acquire)
    }

    /// The configuration file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Whether the store was opened with reload enabled.
    #[must_use]
    pub fn reload_enabled(&self) -> bool {
        self.inner.reload
    }

    /// Whether a watch subscription is currently alive.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.inner
            .subscription
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_running)
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }
}

// Manual Debug impl to avoid locking or dumping the snapshot
impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("path", &self.inner.path)
            .field("reload", &self.inner.reload)
            .field("cell", &self.inner.cell)
            .field("loaded", &self.is_loaded())
            .field("epoch", &self.epoch())
            .finish_non_exhaustive()
    }
}
