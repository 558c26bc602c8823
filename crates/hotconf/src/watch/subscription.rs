//! Debounced bridge from `notify` events to a reload callback.
//!
//! A [`Subscription`] owns a `notify` watcher and a background thread that
//! drains it. Significant events arm a pending trigger which fires once the
//! file has been quiet for the debounce window, or once it has been pending
//! for [`MAX_DELAY_FACTOR`] windows if writes never stop. The callback always
//! runs on its own thread; while it is running, further events are dropped.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, bounded, select};
use notify::event::{AccessKind, AccessMode, ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info};

use super::types::{WatchCommand, WatchError};

/// Default quiet period before a burst of writes triggers the callback.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// A pending trigger fires after at most this many debounce windows, even
/// while writes keep arriving.
pub const MAX_DELAY_FACTOR: u32 = 10;

/// Callback invoked after a debounced write.
pub type ReloadCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// State shared between the owner, the loop thread and callback threads.
struct SubscriptionState {
    /// Whether the loop is alive.
    running: AtomicBool,
    /// Set while a callback invocation is executing.
    in_flight: AtomicBool,
}

impl SubscriptionState {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            in_flight: AtomicBool::new(false),
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the single callback slot. Returns `false` if it is taken.
    fn try_claim(&self) -> bool {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Releases the callback slot when the invocation ends, even on panic.
struct InFlightGuard(Arc<SubscriptionState>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.in_flight.store(false, Ordering::Release);
    }
}

/// A live watch on one configuration file.
///
/// Dropping the subscription closes it.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use hotconf::watch::Subscription;
///
/// let mut sub = Subscription::subscribe("app.conf", Duration::from_millis(50), || {
///     println!("app.conf changed");
/// })?;
///
/// // ... later
/// sub.close();
/// # Ok::<(), hotconf::WatchError>(())
/// ```
pub struct Subscription {
    path: PathBuf,
    state: Arc<SubscriptionState>,
    command_tx: Sender<WatchCommand>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Start watching `path`, calling `callback` after each debounced write.
    ///
    /// The file's parent directory is watched and events are filtered by
    /// file name, so a file replaced through a rename keeps being tracked.
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::PathError`] if the file does not exist or its
    /// directory cannot be watched, and [`WatchError::InitFailed`] if the
    /// notify backend or the loop thread cannot be started.
    pub fn subscribe<F>(
        path: impl AsRef<Path>,
        debounce: Duration,
        callback: F,
    ) -> Result<Self, WatchError>
    where
        F: Fn() + Send + Sync + 'static,
    {
        let path = path.as_ref().to_path_buf();
        let (dir, file_name) = split_target(&path)?;

        let (notify_tx, notify_rx) = bounded::<notify::Result<Event>>(100);
        let mut watcher = create_notify_watcher(notify_tx)?;
        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::path_error(&path, format!("failed to watch: {e}")))?;

        let (command_tx, command_rx) = bounded::<WatchCommand>(4);
        let state = Arc::new(SubscriptionState::new());

        let watch_loop = WatchLoop {
            path: path.clone(),
            file_name,
            debounce,
            state: Arc::clone(&state),
            callback: Arc::new(callback),
            command_rx,
            notify_rx,
            _watcher: watcher,
        };

        let thread_handle = thread::Builder::new()
            .name("hotconf-watcher".to_string())
            .spawn(move || watch_loop.run())
            .map_err(|e| {
                WatchError::init_failed(format!("failed to spawn watcher thread: {e}"), None)
            })?;

        info!(path = %path.display(), ?debounce, "watching configuration file");

        Ok(Self {
            path,
            state,
            command_tx,
            thread_handle: Some(thread_handle),
        })
    }

    /// The watched file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `false` once the loop has exited, either through
    /// [`close`](Self::close) or because the backend reported an error.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Returns `true` while a callback invocation is executing.
    #[must_use]
    pub fn is_reloading(&self) -> bool {
        self.state.is_in_flight()
    }

    /// Stop the loop and release the notify handle.
    ///
    /// Safe to call more than once, and after the loop already exited on its
    /// own. A callback that is already running is not interrupted.
    pub fn close(&mut self) {
        self.state.stop();
        let _ = self.command_tx.try_send(WatchCommand::Stop);

        if let Some(handle) = self.thread_handle.take() {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            let _ = handle.join();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("running", &self.is_running())
            .field("reloading", &self.is_reloading())
            .finish()
    }
}

/// Split a file path into the directory to watch and the name to match.
fn split_target(path: &Path) -> Result<(PathBuf, OsString), WatchError> {
    if !path.is_file() {
        return Err(WatchError::path_error(path, "file does not exist"));
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| WatchError::path_error(path, "invalid path"))?
        .to_os_string();

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    Ok((dir, file_name))
}

/// Create a notify watcher forwarding into `tx`.
fn create_notify_watcher(
    tx: Sender<notify::Result<Event>>,
) -> Result<RecommendedWatcher, WatchError> {
    notify::recommended_watcher(move |res| {
        let _ = tx.send(res);
    })
    .map_err(|e| WatchError::init_failed(format!("failed to create file watcher: {e}"), Some(e)))
}

/// Returns `true` if `event` rewrote the contents of `file_name`.
///
/// Data writes, close-after-write, creation and renames onto the file
/// count. Metadata changes, plain access and removal do not.
fn is_write_event(event: &Event, file_name: &OsString) -> bool {
    let names = |p: &PathBuf| p.file_name() == Some(file_name.as_os_str());

    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().is_some_and(names)
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Any))
        | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Any | ModifyKind::Other)
        | EventKind::Create(_)
        | EventKind::Access(AccessKind::Close(AccessMode::Write)) => {
            event.paths.iter().any(names)
        }
        _ => false,
    }
}

/// A trigger waiting for the file to go quiet.
#[derive(Debug, Clone, Copy)]
struct Pending {
    first: Instant,
    last: Instant,
}

impl Pending {
    fn new(now: Instant) -> Self {
        Self {
            first: now,
            last: now,
        }
    }

    fn is_due(&self, now: Instant, debounce: Duration) -> bool {
        let max_wait = debounce.saturating_mul(MAX_DELAY_FACTOR);
        now.saturating_duration_since(self.last) >= debounce
            || now.saturating_duration_since(self.first) >= max_wait
    }
}

/// Everything the loop thread owns.
struct WatchLoop {
    path: PathBuf,
    file_name: OsString,
    debounce: Duration,
    state: Arc<SubscriptionState>,
    callback: ReloadCallback,
    command_rx: Receiver<WatchCommand>,
    notify_rx: Receiver<notify::Result<Event>>,
    // Dropped when the loop returns, which releases the OS handle.
    _watcher: RecommendedWatcher,
}

impl WatchLoop {
    fn run(self) {
        let mut pending: Option<Pending> = None;

        while self.state.is_running() {
            select! {
                recv(self.command_rx) -> cmd => {
                    match cmd {
                        Ok(WatchCommand::Stop) | Err(_) => break,
                    }
                }

                recv(self.notify_rx) -> event_result => {
                    match event_result {
                        Ok(Ok(event)) if is_write_event(&event, &self.file_name) => {
                            if self.state.is_in_flight() {
                                debug!(path = %self.path.display(), "reload in flight, dropping event");
                            } else {
                                let now = Instant::now();
                                pending.get_or_insert_with(|| Pending::new(now)).last = now;
                            }
                        }
                        Ok(Ok(event)) => {
                            debug!(path = %self.path.display(), kind = ?event.kind, "ignoring event");
                        }
                        Ok(Err(e)) => {
                            let err = WatchError::terminated(&self.path, e);
                            error!(error = %err, "file watcher failed");
                            break;
                        }
                        Err(_) => break,
                    }
                }

                default(self.debounce) => {}
            }

            if pending.is_some_and(|p| p.is_due(Instant::now(), self.debounce)) {
                pending = None;
                self.fire();
            }
        }

        self.state.stop();
        info!(path = %self.path.display(), "stopped watching configuration file");
    }

    /// Run the callback on its own thread unless one is already running.
    fn fire(&self) {
        if !self.state.try_claim() {
            debug!(path = %self.path.display(), "reload in flight, dropping trigger");
            return;
        }

        let guard = InFlightGuard(Arc::clone(&self.state));
        let callback = Arc::clone(&self.callback);

        let spawned = thread::Builder::new()
            .name("hotconf-reload".to_string())
            .spawn(move || {
                let _guard = guard;
                callback();
            });

        // On failure the closure, and with it the guard, is dropped.
        if let Err(e) = spawned {
            error!(path = %self.path.display(), error = %e, "failed to spawn reload thread");
        }
    }
}
