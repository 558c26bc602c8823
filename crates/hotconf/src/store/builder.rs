//! Builder for configuring a [`Store`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::Store;
use crate::error::Result;
use crate::watch::DEFAULT_DEBOUNCE;

/// Builder for opening a [`Store`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use hotconf::StoreBuilder;
///
/// let store = StoreBuilder::new("app.conf")
///     .reload(true)
///     .debounce(Duration::from_millis(250))
///     .open()?;
///
/// let port = store.get_value("server", "port", "8080");
/// # Ok::<(), hotconf::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct StoreBuilder {
    /// File to read.
    path: PathBuf,

    /// Reload on file change (default: off).
    reload: bool,

    /// Quiet period before a reload (default: 100ms).
    debounce: Duration,
}

impl StoreBuilder {
    /// Create a builder for `path` with reload disabled.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            reload: false,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Keep the store in sync with the file.
    #[must_use]
    pub const fn reload(mut self, enabled: bool) -> Self {
        self.reload = enabled;
        self
    }

    /// Set how long the file must be quiet before a reload fires.
    ///
    /// Editors often write a file in several steps; the debounce window
    /// folds them into one reload. If writes never pause, a reload still
    /// fires after [`MAX_DELAY_FACTOR`](crate::watch::MAX_DELAY_FACTOR)
    /// windows.
    #[must_use]
    pub const fn debounce(mut self, duration: Duration) -> Self {
        self.debounce = duration;
        self
    }

    /// Open the store and perform the initial load.
    ///
    /// A missing file is not an error: the store opens empty and retries on
    /// the next lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::Error::Io) if the file exists but cannot
    /// be read, and [`Error::Watch`](crate::Error::Watch) if reload is enabled
    /// and the file cannot be watched.
    pub fn open(self) -> Result<Store> {
        Store::from_builder(self.path, self.reload, self.debounce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = StoreBuilder::new("app.conf");
        assert_eq!(builder.path, PathBuf::from("app.conf"));
        assert!(!builder.reload);
        assert_eq!(builder.debounce, Duration::from_millis(100));
    }

    #[test]
    fn test_builder_fluent_api() {
        let builder = StoreBuilder::new("app.conf")
            .reload(true)
            .debounce(Duration::from_millis(20));

        assert!(builder.reload);
        assert_eq!(builder.debounce, Duration::from_millis(20));
    }
}
