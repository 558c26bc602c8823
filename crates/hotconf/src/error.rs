//! Error types for loading configuration.
//!
//! | Variant | When It Occurs |
//! |---------|----------------|
//! | [`Error::Io`] | The file exists but could not be opened or read |
//! | [`Error::Watch`] | Live reload could not be set up |
//! | [`Error::Closed`] | `load()` was called on a closed store |
//!
//! Malformed lines are not errors: they are reported as
//! [`MalformedLine`](crate::MalformedLine) warnings and skipped. Lookups
//! never fail; they fall back to the caller's default.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::watch::WatchError;

/// Errors returned when loading a configuration file.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum Error {
    /// The configuration file could not be opened or read.
    #[error("failed to read configuration file: {}", path.display())]
    #[diagnostic(
        code(hotconf::io),
        help("check file permissions and that the file is valid UTF-8")
    )]
    Io {
        /// Path to the file.
        path: PathBuf,

        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// Live reload could not be set up.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Watch(#[from] WatchError),

    /// The store was closed and no longer loads its file.
    #[error("configuration store is closed")]
    #[diagnostic(
        code(hotconf::closed),
        help("open a new store to read the file again")
    )]
    Closed,
}

impl Error {
    /// Creates an `Io` error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns `true` if this error means the file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = Error::io(
            "/etc/app.conf",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let display = err.to_string();

        assert!(display.contains("/etc/app.conf"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_detection() {
        let err = Error::io("missing.conf", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert!(!Error::Closed.is_not_found());
    }

    #[test]
    fn test_watch_error_is_transparent() {
        let err = Error::from(WatchError::path_error("/x", "gone"));
        assert!(err.to_string().contains("gone"));
        assert_eq!(
            err.code().map(|c| c.to_string()).as_deref(),
            Some("hotconf::watch::path_error")
        );
    }
}
