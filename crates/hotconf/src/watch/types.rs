//! Error and command types for file watching.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for file watching.
///
/// All watch-related errors are reported through this type, which integrates
/// with [`miette`] for rich terminal diagnostics.
#[derive(Debug, Error, Diagnostic)]
#[non_exhaustive]
pub enum WatchError {
    /// Failed to initialize the notification backend.
    #[error("failed to initialize file watcher: {message}")]
    #[diagnostic(
        code(hotconf::watch::init_failed),
        help("the platform may have run out of watch handles; check inotify limits")
    )]
    InitFailed {
        /// Human-readable error message.
        message: String,
        /// The underlying notify error, if available.
        #[source]
        source: Option<notify::Error>,
    },

    /// Failed to watch a specific path.
    #[error("failed to watch path '{path}': {message}")]
    #[diagnostic(
        code(hotconf::watch::path_error),
        help("ensure the file exists and you have read permissions on its directory")
    )]
    PathError {
        /// The path that could not be watched.
        path: PathBuf,
        /// Human-readable error message.
        message: String,
    },

    /// The backend reported an error and the watch loop exited.
    #[error("watch on '{path}' terminated: {source}")]
    #[diagnostic(
        code(hotconf::watch::terminated),
        help("live reload is paused until the configuration is loaded again")
    )]
    Terminated {
        /// The watched path.
        path: PathBuf,
        /// The error reported by notify.
        #[source]
        source: notify::Error,
    },
}

impl WatchError {
    /// Create a new `InitFailed` error.
    pub fn init_failed(message: impl Into<String>, source: Option<notify::Error>) -> Self {
        Self::InitFailed {
            message: message.into(),
            source,
        }
    }

    /// Create a new `PathError`.
    pub fn path_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::PathError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new `Terminated` error.
    pub fn terminated(path: impl Into<PathBuf>, source: notify::Error) -> Self {
        Self::Terminated {
            path: path.into(),
            source,
        }
    }
}

/// Commands sent to the watch thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WatchCommand {
    /// Stop the loop and release the backend.
    Stop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_error_display() {
        let err = WatchError::init_failed("test error", None);
        assert!(err.to_string().contains("test error"));

        let err = WatchError::path_error("/test/path", "permission denied");
        assert!(err.to_string().contains("/test/path"));
        assert!(err.to_string().contains("permission denied"));

        let err = WatchError::terminated("/etc/app.conf", notify::Error::generic("queue overflow"));
        assert!(err.to_string().contains("/etc/app.conf"));
    }

    #[test]
    fn test_watch_error_codes() {
        let err = WatchError::path_error("x", "y");
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("hotconf::watch::path_error"));
    }
}
