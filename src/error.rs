//! Error types returned while building matchers and walking directories.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::ParseError;

/// Top-level error type of the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Contradictory options or a malformed pattern. Raised before any filesystem access.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A directory listing failed part way through a walk.
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot exclude both directories and files")]
    ExcludeBoth,

    #[error("invalid glob {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: ParseError,
    },

    #[error("cannot resolve working directory {path:?}: {source}")]
    Cwd {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One or more filesystem failures encountered below a specific directory.
///
/// Only [`TraversalError::wrap`] creates these, so wrapping an error which already is a
/// `TraversalError` hands back the original one instead of nesting it.
#[derive(Debug)]
pub struct TraversalError {
    root: String,
    message: String,
    errors: Vec<io::Error>,
}

impl TraversalError {
    /// Wrap a filesystem error which happened while walking `root`.
    ///
    /// An `io::Error` carrying a `TraversalError` (see the `From` conversion below) is unwrapped
    /// and returned unchanged.
    pub fn wrap(error: io::Error, root: &str) -> Self {
        match error.downcast::<TraversalError>() {
            Ok(inner) => inner,
            Err(error) => Self {
                root: root.to_string(),
                message: format!("{error} for path {root:?}"),
                errors: vec![error],
            },
        }
    }

    /// The directory whose listing failed.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The underlying causes.
    pub fn errors(&self) -> &[io::Error] {
        &self.errors
    }

    /// The kind of the first cause.
    pub fn kind(&self) -> io::ErrorKind {
        self.errors
            .first()
            .map(io::Error::kind)
            .unwrap_or(io::ErrorKind::Other)
    }

    /// Whether the failure was the host refusing to resolve a symlink loop.
    pub fn is_symlink_loop(&self) -> bool {
        #[cfg(unix)]
        {
            self.errors
                .iter()
                .any(|err| err.raw_os_error() == Some(libc::ELOOP))
        }
        #[cfg(not(unix))]
        {
            false
        }
    }
}

impl fmt::Display for TraversalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for TraversalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.errors
            .first()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl From<TraversalError> for io::Error {
    fn from(error: TraversalError) -> Self {
        io::Error::other(error)
    }
}

#[test]
fn wrap_is_idempotent() {
    let inner = TraversalError::wrap(
        io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        "/root/sub",
    );
    assert_eq!(inner.root(), "/root/sub");
    assert_eq!(inner.to_string(), "denied for path \"/root/sub\"");

    let outer = TraversalError::wrap(io::Error::from(inner), "/root");
    assert_eq!(outer.root(), "/root/sub");
    assert_eq!(outer.errors().len(), 1);
    assert_eq!(outer.kind(), io::ErrorKind::PermissionDenied);
}

#[cfg(unix)]
#[test]
fn detects_symlink_loops() {
    let err = TraversalError::wrap(io::Error::from_raw_os_error(libc::ELOOP), "/a");
    assert!(err.is_symlink_loop());

    let err = TraversalError::wrap(io::Error::from(io::ErrorKind::NotFound), "/a");
    assert!(!err.is_symlink_loop());
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}
