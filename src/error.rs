//! # Error Handling

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents all possible errors that can occur in the tinlog system.
///
/// Only programming errors (unknown levels, bad colors, malformed configuration)
/// and on-disk corruption are ever returned to the caller. Storage failures are
/// represented by [`Error::BackingFileUnavailable`] but are routed through the
/// [`ErrorSink`](crate::ErrorSink) instead of being propagated.
#[derive(Debug, Error)]
pub enum Error {
    /// The level name is not present in the registry.
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    /// A color name that is not part of the console palette.
    #[error("Unknown color: {0}")]
    UnknownColor(String),

    /// A console level has no color assigned to it.
    #[error("No color configured for level: {0}")]
    MissingColor(String),

    /// Opening, writing, renaming or compressing the backing file failed.
    #[error("Log file unavailable: {}: {source}", .path.display())]
    BackingFileUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A persisted line does not start with a timestamp this crate can parse.
    ///
    /// Only age-based pruning reads timestamps back, so this usually means the
    /// file was written with a different template or has been corrupted.
    #[error("Unsupported timestamp format in line: {0}")]
    UnsupportedTimestampFormat(String),

    /// The logger has been closed and no longer accepts records.
    #[error("Logger is closed")]
    Closed,

    /// A construction-time setting is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Represents an underlying I/O error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Wraps an I/O failure on `path` as a storage error.
    pub fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::BackingFileUnavailable {
            path: path.into(),
            source,
        }
    }
}
