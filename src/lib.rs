//! # tinlog - Lightweight Leveled Logging
//!
//! tinlog writes leveled, template-formatted log lines either to a file or to
//! the console. The file logger buffers records in memory, rotates its backing
//! file by size (optionally into ZIP archives) and offers after-the-fact queries
//! over what it wrote.
//!
//! ## Key Features
//!
//! - **Runtime levels**: a flat name → priority registry, seeded with
//!   `DEBUG=1 .. CRITICAL=5`, extendable with custom levels
//! - **Templates**: `%time`, `%lvl` and `%text` placeholders, default
//!   `[%time] - %lvl | %text`
//! - **Buffered file output**: flush on buffer size, on `CRITICAL`, on an
//!   optional interval, on [`FileLogger::close`] and on drop
//! - **Rotation and archival**: size-bound rotation to timestamped files,
//!   optional ZIP compression, manual archival
//! - **Queries**: per-level stats, level filter, text search, JSON and HTML export
//! - **Console output**: unbuffered colored printing through [`ConsoleLogger`]
//! - **Failure isolation**: I/O failures are reported to an [`ErrorSink`]
//!   (by default `logger_errors.txt` plus a red console warning) and never
//!   returned to the caller
//!
//! ## Configuration Reference
//!
//! [`init`] accepts a `HashMap<String, String>` of process-wide defaults used by
//! [`FileLogger::builder`]. Only the first call has an effect.
//!
//! - `"log_file_path"`: backing file (default `"logs.txt"`)
//! - `"log_level"`: threshold level name (default `"DEBUG"`)
//! - `"buffer_size"`: records per flush (default `"1"`)
//! - `"max_pending"`: lines kept across failed writes (default `"10000"`)
//! - `"flush_interval"`: milliseconds, `"0"` disables (default `"0"`)
//! - `"format"`: line template (default `"[%time] - %lvl | %text"`)
//! - `"rotation_max_bytes"`: rotation bound, `"0"` disables (default `"0"`)
//! - `"rotation_compress"`: `"true"` or `"false"` (default `"false"`)
//! - `"error_file_path"`: failure log (default `"logger_errors.txt"`)
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use tinlog::{FileLogger, Logger};
//!
//! let logger = FileLogger::builder()
//!     .path("app.log")
//!     .level("INFO")
//!     .buffer_size(20)
//!     .rotation(Some(8 * 1024 * 1024), true)
//!     .build()?;
//!
//! logger.info("Application started")?;
//! logger.debug("Filtered out")?;
//! logger.critical("Written immediately")?;
//! logger.http(404, "Unknown page", Some("https://example.com/missing"))?;
//!
//! for line in logger.filter_logs("WARNING") {
//!     println!("{line}");
//! }
//! logger.export_json("log_export.json");
//! # Ok::<(), tinlog::Error>(())
//! ```
//!
//! ## Console Logging
//!
//! ```rust,no_run
//! use tinlog::{ConsoleLogger, Logger};
//!
//! let logger = ConsoleLogger::builder().http_color("Blue").build()?;
//! logger.warning("This is a warning")?;
//! # Ok::<(), tinlog::Error>(())
//! ```
mod buffer;
mod config;
mod console;
mod error;
mod file;
mod format;
mod level;
mod query;
mod rotation;
mod sink;

use std::collections::HashMap;

use crate::config::Config;
pub use crate::console::{Color, ConsoleLogger, ConsoleLoggerBuilder};
pub use crate::error::{Error, Result};
pub use crate::file::{FileLogger, FileLoggerBuilder};
pub use crate::format::{
    format_timestamp, parse_timestamp, Clock, FixedClock, SystemClock, Template, DEFAULT_TEMPLATE,
};
pub use crate::level::{LevelRegistry, CRITICAL, DEBUG, DEFAULT_LEVELS, ERROR, INFO, WARNING};
pub use crate::query::LogQuery;
pub use crate::rotation::RotationPolicy;
pub use crate::sink::{ErrorSink, FileErrorSink, MemoryErrorSink, DEFAULT_ERROR_FILE};

/// Sets the process-wide defaults read by [`FileLogger::builder`].
///
/// Keys are listed in the crate documentation. Values that fail to parse keep
/// their default. Calling this after the defaults were first read, explicitly
/// or by building a logger, has no effect.
pub fn init(config: HashMap<String, String>) {
    Config::from_hashmap(Some(config));
}

/// The logging interface shared by [`FileLogger`] and [`ConsoleLogger`].
///
/// Implementors only provide [`log`](Logger::log) and [`http`](Logger::http);
/// the per-level methods forward to `log` with the built-in level names.
pub trait Logger: Send + Sync {
    /// Emits `message` at `level` if the level passes the threshold.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLevel`] if `level` is not registered.
    fn log(&self, level: &str, message: &str) -> Result<()>;

    /// Emits an HTTP record (`HTTP <code>` as level token, ` - (<url>)`
    /// appended to the message). Not subject to the threshold.
    fn http(&self, code: u16, message: &str, url: Option<&str>) -> Result<()>;

    fn debug<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(DEBUG, message.as_ref())
    }

    fn info<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(INFO, message.as_ref())
    }

    fn warning<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(WARNING, message.as_ref())
    }

    fn error<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(ERROR, message.as_ref())
    }

    /// Logs at `CRITICAL`. File loggers flush these immediately.
    fn critical<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(CRITICAL, message.as_ref())
    }
}
