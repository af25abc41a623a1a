//! # Error Side Channel
//!
//! Storage failures inside the logger are never returned to the caller.
//! They are handed to an [`ErrorSink`] instead, which by default appends a
//! line to `logger_errors.txt` and prints a red warning to stderr.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::format::{Clock, SystemClock, Template};

/// File used by [`FileErrorSink::default`].
pub const DEFAULT_ERROR_FILE: &str = "logger_errors.txt";

const RED: &str = "\x1b[91m";
const RESET: &str = "\x1b[0m";

/// Receives failures of the logging subsystem itself.
///
/// `level` is one of `WARNING`, `ERROR` or `CRITICAL`.
pub trait ErrorSink: Send + Sync + fmt::Debug {
    fn report(&self, level: &str, message: &str);
}

/// Appends failures to a dedicated file and echoes them to the console.
#[derive(Debug)]
pub struct FileErrorSink {
    path: PathBuf,
    template: Template,
    clock: Arc<dyn Clock>,
}

impl Default for FileErrorSink {
    fn default() -> Self {
        FileErrorSink::new(DEFAULT_ERROR_FILE)
    }
}

impl FileErrorSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileErrorSink {
            path: path.into(),
            template: Template::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl ErrorSink for FileErrorSink {
    fn report(&self, level: &str, message: &str) {
        let line = self.template.render_now(self.clock.as_ref(), level, message);
        if let Err(err) = self.append(&line) {
            eprintln!(
                "{RED}Failed to write to {}: {err}{RESET}",
                self.path.display()
            );
        }
        eprintln!("{RED}{level}: {message}{RESET}");
    }
}

/// Collects reports in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryErrorSink {
    entries: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `(level, message)` pair reported so far.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .map(|(_, message)| message.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ErrorSink for MemoryErrorSink {
    fn report(&self, level: &str, message: &str) {
        self.entries
            .lock()
            .push((level.to_string(), message.to_string()));
    }
}
