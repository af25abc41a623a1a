//! # Log Queries
//!
//! Read-side operations over persisted log files. Every call re-reads the
//! file from disk; nothing is cached. A missing or unreadable file is reported
//! through the [`ErrorSink`] and produces an empty result instead of an error.
//!
//! None of these operations coordinate with rotation: querying a file while
//! it is being renamed may observe either the old or the new file.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Error;
use crate::level::{LevelRegistry, ERROR};
use crate::sink::{ErrorSink, FileErrorSink};

pub const HTML_HEADER: &str = "<html><head><title>Logs</title></head><body><pre>\n";
pub const HTML_FOOTER: &str = "</pre></body></html>";

const JSON_INDENT: &[u8] = b"    ";

/// Stateless query operations bound to a level registry and an error sink.
#[derive(Debug, Clone)]
pub struct LogQuery {
    levels: LevelRegistry,
    sink: Arc<dyn ErrorSink>,
}

impl Default for LogQuery {
    fn default() -> Self {
        LogQuery::new(Arc::new(FileErrorSink::default()))
    }
}

impl LogQuery {
    pub fn new(sink: Arc<dyn ErrorSink>) -> Self {
        LogQuery {
            levels: LevelRegistry::default(),
            sink,
        }
    }

    /// Counts against the levels of `levels` instead of the built-in set.
    pub fn with_levels(mut self, levels: LevelRegistry) -> Self {
        self.levels = levels;
        self
    }

    /// Counts records per level across `files`.
    ///
    /// This is a substring heuristic, not a parse of the line template: a line
    /// counts towards every registered level whose name occurs anywhere in it,
    /// ignoring case. A message that mentions "error" is therefore also
    /// counted as an `ERROR` record. Every registered level is present in the
    /// result, with zero when it never occurs.
    pub fn log_stats<P: AsRef<Path>>(&self, files: &[P]) -> HashMap<String, usize> {
        let names = self.levels.names();
        let needles: Vec<String> = names.iter().map(|name| name.to_lowercase()).collect();
        let mut counts: HashMap<String, usize> =
            names.iter().map(|name| (name.clone(), 0)).collect();

        for file in files {
            let Some(lines) = self.read_lines(file.as_ref()) else {
                continue;
            };
            for line in lines {
                let line = line.to_lowercase();
                for (name, needle) in names.iter().zip(&needles) {
                    if line.contains(needle.as_str()) {
                        *counts.entry(name.clone()).or_insert(0) += 1;
                    }
                }
            }
        }
        counts
    }

    /// Lines containing the uppercased `level` token, case-sensitively.
    ///
    /// This is a literal token search: `level` is never interpreted as a
    /// pattern.
    pub fn filter_logs(&self, path: &Path, level: &str) -> Vec<String> {
        let token = level.to_uppercase();
        self.read_lines(path)
            .unwrap_or_default()
            .into_iter()
            .filter(|line| line.contains(&token))
            .collect()
    }

    /// Lines containing `text`, ignoring case.
    pub fn search_logs(&self, path: &Path, text: &str) -> Vec<String> {
        let needle = text.to_lowercase();
        self.read_lines(path)
            .unwrap_or_default()
            .into_iter()
            .filter(|line| line.to_lowercase().contains(&needle))
            .collect()
    }

    /// Writes every line of `path` to `out` as a JSON array of strings
    /// indented by four spaces. Returns `false` if nothing was exported.
    pub fn export_json(&self, path: &Path, out: &Path) -> bool {
        let Some(lines) = self.read_lines(path) else {
            return false;
        };
        let written = File::create(out).and_then(|file| {
            let mut writer = BufWriter::new(file);
            let mut serializer =
                Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(JSON_INDENT));
            lines.serialize(&mut serializer).map_err(io::Error::from)?;
            writer.flush()
        });
        self.check_written(out, written)
    }

    /// Writes every line of `path` inside a minimal `<pre>` HTML document.
    pub fn export_html(&self, path: &Path, out: &Path) -> bool {
        let Some(lines) = self.read_lines(path) else {
            return false;
        };
        let written = File::create(out).and_then(|file| {
            let mut writer = BufWriter::new(file);
            writer.write_all(HTML_HEADER.as_bytes())?;
            for line in &lines {
                writeln!(writer, "{line}")?;
            }
            writer.write_all(HTML_FOOTER.as_bytes())?;
            writer.flush()
        });
        self.check_written(out, written)
    }

    /// Every line of `path` without its terminator, or `None` after reporting
    /// why the file could not be read.
    ///
    /// Invalid UTF-8 is replaced with `U+FFFD` line by line, so a corrupt
    /// record does not hide the rest of the file.
    pub fn read_lines(&self, path: &Path) -> Option<Vec<String>> {
        let read: io::Result<Vec<String>> = File::open(path).and_then(|file| {
            BufReader::new(file)
                .split(b'\n')
                .map(|line| {
                    let mut bytes = line?;
                    if bytes.last() == Some(&b'\r') {
                        bytes.pop();
                    }
                    Ok(String::from_utf8_lossy(&bytes).into_owned())
                })
                .collect()
        });
        match read {
            Ok(lines) => Some(lines),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                self.sink.report(
                    ERROR,
                    &format!("The log file is missing: {}", path.display()),
                );
                None
            }
            Err(err) => {
                self.sink
                    .report(ERROR, &Error::unavailable(path, err).to_string());
                None
            }
        }
    }

    fn check_written(&self, out: &Path, written: io::Result<()>) -> bool {
        match written {
            Ok(()) => true,
            Err(err) => {
                self.sink
                    .report(ERROR, &Error::unavailable(out, err).to_string());
                false
            }
        }
    }
}
