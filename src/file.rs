//! # Buffered File Logger
//!
//! [`FileLogger`] renders records through its [`Template`], keeps them in a
//! [`LogBuffer`] and appends them to the backing file in a single write when
//! one of the flush triggers fires:
//!
//! - the buffer reached its configured size,
//! - the record is `CRITICAL`,
//! - the configured flush interval elapsed since the previous flush,
//! - [`FileLogger::flush`], [`FileLogger::close`] or `Drop`.
//!
//! Before every append the rotation policy is checked against the size of the
//! file as it is *before* the new content is written.
//!
//! Storage failures never reach the caller. They are reported to the
//! configured [`ErrorSink`] and the buffered lines are kept for the next
//! flush attempt.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use parking_lot::Mutex;

use crate::buffer::LogBuffer;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::format::{parse_timestamp, Clock, SystemClock, Template};
use crate::level::{LevelRegistry, CRITICAL, ERROR, WARNING};
use crate::query::LogQuery;
use crate::rotation::{self, RotationPolicy};
use crate::sink::{ErrorSink, FileErrorSink};
use crate::Logger;

/// Builder for [`FileLogger`], seeded from the process-wide [`Config`].
#[derive(Debug)]
pub struct FileLoggerBuilder {
    path: PathBuf,
    level: String,
    buffer_size: usize,
    max_pending: usize,
    template: Template,
    rotation: RotationPolicy,
    flush_interval: Option<Duration>,
    levels: LevelRegistry,
    error_file: PathBuf,
    sink: Option<Arc<dyn ErrorSink>>,
    clock: Arc<dyn Clock>,
}

impl Default for FileLoggerBuilder {
    fn default() -> Self {
        let defaults = Config::from_hashmap(None);
        FileLoggerBuilder {
            path: PathBuf::from(defaults.log_file_path.clone()),
            level: defaults.log_level.clone(),
            buffer_size: defaults.buffer_size,
            max_pending: defaults.max_pending,
            template: Template::new(defaults.format.clone()),
            rotation: RotationPolicy::new(
                Some(defaults.rotation_max_bytes).filter(|max| *max > 0),
                defaults.rotation_compress,
            ),
            flush_interval: Some(defaults.flush_interval)
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
            levels: LevelRegistry::default(),
            error_file: PathBuf::from(defaults.error_file_path.clone()),
            sink: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl FileLoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Threshold level name. Must exist in the registry when [`build`](Self::build) runs.
    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Number of records to accumulate before a flush.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Upper bound on lines kept while the backing file cannot be written.
    /// Values below the buffer size are raised to it.
    pub fn max_pending(mut self, lines: usize) -> Self {
        self.max_pending = lines;
        self
    }

    pub fn format(mut self, template: impl Into<String>) -> Self {
        self.template = Template::new(template);
        self
    }

    pub fn rotation(mut self, max_size_bytes: Option<u64>, compress: bool) -> Self {
        self.rotation = RotationPolicy::new(max_size_bytes, compress);
        self
    }

    pub fn flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = Some(interval);
        self
    }

    /// Registers an extra level before the threshold is resolved.
    pub fn new_level(mut self, name: &str, priority: u32) -> Self {
        self.levels.new_level(name, priority);
        self
    }

    pub fn levels(mut self, levels: LevelRegistry) -> Self {
        self.levels = levels;
        self
    }

    /// File used by the default error sink.
    pub fn error_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.error_file = path.into();
        self
    }

    pub fn error_sink(mut self, sink: Arc<dyn ErrorSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Resolves the threshold and touches the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLevel`] for an unregistered threshold and
    /// [`Error::InvalidConfig`] for a zero buffer size. A backing file that
    /// cannot be opened is only reported to the error sink.
    pub fn build(self) -> Result<FileLogger> {
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig(
                "buffer size must be at least 1".to_string(),
            ));
        }
        let threshold = self.levels.priority(&self.level)?;
        let sink = self.sink.unwrap_or_else(|| {
            Arc::new(FileErrorSink::new(self.error_file).with_clock(self.clock.clone()))
        });

        if let Err(err) = OpenOptions::new().create(true).append(true).open(&self.path) {
            sink.report(ERROR, &Error::unavailable(&self.path, err).to_string());
        }

        tracing::debug!(
            file = %self.path.display(),
            level = %self.level,
            buffer_size = self.buffer_size,
            "File logger opened"
        );

        Ok(FileLogger {
            path: self.path,
            state: Mutex::new(State {
                levels: self.levels,
                threshold,
                template: self.template,
                buffer: LogBuffer::new(self.buffer_size, self.max_pending),
                rotation: self.rotation,
                flush_interval: self.flush_interval,
                last_flush: Instant::now(),
                closed: false,
            }),
            sink,
            clock: self.clock,
        })
    }
}

#[derive(Debug)]
struct State {
    levels: LevelRegistry,
    threshold: u32,
    template: Template,
    buffer: LogBuffer,
    rotation: RotationPolicy,
    flush_interval: Option<Duration>,
    last_flush: Instant,
    closed: bool,
}

impl State {
    fn interval_elapsed(&self) -> bool {
        matches!(self.flush_interval, Some(interval) if self.last_flush.elapsed() >= interval)
    }

    /// Rotates if needed, then appends the whole buffer in one write.
    ///
    /// The buffer is cleared only after the write succeeded. Returns `true`
    /// when nothing is left pending.
    fn commit(&mut self, path: &Path, sink: &dyn ErrorSink, clock: &dyn Clock) -> bool {
        if self.buffer.is_empty() {
            return true;
        }

        if let Err(err) = rotation::rotate_if_needed(path, &self.rotation, &clock.now()) {
            sink.report(ERROR, &Error::unavailable(path, err).to_string());
        }

        match append(path, &self.buffer.contents()) {
            Ok(()) => {
                tracing::debug!(
                    file = %path.display(),
                    lines = self.buffer.len(),
                    "Log buffer flushed"
                );
                self.buffer.clear();
                self.last_flush = Instant::now();
                true
            }
            Err(err) => {
                sink.report(ERROR, &Error::unavailable(path, err).to_string());
                false
            }
        }
    }
}

fn append(path: &Path, contents: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

/// `[2024-01-01 00:00:00.00000] - INFO | ...` -> the bracketed instant.
fn leading_timestamp(line: &str) -> Option<NaiveDateTime> {
    let (stamp, _) = line.strip_prefix('[')?.split_once(']')?;
    parse_timestamp(stamp)
}

/// A leveled logger that buffers rendered lines and appends them to a file.
///
/// All operations lock the logger's internal state, so a `FileLogger` can be
/// shared between threads. The backing file is assumed to be owned by this
/// instance alone.
///
/// Pending records are flushed when the logger is dropped.
///
/// Records that could not be written stay pending and are retried on the
/// next flush. At most `max_pending` lines are kept (10 000 unless configured);
/// beyond that the oldest are discarded and a `WARNING` with the number of
/// dropped lines goes to the error sink.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    state: Mutex<State>,
    sink: Arc<dyn ErrorSink>,
    clock: Arc<dyn Clock>,
}

impl FileLogger {
    pub fn builder() -> FileLoggerBuilder {
        FileLoggerBuilder::default()
    }

    /// A logger for `path` with every other setting taken from the defaults.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().path(path).build()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records waiting to be written.
    pub fn pending(&self) -> usize {
        self.state.lock().buffer.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Threshold priority below which records are discarded.
    pub fn threshold(&self) -> u32 {
        self.state.lock().threshold
    }

    /// Moves the threshold to the priority of `level`.
    pub fn set_level(&self, level: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.threshold = state.levels.priority(level)?;
        Ok(())
    }

    /// Replaces the line template for records logged from now on.
    pub fn set_format(&self, template: impl Into<String>) {
        self.state.lock().template = Template::new(template);
    }

    pub fn new_level(&self, name: &str, priority: u32) {
        self.state.lock().levels.new_level(name, priority);
    }

    pub fn del_level(&self, name: &str) -> Result<u32> {
        self.state.lock().levels.del_level(name)
    }

    /// A snapshot of the registered levels.
    pub fn levels(&self) -> LevelRegistry {
        self.state.lock().levels.clone()
    }

    /// Writes every buffered record now and returns whether the buffer is empty.
    ///
    /// On failure the records stay buffered and the failure is reported to
    /// the error sink.
    pub fn flush(&self) -> bool {
        let mut state = self.state.lock();
        state.commit(&self.path, self.sink.as_ref(), self.clock.as_ref())
    }

    /// Flushes and stops accepting records.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.commit(&self.path, self.sink.as_ref(), self.clock.as_ref());
        state.closed = true;
    }

    /// Stores a new rotation policy. Rotation itself happens on the next flush.
    pub fn configure_rotation(&self, max_size_bytes: Option<u64>, compress: bool) {
        self.state.lock().rotation = RotationPolicy::new(max_size_bytes, compress);
    }

    pub fn rotation(&self) -> RotationPolicy {
        self.state.lock().rotation
    }

    /// Rotates the backing file right away if it exceeds the policy bound.
    ///
    /// Returns the rotated file (or its archive) when a rotation took place.
    pub fn rotate_if_needed(&self) -> Option<PathBuf> {
        let state = self.state.lock();
        match rotation::rotate_if_needed(&self.path, &state.rotation, &self.clock.now()) {
            Ok(rotated) => rotated,
            Err(err) => {
                self.report(ERROR, Error::unavailable(&self.path, err));
                None
            }
        }
    }

    /// Flushes pending records, then compresses the backing file into
    /// `archive_name` and deletes it. Returns `false` if archiving failed.
    pub fn archive_logs(&self, archive_name: impl AsRef<Path>) -> bool {
        let mut state = self.state.lock();
        state.commit(&self.path, self.sink.as_ref(), self.clock.as_ref());
        match rotation::archive(&self.path, archive_name.as_ref()) {
            Ok(()) => true,
            Err(err) => {
                self.report(ERROR, Error::unavailable(&self.path, err));
                false
            }
        }
    }

    /// Whether the backing file is larger than `max_bytes`. Buffered records
    /// are not counted.
    pub fn monitor_log_size(&self, max_bytes: u64) -> bool {
        match rotation::file_size(&self.path) {
            Ok(size) => size > max_bytes,
            Err(err) => {
                self.report(WARNING, Error::unavailable(&self.path, err));
                false
            }
        }
    }

    /// Drops every line older than `max_age` from the backing file.
    ///
    /// Pending records are flushed first. Lines must start with a bracketed
    /// timestamp as written by the default template. Returns the number of
    /// removed lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedTimestampFormat`] for a line whose leading
    /// timestamp cannot be parsed; the file is left untouched in that case.
    pub fn delete_old_logs(&self, max_age: chrono::Duration) -> Result<usize> {
        let mut state = self.state.lock();
        if max_age <= chrono::Duration::zero() {
            self.sink
                .report(WARNING, "The maximum log age must be greater than zero");
            return Ok(0);
        }
        state.commit(&self.path, self.sink.as_ref(), self.clock.as_ref());

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                self.report(ERROR, Error::unavailable(&self.path, err));
                return Ok(0);
            }
        };

        let Some(cutoff) = self.clock.now().checked_sub_signed(max_age) else {
            return Ok(0);
        };
        let mut kept = String::with_capacity(contents.len());
        let mut removed = 0;
        for line in contents.lines() {
            if line.is_empty() {
                kept.push('\n');
                continue;
            }
            let stamp = leading_timestamp(line)
                .ok_or_else(|| Error::UnsupportedTimestampFormat(line.to_string()))?;
            if stamp > cutoff {
                kept.push_str(line);
                kept.push('\n');
            } else {
                removed += 1;
            }
        }

        if removed > 0 {
            if let Err(err) = fs::write(&self.path, kept) {
                self.report(ERROR, Error::unavailable(&self.path, err));
                return Ok(0);
            }
            tracing::info!(file = %self.path.display(), removed, "Old log lines deleted");
        }
        Ok(removed)
    }

    /// Query operations over this logger's file, sharing its levels and error sink.
    pub fn query(&self) -> LogQuery {
        LogQuery::new(self.sink.clone()).with_levels(self.levels())
    }

    pub fn log_stats(&self) -> std::collections::HashMap<String, usize> {
        self.query().log_stats(&[&self.path])
    }

    pub fn filter_logs(&self, level: &str) -> Vec<String> {
        self.query().filter_logs(&self.path, level)
    }

    pub fn search_logs(&self, text: &str) -> Vec<String> {
        self.query().search_logs(&self.path, text)
    }

    pub fn export_json(&self, out: impl AsRef<Path>) -> bool {
        self.query().export_json(&self.path, out.as_ref())
    }

    pub fn export_html(&self, out: impl AsRef<Path>) -> bool {
        self.query().export_html(&self.path, out.as_ref())
    }

    fn report(&self, level: &str, err: Error) {
        self.sink.report(level, &err.to_string());
    }

    fn push(&self, state: &mut State, level: &str, message: &str, force: bool) {
        let line = state
            .template
            .render_now(self.clock.as_ref(), level, message);
        let full = state.buffer.push(line);
        let dropped = state.buffer.trim();
        if dropped > 0 {
            self.sink.report(
                WARNING,
                &format!(
                    "Dropped {dropped} unwritten log lines for {}",
                    self.path.display()
                ),
            );
        }
        if force || full || state.interval_elapsed() {
            state.commit(&self.path, self.sink.as_ref(), self.clock.as_ref());
        }
    }
}

impl Logger for FileLogger {
    /// Buffers `message` if `level` passes the threshold.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLevel`] if `level` is not registered and
    /// [`Error::Closed`] after [`FileLogger::close`].
    fn log(&self, level: &str, message: &str) -> Result<()> {
        let level = level.to_uppercase();
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }
        if state.levels.priority(&level)? < state.threshold {
            return Ok(());
        }
        self.push(&mut state, &level, message, level == CRITICAL);
        Ok(())
    }

    /// Records an HTTP exchange regardless of the threshold.
    fn http(&self, code: u16, message: &str, url: Option<&str>) -> Result<()> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(Error::Closed);
        }
        let text = match url {
            Some(url) => format!("{message} - ({url})"),
            None => message.to_string(),
        };
        self.push(&mut state, &format!("HTTP {code}"), &text, false);
        Ok(())
    }
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if !state.closed {
            state.commit(&self.path, self.sink.as_ref(), self.clock.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FixedClock;
    use crate::level::{DEBUG, INFO};
    use crate::sink::MemoryErrorSink;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn instant() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn builder(dir: &TempDir, sink: &MemoryErrorSink) -> FileLoggerBuilder {
        FileLogger::builder()
            .path(dir.path().join("logs.txt"))
            .level(INFO)
            .buffer_size(1)
            .format("[%time] - %lvl | %text")
            .rotation(None, false)
            .error_sink(Arc::new(sink.clone()))
            .clock(Arc::new(FixedClock(instant())))
    }

    fn read(logger: &FileLogger) -> String {
        fs::read_to_string(logger.path()).unwrap_or_default()
    }

    #[test]
    fn test_build_creates_backing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();

        assert!(logger.path().exists());
        assert_eq!(logger.threshold(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_build_rejects_unknown_level() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let result = builder(&dir, &sink).level("TRACE").build();
        assert!(matches!(result, Err(Error::UnknownLevel(_))));
    }

    #[test]
    fn test_build_rejects_zero_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let result = builder(&dir, &sink).buffer_size(0).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_build_with_unwritable_path_reports() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink)
            .path(dir.path().join("missing").join("logs.txt"))
            .build()
            .unwrap();

        assert_eq!(sink.entries().len(), 1);
        assert_eq!(sink.entries()[0].0, ERROR);
        drop(logger);
    }

    #[test]
    fn test_info_is_written_with_default_template() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();

        logger.info("start").unwrap();

        assert_eq!(read(&logger), "[2024-02-03 10:00:00.00000] - INFO | start\n");
    }

    #[test]
    fn test_below_threshold_is_not_buffered() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).buffer_size(10).build().unwrap();

        logger.debug("x").unwrap();

        assert_eq!(logger.pending(), 0);
        logger.flush();
        assert_eq!(read(&logger), "");
    }

    #[test]
    fn test_unknown_level_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();

        assert!(matches!(
            logger.log("TRACE", "x"),
            Err(Error::UnknownLevel(_))
        ));
    }

    #[test]
    fn test_buffer_flushes_on_nth_record() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).buffer_size(3).build().unwrap();

        logger.info("one").unwrap();
        logger.info("two").unwrap();
        assert_eq!(read(&logger), "");
        assert_eq!(logger.pending(), 2);

        logger.info("three").unwrap();
        assert_eq!(logger.pending(), 0);
        assert_eq!(read(&logger).lines().count(), 3);
    }

    #[test]
    fn test_critical_flushes_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).buffer_size(100).build().unwrap();

        logger.info("queued").unwrap();
        logger.critical("boom").unwrap();

        assert_eq!(logger.pending(), 0);
        let contents = read(&logger);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("INFO | queued"));
        assert!(lines[1].ends_with("CRITICAL | boom"));
    }

    #[test]
    fn test_flush_interval_forces_flush() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink)
            .buffer_size(100)
            .flush_interval(Duration::ZERO)
            .build()
            .unwrap();

        logger.info("timed").unwrap();
        assert_eq!(logger.pending(), 0);
        assert!(read(&logger).contains("timed"));
    }

    #[test]
    fn test_http_bypasses_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).level(CRITICAL).build().unwrap();

        logger.http(404, "Unknown page", Some("https://example.com/b")).unwrap();
        logger.http(200, "OK", None).unwrap();

        let contents = read(&logger);
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines[0],
            "[2024-02-03 10:00:00.00000] - HTTP 404 | Unknown page - (https://example.com/b)"
        );
        assert_eq!(lines[1], "[2024-02-03 10:00:00.00000] - HTTP 200 | OK");
    }

    #[test]
    fn test_write_failure_retains_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let missing_dir = dir.path().join("later");
        let logger = builder(&dir, &sink)
            .path(missing_dir.join("logs.txt"))
            .buffer_size(2)
            .build()
            .unwrap();

        logger.info("first").unwrap();
        logger.info("second").unwrap();
        assert_eq!(logger.pending(), 2);
        assert!(sink.entries().len() >= 2);

        fs::create_dir(&missing_dir).unwrap();
        assert!(logger.flush());

        assert_eq!(logger.pending(), 0);
        let contents = read(&logger);
        assert!(contents.contains("first"));
        assert!(contents.contains("second"));
    }

    #[test]
    fn test_pending_lines_are_capped_during_outage() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let missing_dir = dir.path().join("later");
        let logger = builder(&dir, &sink)
            .path(missing_dir.join("logs.txt"))
            .max_pending(3)
            .build()
            .unwrap();

        for i in 0..5 {
            logger.info(format!("record {i}")).unwrap();
        }

        assert_eq!(logger.pending(), 3);
        let warnings: Vec<String> = sink
            .entries()
            .into_iter()
            .filter(|(level, _)| level == WARNING)
            .map(|(_, message)| message)
            .collect();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].starts_with("Dropped 1 unwritten log lines"));

        fs::create_dir(&missing_dir).unwrap();
        assert!(logger.flush());
        let contents = read(&logger);
        assert!(!contents.contains("record 1"));
        assert!(contents.contains("record 2"));
        assert!(contents.contains("record 4"));
    }

    #[test]
    fn test_close_flushes_and_rejects_further_records() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).buffer_size(10).build().unwrap();

        logger.warning("pending").unwrap();
        logger.close();

        assert!(logger.is_closed());
        assert!(read(&logger).contains("WARNING | pending"));
        assert!(matches!(logger.info("late"), Err(Error::Closed)));
        assert!(matches!(logger.http(500, "late", None), Err(Error::Closed)));
    }

    #[test]
    fn test_drop_flushes_pending_records() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let path = dir.path().join("logs.txt");
        {
            let logger = builder(&dir, &sink).buffer_size(10).build().unwrap();
            logger.error("kept on drop").unwrap();
            assert_eq!(logger.pending(), 1);
        }
        assert!(fs::read_to_string(path).unwrap().contains("ERROR | kept on drop"));
    }

    #[test]
    fn test_custom_levels_and_set_level() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).new_level("AUDIT", 6).build().unwrap();

        logger.log("audit", "login").unwrap();
        assert!(read(&logger).contains("AUDIT | login"));

        logger.del_level("AUDIT").unwrap();
        assert!(matches!(
            logger.log("AUDIT", "x"),
            Err(Error::UnknownLevel(_))
        ));

        logger.set_level(DEBUG).unwrap();
        logger.debug("now visible").unwrap();
        assert!(read(&logger).contains("DEBUG | now visible"));
    }

    #[test]
    fn test_set_format() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();

        logger.set_format("%lvl: %text");
        logger.info("plain").unwrap();

        assert_eq!(read(&logger), "INFO: plain\n");
    }

    #[test]
    fn test_rotation_before_append() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        fs::write(logger.path(), "old content that is long\n").unwrap();

        logger.configure_rotation(Some(10), false);
        assert_eq!(logger.rotation(), RotationPolicy::new(Some(10), false));
        logger.info("fresh").unwrap();

        let rotated = dir.path().join("logs_20240203_100000.txt");
        assert_eq!(
            fs::read_to_string(rotated).unwrap(),
            "old content that is long\n"
        );
        assert_eq!(read(&logger), "[2024-02-03 10:00:00.00000] - INFO | fresh\n");
    }

    #[test]
    fn test_rotation_with_compression() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).rotation(Some(1), true).build().unwrap();
        fs::write(logger.path(), "previous run\n").unwrap();

        logger.info("fresh").unwrap();

        assert!(!dir.path().join("logs_20240203_100000.txt").exists());
        assert!(dir.path().join("logs_20240203_100000.txt.zip").exists());
        assert!(read(&logger).ends_with("INFO | fresh\n"));
    }

    #[test]
    fn test_explicit_rotate_if_needed() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        logger.info("some content").unwrap();

        assert!(logger.rotate_if_needed().is_none());
        logger.configure_rotation(Some(5), false);
        let rotated = logger.rotate_if_needed().unwrap();
        assert!(rotated.exists());
        assert!(!logger.path().exists());
    }

    #[test]
    fn test_archive_logs() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).buffer_size(5).build().unwrap();
        logger.info("archived").unwrap();

        let archive = dir.path().join("logs_archive.zip");
        assert!(logger.archive_logs(&archive));
        assert!(archive.exists());
        assert!(!logger.path().exists());

        assert!(!logger.archive_logs(dir.path().join("second.zip")));
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_monitor_log_size_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        logger.info("0123456789").unwrap();

        assert!(logger.monitor_log_size(10));
        assert!(logger.monitor_log_size(10));
        assert!(!logger.monitor_log_size(10_000));
        assert!(!logger.monitor_log_size(10_000));
    }

    #[test]
    fn test_delete_old_logs() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        fs::write(
            logger.path(),
            "[2024-01-01 10:00:00.00000] - INFO | ancient\n\
             [2024-02-02 09:00:00.00000] - INFO | yesterday\n\
             [2024-02-03 09:30:00.00000] - INFO | recent\n",
        )
        .unwrap();

        let removed = logger.delete_old_logs(chrono::Duration::hours(2)).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(
            read(&logger),
            "[2024-02-03 09:30:00.00000] - INFO | recent\n"
        );
    }

    #[test]
    fn test_delete_old_logs_age_beyond_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        let contents = "[2024-01-01 10:00:00.00000] - INFO | ancient\n";
        fs::write(logger.path(), contents).unwrap();

        let removed = logger
            .delete_old_logs(chrono::Duration::days(365 * 300_000))
            .unwrap();

        assert_eq!(removed, 0);
        assert_eq!(read(&logger), contents);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_delete_old_logs_rejects_unparseable_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        fs::write(logger.path(), "INFO: no timestamp here\n").unwrap();

        let result = logger.delete_old_logs(chrono::Duration::days(1));
        assert!(matches!(result, Err(Error::UnsupportedTimestampFormat(_))));
        assert_eq!(read(&logger), "INFO: no timestamp here\n");
    }

    #[test]
    fn test_delete_old_logs_zero_age_warns() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();

        assert_eq!(logger.delete_old_logs(chrono::Duration::zero()).unwrap(), 0);
        assert_eq!(sink.entries()[0].0, WARNING);
    }

    #[test]
    fn test_queries_read_persisted_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = MemoryErrorSink::new();
        let logger = builder(&dir, &sink).build().unwrap();
        logger.info("alpha").unwrap();
        logger.warning("Beta").unwrap();
        logger.error("gamma").unwrap();

        let stats = logger.log_stats();
        assert_eq!(stats[INFO], 1);
        assert_eq!(stats[WARNING], 1);
        assert_eq!(stats[ERROR], 1);

        assert_eq!(logger.filter_logs("warning").len(), 1);
        assert_eq!(logger.search_logs("BETA").len(), 1);
        assert!(logger.export_json(dir.path().join("out.json")));
        assert!(logger.export_html(dir.path().join("out.html")));
    }
}
