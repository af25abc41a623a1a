//! # Line Formatting
//!
//! Renders `(timestamp, level, message)` triples through a user supplied
//! template. The recognised tokens are `%time`, `%lvl` and `%text`; any other
//! `%` sequence is copied through unchanged. There is no escape for a literal
//! `%time` in the template.

use std::fmt;

use chrono::{Local, NaiveDateTime, Timelike};

pub const TIME_TOKEN: &str = "%time";
pub const LEVEL_TOKEN: &str = "%lvl";
pub const TEXT_TOKEN: &str = "%text";

/// The template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "[%time] - %lvl | %text";

const TIMESTAMP_PATTERN: &str = "%Y-%m-%d %H:%M:%S";
const TIMESTAMP_PARSE_PATTERN: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Source of the instant stamped on each record.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock frozen at a single instant, for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Renders `YYYY-MM-DD HH:MM:SS.fffff` (microseconds with the last digit dropped).
pub fn format_timestamp(instant: &NaiveDateTime) -> String {
    let fraction = (instant.nanosecond() % 1_000_000_000) / 10_000;
    format!("{}.{fraction:05}", instant.format(TIMESTAMP_PATTERN))
}

/// Parses a timestamp produced by [`format_timestamp`].
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_PARSE_PATTERN).ok()
}

/// A line template such as `[%time] - %lvl | %text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    raw: String,
}

impl Default for Template {
    fn default() -> Self {
        Template::new(DEFAULT_TEMPLATE)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Template {
    pub fn new(raw: impl Into<String>) -> Self {
        Template { raw: raw.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Substitutes every token occurrence in a single pass over the template,
    /// so substituted values are never themselves scanned for tokens.
    pub fn render(&self, timestamp: &str, level: &str, message: &str) -> String {
        let mut out = String::with_capacity(self.raw.len() + message.len() + 32);
        let mut rest = self.raw.as_str();

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix(TIME_TOKEN) {
                out.push_str(timestamp);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(LEVEL_TOKEN) {
                out.push_str(level);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(TEXT_TOKEN) {
                out.push_str(message);
                rest = after;
            } else {
                out.push('%');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        out
    }

    /// Renders with the timestamp taken from `clock`.
    pub fn render_now(&self, clock: &dyn Clock, level: &str, message: &str) -> String {
        self.render(&format_timestamp(&clock.now()), level, message)
    }
}
