//! # Console Logger
//!
//! Unbuffered sibling of [`FileLogger`](crate::FileLogger): records are
//! rendered with the same templates and level threshold but printed straight
//! to the console, with the level token wrapped in an ANSI color. There is no
//! switch to turn coloring off.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::format::{Clock, SystemClock, Template};
use crate::level::{LevelRegistry, CRITICAL, DEBUG, ERROR, INFO, WARNING};
use crate::Logger;

/// The console palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Standard,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// The ANSI escape sequence selecting this color.
    pub fn code(self) -> &'static str {
        match self {
            Color::Standard => "\x1b[0m",
            Color::Red => "\x1b[91m",
            Color::Green => "\x1b[92m",
            Color::Yellow => "\x1b[93m",
            Color::Blue => "\x1b[94m",
            Color::Magenta => "\x1b[95m",
            Color::Cyan => "\x1b[96m",
            Color::White => "\x1b[97m",
        }
    }

    /// Wraps `text` in this color and resets afterwards.
    pub fn paint(self, text: &str) -> String {
        format!("{}{text}{}", self.code(), Color::Standard.code())
    }
}

impl FromStr for Color {
    type Err = Error;

    /// Parses a palette name such as `"Cyan"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(Color::Standard),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "magenta" => Ok(Color::Magenta),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            _ => Err(Error::UnknownColor(s.to_string())),
        }
    }
}

const DEFAULT_COLORS: [(&str, Color); 5] = [
    (DEBUG, Color::Cyan),
    (INFO, Color::Standard),
    (WARNING, Color::Yellow),
    (ERROR, Color::Red),
    (CRITICAL, Color::Magenta),
];

pub struct ConsoleLoggerBuilder {
    level: String,
    template: Template,
    levels: LevelRegistry,
    colors: HashMap<String, String>,
    http_color: String,
    writer: Option<Box<dyn Write + Send>>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ConsoleLoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleLoggerBuilder")
            .field("level", &self.level)
            .field("template", &self.template)
            .field("colors", &self.colors)
            .field("http_color", &self.http_color)
            .finish_non_exhaustive()
    }
}

impl Default for ConsoleLoggerBuilder {
    fn default() -> Self {
        ConsoleLoggerBuilder {
            level: DEBUG.to_string(),
            template: Template::default(),
            levels: LevelRegistry::default(),
            colors: DEFAULT_COLORS
                .iter()
                .map(|(level, color)| (level.to_string(), format!("{color:?}")))
                .collect(),
            http_color: format!("{:?}", Color::Green),
            writer: None,
            clock: Arc::new(SystemClock),
        }
    }
}

impl ConsoleLoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn format(mut self, template: impl Into<String>) -> Self {
        self.template = Template::new(template);
        self
    }

    /// Assigns a palette color name to `level`.
    pub fn color(mut self, level: &str, color: impl Into<String>) -> Self {
        self.colors.insert(level.to_uppercase(), color.into());
        self
    }

    pub fn http_color(mut self, color: impl Into<String>) -> Self {
        self.http_color = color.into();
        self
    }

    /// Registers a custom level together with its color.
    pub fn new_level(mut self, name: &str, priority: u32, color: impl Into<String>) -> Self {
        self.levels.new_level(name, priority);
        self.colors.insert(name.to_uppercase(), color.into());
        self
    }

    /// Sends output somewhere other than stdout.
    pub fn writer(mut self, writer: Box<dyn Write + Send>) -> Self {
        self.writer = Some(writer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Validates the threshold and the color of every registered level.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownLevel`], [`Error::UnknownColor`] or
    /// [`Error::MissingColor`].
    pub fn build(self) -> Result<ConsoleLogger> {
        let threshold = self.levels.priority(&self.level)?;
        let http_color: Color = self.http_color.parse()?;

        let mut colors = HashMap::with_capacity(self.colors.len());
        for (level, name) in &self.colors {
            colors.insert(level.clone(), name.parse::<Color>()?);
        }
        if let Some(missing) = self
            .levels
            .names()
            .into_iter()
            .find(|level| !colors.contains_key(level))
        {
            return Err(Error::MissingColor(missing));
        }

        Ok(ConsoleLogger {
            inner: Mutex::new(Inner {
                levels: self.levels,
                threshold,
                template: self.template,
                colors,
                http_color,
                writer: self.writer.unwrap_or_else(|| Box::new(io::stdout())),
            }),
            clock: self.clock,
        })
    }
}

struct Inner {
    levels: LevelRegistry,
    threshold: u32,
    template: Template,
    colors: HashMap<String, Color>,
    http_color: Color,
    writer: Box<dyn Write + Send>,
}

impl Inner {
    fn emit(&mut self, line: &str) {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .unwrap_or_else(|err| eprintln!("Failed to write log: {err}"));
    }
}

/// Prints colored records to the console as soon as they are logged.
pub struct ConsoleLogger {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for ConsoleLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ConsoleLogger")
            .field("levels", &inner.levels)
            .field("threshold", &inner.threshold)
            .field("template", &inner.template)
            .field("colors", &inner.colors)
            .field("http_color", &inner.http_color)
            .finish_non_exhaustive()
    }
}

impl ConsoleLogger {
    pub fn builder() -> ConsoleLoggerBuilder {
        ConsoleLoggerBuilder::default()
    }

    /// A stdout logger with the default palette and `level` as threshold.
    pub fn new(level: &str) -> Result<Self> {
        Self::builder().level(level).build()
    }

    pub fn threshold(&self) -> u32 {
        self.inner.lock().threshold
    }

    pub fn set_level(&self, level: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.threshold = inner.levels.priority(level)?;
        Ok(())
    }

    /// Registers or replaces a level. The color is validated before anything changes.
    pub fn new_level(&self, name: &str, priority: u32, color: &str) -> Result<()> {
        let color: Color = color.parse()?;
        let mut inner = self.inner.lock();
        inner.levels.new_level(name, priority);
        inner.colors.insert(name.to_uppercase(), color);
        Ok(())
    }

    pub fn del_level(&self, name: &str) -> Result<u32> {
        let mut inner = self.inner.lock();
        let priority = inner.levels.del_level(name)?;
        inner.colors.remove(&name.to_uppercase());
        Ok(priority)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, level: &str, message: &str) -> Result<()> {
        let level = level.to_uppercase();
        let mut inner = self.inner.lock();
        if inner.levels.priority(&level)? < inner.threshold {
            return Ok(());
        }
        let color = inner
            .colors
            .get(&level)
            .copied()
            .ok_or_else(|| Error::MissingColor(level.clone()))?;
        let line = inner
            .template
            .render_now(self.clock.as_ref(), &color.paint(&level), message);
        inner.emit(&line);
        Ok(())
    }

    /// Always printed, whatever the threshold.
    fn http(&self, code: u16, message: &str, url: Option<&str>) -> Result<()> {
        let text = match url {
            Some(url) => format!("{message} - ({url})"),
            None => message.to_string(),
        };
        let mut inner = self.inner.lock();
        let token = inner.http_color.paint(&format!("HTTP {code}"));
        let line = inner.template.render_now(self.clock.as_ref(), &token, &text);
        inner.emit(&line);
        Ok(())
    }
}
