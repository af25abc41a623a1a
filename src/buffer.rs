//! # Pending Line Buffer

use std::collections::VecDeque;

/// Rendered lines waiting to be committed to the backing file.
///
/// The buffer never performs I/O itself. A commit takes a snapshot with
/// [`LogBuffer::contents`], writes it, and only then calls
/// [`LogBuffer::clear`], so a failed write leaves every line in place for the
/// next attempt.
///
/// Lines kept across failed writes are bounded by a retention limit. Once it
/// is exceeded, [`LogBuffer::trim`] drops the oldest lines.
#[derive(Debug)]
pub struct LogBuffer {
    buffer: VecDeque<String>,
    capacity: usize,
    limit: usize,
}

impl LogBuffer {
    /// Creates a buffer that reports itself full after `capacity` lines.
    ///
    /// A capacity of zero is treated as one, i.e. unbuffered. The retention
    /// limit is never below the capacity.
    pub fn new(capacity: usize, limit: usize) -> Self {
        let capacity = capacity.max(1);
        LogBuffer {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            limit: limit.max(capacity),
        }
    }

    /// Appends a line and returns `true` once the buffer has reached capacity.
    pub fn push(&mut self, line: String) -> bool {
        self.buffer.push_back(line);
        self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// All pending lines, newline terminated, in insertion order.
    pub fn contents(&self) -> String {
        let size = self.buffer.iter().map(|line| line.len() + 1).sum();
        let mut out = String::with_capacity(size);
        for line in &self.buffer {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Drops the oldest lines beyond the retention limit and returns how many went.
    pub fn trim(&mut self) -> usize {
        let excess = self.buffer.len().saturating_sub(self.limit);
        self.buffer.drain(..excess);
        excess
    }
}
