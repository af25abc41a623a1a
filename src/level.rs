//! # Level Registry

use std::collections::HashMap;

use crate::error::{Error, Result};

pub const DEBUG: &str = "DEBUG";
pub const INFO: &str = "INFO";
pub const WARNING: &str = "WARNING";
pub const ERROR: &str = "ERROR";
pub const CRITICAL: &str = "CRITICAL";

/// The built-in levels and their priorities, lowest first.
pub const DEFAULT_LEVELS: [(&str, u32); 5] = [
    (DEBUG, 1),
    (INFO, 2),
    (WARNING, 3),
    (ERROR, 4),
    (CRITICAL, 5),
];

/// A flat mapping from level name to numeric priority.
///
/// Level names are stored uppercase. Priorities are not required to be
/// distinct; a record is emitted whenever its priority is greater than or
/// equal to the threshold priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRegistry {
    levels: HashMap<String, u32>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        let levels = DEFAULT_LEVELS
            .iter()
            .map(|(name, priority)| (name.to_string(), *priority))
            .collect();
        LevelRegistry { levels }
    }
}

impl LevelRegistry {
    /// Creates a registry seeded with `DEBUG=1 .. CRITICAL=5`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a level, silently replacing the priority of an existing one.
    pub fn new_level(&mut self, name: &str, priority: u32) {
        self.levels.insert(name.to_uppercase(), priority);
    }

    /// Removes a level.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLevel`] if the level is not registered.
    pub fn del_level(&mut self, name: &str) -> Result<u32> {
        self.levels
            .remove(&name.to_uppercase())
            .ok_or_else(|| Error::UnknownLevel(name.to_string()))
    }

    /// Looks up the priority of `name`.
    pub fn priority(&self, name: &str) -> Result<u32> {
        self.levels
            .get(&name.to_uppercase())
            .copied()
            .ok_or_else(|| Error::UnknownLevel(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.contains_key(&name.to_uppercase())
    }

    /// Registered level names ordered by priority, then by name.
    pub fn names(&self) -> Vec<String> {
        let mut entries: Vec<(&String, &u32)> = self.levels.iter().collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)));
        entries.into_iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
