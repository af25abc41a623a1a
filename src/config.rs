//! # Configuration Module
//!
//! Process-wide defaults for [`FileLogger`](crate::FileLogger), generated with the
//! [`config_generator!`] macro.
//!
//! The defaults are populated once from an optional `HashMap<String, String>`
//! (through [`crate::init`]) and are read by
//! [`FileLogger::builder`](crate::FileLogger::builder). Every value can still be
//! overridden per logger on the builder.
//!
//! ## Fields
//! - `log_file_path`: backing file of new loggers
//! - `log_level`: threshold level name
//! - `buffer_size`: lines to accumulate before a flush (1 = unbuffered)
//! - `max_pending`: lines retained across failed writes before the oldest are dropped
//! - `flush_interval`: milliseconds after which a log call forces a flush (0 = never)
//! - `format`: line template
//! - `rotation_max_bytes`: rotate above this size (0 = no rotation)
//! - `rotation_compress`: zip rotated files
//! - `error_file_path`: file receiving failures of the logger itself
//!
//! ## Safety
//!
//! Calling `from_hashmap()` multiple times has no effect after the first call.
//! Call [`crate::init`] during application boot, before building any logger.
use macro_keeper::config_generator;

config_generator!(
    Config,
    CONFIG,
    [
        (log_file_path, String, "logs.txt".to_string()),
        (log_level, String, "DEBUG".to_string()),
        (buffer_size, usize, 1),
        (max_pending, usize, 10_000),
        (flush_interval, u64, 0),
        (format, String, "[%time] - %lvl | %text".to_string()),
        (rotation_max_bytes, u64, 0),
        (rotation_compress, bool, false),
        (error_file_path, String, "logger_errors.txt".to_string()),
    ]
);
