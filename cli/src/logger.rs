//! Timestamped, level-gated diagnostics on stderr.
//!
//! One complete log line per event:
//!
//! ```text
//! [2026-08-02 12:00:00][driver:ERROR]: message
//! ```
//!
//! The level is process-wide configuration, set once at startup. Each line
//! is written with a single `eprintln!`, so lines stay atomic.

use std::sync::atomic::{AtomicU8, Ordering};

use chrono::Local;
use clap::ValueEnum;

/// Log levels, ordered by severity; `None` silences everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    None = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
}

static GLOBAL_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Set the process-wide log level.
pub fn set_level(level: LogLevel) {
    GLOBAL_LEVEL.store(level as u8, Ordering::Relaxed);
}

fn global_level() -> u8 {
    GLOBAL_LEVEL.load(Ordering::Relaxed)
}

/// ANSI colour and prefix per level, indexed by the level value.
const LEVEL_DATA: [(&str, &str); 5] = [
    ("\x1b[0m", "NONE"),
    ("\x1b[0;31m", "ERROR"),
    ("\x1b[0;33m", "WARN"),
    ("\x1b[0;32m", "INFO"),
    ("\x1b[38;5;214m", "DEBUG"),
];

/// A named logging handle for one component.
pub struct Logger {
    name: &'static str,
}

impl Logger {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message.as_ref());
    }

    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message.as_ref());
    }

    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message.as_ref());
    }

    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message.as_ref());
    }

    fn log(&self, level: LogLevel, message: &str) {
        if level == LogLevel::None || (level as u8) > global_level() {
            return;
        }

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let (color, prefix) = LEVEL_DATA[level as usize];

        eprintln!(
            "[{}]{}[{}:{}]:\x1b[0m {}",
            timestamp, color, self.name, prefix, message
        );
    }
}
