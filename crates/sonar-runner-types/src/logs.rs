//! Line-oriented log stream shared by every stage of a session.
//!
//! Components never print directly. They receive a `&mut Logs`, which
//! renders the level prefix and forwards whole lines to a [`LogSink`]. The
//! console sink lives in the CLI; [`CapturedLines`] keeps lines in memory
//! so that tests can assert on exact output.

use crate::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR: ",
            LogLevel::Warn => "WARN: ",
            LogLevel::Info => "INFO: ",
            LogLevel::Debug => "DEBUG: ",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "trace" => Ok(LogLevel::Debug),
            _ => Err(Error::InvalidLogLevel(s.to_string())),
        }
    }
}

/// Destination of rendered log lines.
pub trait LogSink: Send {
    fn write_line(&mut self, level: LogLevel, line: &str);
}

/// Level-filtering front end over a [`LogSink`].
pub struct Logs {
    sink: Box<dyn LogSink>,
    threshold: LogLevel,
}

impl Logs {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            threshold: LogLevel::Info,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.threshold = level;
        self
    }

    pub fn set_level(&mut self, level: LogLevel) {
        self.threshold = level;
    }

    pub fn level(&self) -> LogLevel {
        self.threshold
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.threshold
    }

    pub fn log(&mut self, level: LogLevel, message: impl AsRef<str>) {
        if self.enabled(level) {
            let line = format!("{}{}", level.prefix(), message.as_ref());
            self.sink.write_line(level, &line);
        }
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&mut self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    /// Write an info line whatever the threshold.
    pub fn always(&mut self, message: impl AsRef<str>) {
        let line = format!("{}{}", LogLevel::Info.prefix(), message.as_ref());
        self.sink.write_line(LogLevel::Info, &line);
    }

    /// Forward a line produced by the analysis engine without a prefix.
    pub fn passthrough(&mut self, line: &str) {
        if self.enabled(LogLevel::Info) {
            self.sink.write_line(LogLevel::Info, line);
        }
    }
}

impl fmt::Debug for Logs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logs")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

/// In-memory sink; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct CapturedLines {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl CapturedLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `Logs` writing into this buffer at debug level.
    pub fn logs(&self) -> Logs {
        Logs::new(self.clone()).with_level(LogLevel::Debug)
    }

    fn guard(&self) -> MutexGuard<'_, Vec<(LogLevel, String)>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn lines(&self) -> Vec<String> {
        self.guard().iter().map(|(_, line)| line.clone()).collect()
    }

    pub fn lines_at(&self, level: LogLevel) -> Vec<String> {
        self.guard()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, line)| line.clone())
            .collect()
    }

    pub fn contains(&self, fragment: &str) -> bool {
        self.guard().iter().any(|(_, line)| line.contains(fragment))
    }

    /// Number of lines containing `fragment`.
    pub fn count(&self, fragment: &str) -> usize {
        self.guard()
            .iter()
            .filter(|(_, line)| line.contains(fragment))
            .count()
    }

}

impl LogSink for CapturedLines {
    fn write_line(&mut self, level: LogLevel, line: &str) {
        self.guard().push((level, line.to_string()));
    }
}
