//! Terminal sink for the runner's log stream.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;
use sonar_runner_types::{LogLevel, LogSink};
use std::io::{self, Write};

/// Writes errors to stderr and everything else to stdout.
///
/// Level prefixes are colored only when the target stream is a terminal.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    stdout_color: bool,
    stderr_color: bool,
}

impl ConsoleSink {
    pub fn detect() -> Self {
        Self {
            stdout_color: io::stdout().is_terminal(),
            stderr_color: io::stderr().is_terminal(),
        }
    }
}

impl LogSink for ConsoleSink {
    fn write_line(&mut self, level: LogLevel, line: &str) {
        match level {
            LogLevel::Error => {
                let rendered = style(level, line, self.stderr_color);
                let _ = writeln!(io::stderr().lock(), "{}", rendered);
            }
            _ => {
                let rendered = style(level, line, self.stdout_color);
                let _ = writeln!(io::stdout().lock(), "{}", rendered);
            }
        }
    }
}

fn style(level: LogLevel, line: &str, color: bool) -> String {
    if !color {
        return line.to_string();
    }

    let prefix = level.prefix();
    let Some(message) = line.strip_prefix(prefix) else {
        // Engine output arrives without a prefix.
        return line.to_string();
    };

    let prefix = match level {
        LogLevel::Error => prefix.red().bold().to_string(),
        LogLevel::Warn => prefix.yellow().to_string(),
        LogLevel::Info => prefix.to_string(),
        LogLevel::Debug => prefix.dimmed().to_string(),
    };
    format!("{}{}", prefix, message)
}
