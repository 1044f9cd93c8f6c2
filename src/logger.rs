use std::env;

use chrono::Utc;
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Environment variable selecting the log level (`error` .. `trace`, `off`).
pub const LEVEL_ENV: &str = "FLIGHT_LAW_LOG";

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

fn tag(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m[ERROR]",
        Level::Warn => "\x1b[35m[WARN] ",
        Level::Info => "\x1b[32m[INFO] ",
        Level::Debug => "\x1b[33m[DEBUG]",
        Level::Trace => "\x1b[36m[TRACE]",
    }
}

/// `[LEVEL][HH:MM:SS] message`, level tag colored.
pub fn format_line(level: Level, message: &str) -> String {
    format!("{}[{}]\x1b[0m {}", tag(level), Utc::now().format("%H:%M:%S"), message)
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_line(record.level(), &record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Install the console logger. Fails if a logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

pub fn parse_level(value: Option<&str>) -> LevelFilter {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(LevelFilter::Info)
}

/// Level from `FLIGHT_LAW_LOG`, `info` when unset or unparsable.
pub fn level_from_env() -> LevelFilter {
    parse_level(env::var(LEVEL_ENV).ok().as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!(parse_level(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(parse_level(Some(" trace ")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("off")), LevelFilter::Off);
        assert_eq!(parse_level(Some("loud")), LevelFilter::Info);
        assert_eq!(parse_level(None), LevelFilter::Info);
    }

    #[test]
    fn line_carries_tag_and_message() {
        let line = format_line(Level::Warn, "journal write failed");
        assert!(line.starts_with("\x1b[35m[WARN] ["));
        assert!(line.ends_with("\x1b[0m journal write failed"));
    }
}
