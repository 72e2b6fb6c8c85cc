use crate::severity::LogSeverity;
use crate::time::now;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::io::Write;

/// Environment variable holding the log level (`error`, `warn`, `info`, `debug`, `trace`, `off`).
pub const LOG_ENV: &str = "QUARRY_LOG";

static LOGGER: OnceCell<QuarryLogger> = OnceCell::new();

/// Writes `[SEVERITY] <local time> <message>` lines to stderr.
///
/// Stdout is left alone so the tools can stream JSON there.
pub struct QuarryLogger {
    level: LevelFilter,
}

impl QuarryLogger {
    pub fn new(level: LevelFilter) -> Self {
        QuarryLogger { level }
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }
}

impl Log for QuarryLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(LogSeverity::from(record.level()), &now(), record.args());
        let _ = writeln!(std::io::stderr().lock(), "{}", line);
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_line(severity: LogSeverity, time: &str, msg: &std::fmt::Arguments) -> String {
    format!("[{}] {} {}", severity, time, msg)
}

/// Parses a level name, ignoring case and surrounding whitespace.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Installs the logger with the level from `QUARRY_LOG`, defaulting to `info`.
pub fn init() -> Result<(), SetLoggerError> {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Info);
    init_with_level(level)
}

/// Installs the logger with an explicit level. Later calls only adjust the max level.
pub fn init_with_level(level: LevelFilter) -> Result<(), SetLoggerError> {
    let mut fresh = false;
    let logger = LOGGER.get_or_init(|| {
        fresh = true;
        QuarryLogger::new(level)
    });
    if fresh {
        log::set_logger(logger)?;
    }
    log::set_max_level(level.min(logger.level()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
        assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_enabled_respects_level() {
        let logger = QuarryLogger::new(LevelFilter::Info);
        let info = Metadata::builder().level(Level::Info).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(logger.enabled(&info));
        assert!(!logger.enabled(&debug));
    }

    #[test]
    fn test_format_line() {
        let line = format_line(
            LogSeverity::Warning,
            "2024-01-01 00:00:00 UTC",
            &format_args!("chunk ({}, {}) skipped", 1, 2),
        );
        assert_eq!(line, "[WARNING] 2024-01-01 00:00:00 UTC chunk (1, 2) skipped");
    }

    #[test]
    fn test_init_twice_is_ok() {
        assert!(init_with_level(LevelFilter::Debug).is_ok());
        assert!(init_with_level(LevelFilter::Debug).is_ok());
    }
}
