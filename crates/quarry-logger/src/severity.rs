use log::Level;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Trace,
    Debug,
    Info,
    Warning,
    Error,
}

impl From<Level> for LogSeverity {
    fn from(level: Level) -> Self {
        match level {
            Level::Trace => LogSeverity::Trace,
            Level::Debug => LogSeverity::Debug,
            Level::Info => LogSeverity::Info,
            Level::Warn => LogSeverity::Warning,
            Level::Error => LogSeverity::Error,
        }
    }
}

/// Display impl for LogSeverity
impl Display for LogSeverity {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogSeverity::Trace => write!(f, "TRACE"),
            LogSeverity::Debug => write!(f, "DEBUG"),
            LogSeverity::Info => write!(f, "INFO"),
            LogSeverity::Warning => write!(f, "WARNING"),
            LogSeverity::Error => write!(f, "ERROR"),
        }
    }
}
