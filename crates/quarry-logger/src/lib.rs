pub mod logger;
pub mod severity;
pub mod time;

pub use logger::{init, init_with_level, parse_level, QuarryLogger, LOG_ENV};
pub use severity::LogSeverity;
