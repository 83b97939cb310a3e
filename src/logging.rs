//! Logger initialization

use clap::ValueEnum;
use log::LevelFilter;

/// Logging level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Initialize `env_logger`.
pub fn init_logger(level: LogLevel) -> Result<(), log::SetLoggerError> {
    logger_builder(level).try_init()
}

/// `RUST_LOG` is read first. `level` then replaces its default directive and the
/// level for this crate; other per-module `RUST_LOG` directives still apply. Dependency
/// chatter from sqlx and the HTTP stack is kept at info or above.
fn logger_builder(level: LogLevel) -> env_logger::Builder {
    let level = LevelFilter::from(level);
    let mut builder = env_logger::Builder::from_default_env();

    builder.filter_level(level);
    builder.filter_module("sqlx", LevelFilter::Warn);
    builder.filter_module("reqwest", level.min(LevelFilter::Info));
    builder.filter_module("hyper", level.min(LevelFilter::Info));
    builder.filter_module("hyper_util", level.min(LevelFilter::Info));
    builder.filter_module("profile_scraper", level);
    builder.format_timestamp_millis();
    builder
}
