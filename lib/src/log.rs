//! Logging setup.
//!
//! All crates log through the `tracing` macros. This module only owns the
//! level vocabulary used by configuration and the one-time installation of
//! the fmt subscriber.
//!
//! # Level selection
//!
//! `RUST_LOG`, when set and valid, wins over the configured level so a single
//! module can be turned up without touching the command line:
//!
//! ```ignore
//! RUST_LOG=quatro_reels=trace quatro quatro.ticket_id=42
//! ```

use core::fmt;
use core::str::FromStr;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    pub fn as_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        const LEVELS: [LogLevel; 5] = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        LEVELS
            .into_iter()
            .find(|level| value.eq_ignore_ascii_case(level.as_str()))
            .ok_or_else(|| ConfigError::InvalidValue {
                key: "log".to_string(),
                value: value.to_string(),
            })
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static INIT: spin::Once<bool> = spin::Once::new();

/// Install the global subscriber. Only the first call has any effect; the
/// return value reports whether a subscriber was actually installed (another
/// one may already be registered, e.g. by a test harness).
pub fn log_init(level: LogLevel) -> bool {
    *INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(level.as_filter().into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init()
            .is_ok()
    })
}
