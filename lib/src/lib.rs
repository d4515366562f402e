//! Runtime plumbing shared by every Quatro crate: leveled logging setup,
//! `quatro.*` configuration parsing, and the local draw generator used when
//! the backend cannot be reached.

pub mod config;
pub mod log;
pub mod random;

pub use config::{AppConfig, ConfigError, ConfigResult, cmdline_tokens, parse_bool, parse_duration};
pub use log::{LogLevel, log_init};
pub use random::{fallback_outcome, random_combo, random_digit};
