//! `quatro.*` configuration.
//!
//! Settings come from three layers, later layers overriding earlier ones:
//! built-in defaults, environment variables, then `quatro.<key>=<value>`
//! tokens from the command line. Tokens without the `quatro.` prefix are not
//! ours and are skipped; unknown `quatro.` keys are left for the caller (the
//! front-end reads its own ticket keys from the same token stream).

use core::fmt;
use std::time::Duration;

use tracing::debug;

use crate::log::LogLevel;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 8_000;
const DEFAULT_SPIN_MS: u64 = 10_000;
const DEFAULT_RESULT_DELAY_MS: u64 = 3_000;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;
const DEFAULT_EXTRA_CYCLE_ON_MATCH: bool = true;

const TOKEN_PREFIX: &str = "quatro.";

pub const ENV_API_URL: &str = "QUATRO_API_URL";
pub const ENV_ACCESS_TOKEN: &str = "QUATRO_ACCESS_TOKEN";
pub const ENV_LOG: &str = "QUATRO_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: String, value: String },
    InvalidUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value {:?} for quatro.{}", value, key)
            }
            Self::InvalidUrl(url) => {
                write!(f, "api url {:?} must start with http:// or https://", url)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub type ConfigResult<T = ()> = Result<T, ConfigError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    pub log_level: LogLevel,
    pub spin: Duration,
    pub result_delay: Duration,
    /// Whether a reel already showing its target still travels a full cycle.
    pub extra_cycle_on_match: bool,
    /// Fixed seed for the fallback generator; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            access_token: None,
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            log_level: DEFAULT_LOG_LEVEL,
            spin: Duration::from_millis(DEFAULT_SPIN_MS),
            result_delay: Duration::from_millis(DEFAULT_RESULT_DELAY_MS),
            extra_cycle_on_match: DEFAULT_EXTRA_CYCLE_ON_MATCH,
            seed: None,
        }
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("on")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("enabled")
        || value == "1"
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("disabled")
        || value == "0"
    {
        Some(false)
    } else {
        None
    }
}

/// Milliseconds, with an optional `ms` or `s` suffix: `1500`, `1500ms`, `10s`.
pub fn parse_duration(value: &str) -> Option<Duration> {
    if let Some(ms) = value.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else {
        value.parse::<u64>().ok().map(Duration::from_millis)
    }
}

/// Split a command line into `(key, value)` pairs for every `quatro.key=value`
/// token. The prefix is stripped from the key.
pub fn cmdline_tokens(cmdline: &str) -> impl Iterator<Item = (&str, &str)> {
    cmdline.split_whitespace().filter_map(|token| {
        token
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|rest| rest.split_once('='))
    })
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn normalize_url(url: &str) -> ConfigResult<String> {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(url.to_string())
    } else {
        Err(ConfigError::InvalidUrl(url.to_string()))
    }
}

impl AppConfig {
    /// Defaults, then the process environment, then `cmdline`.
    pub fn load(cmdline: Option<&str>) -> ConfigResult<Self> {
        let mut cfg = Self::default();
        cfg.apply_env(|name| std::env::var(name).ok())?;
        if let Some(cmdline) = cmdline {
            cfg.apply_cmdline(cmdline)?;
        }
        Ok(cfg)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> ConfigResult
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = normalize_url(&url)?;
        }
        if let Some(token) = lookup(ENV_ACCESS_TOKEN) {
            let token = token.trim();
            if !token.is_empty() {
                self.access_token = Some(token.to_string());
            }
        }
        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = level.trim().parse()?;
        }
        Ok(())
    }

    pub fn apply_cmdline(&mut self, cmdline: &str) -> ConfigResult {
        for (key, value) in cmdline_tokens(cmdline) {
            self.apply_token(key, value)?;
        }
        Ok(())
    }

    fn apply_token(&mut self, key: &str, value: &str) -> ConfigResult {
        match key {
            "api" => self.api_base_url = normalize_url(value)?,
            "token" => self.access_token = Some(value.to_string()),
            "timeout" => {
                self.request_timeout = parse_duration(value).ok_or_else(|| invalid(key, value))?
            }
            "log" => self.log_level = value.parse()?,
            "spin" => self.spin = parse_duration(value).ok_or_else(|| invalid(key, value))?,
            "result_delay" => {
                self.result_delay = parse_duration(value).ok_or_else(|| invalid(key, value))?
            }
            "extra_cycle" => {
                self.extra_cycle_on_match = parse_bool(value).ok_or_else(|| invalid(key, value))?
            }
            "seed" => self.seed = Some(value.parse().map_err(|_| invalid(key, value))?),
            _ => debug!("config: leaving quatro.{} to the caller", key),
        }
        Ok(())
    }
}
