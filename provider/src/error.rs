use core::fmt;

use quatro_abi::OutcomeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// No bearer token configured; raised before any request is sent.
    NoAccessToken,
    /// Connection, TLS or protocol failure.
    Transport(String),
    TimedOut,
    /// Non-2xx answer. `message` is the backend's `error`/`detail` text.
    Status { code: u16, message: Option<String> },
    /// 2xx answer whose body is not the expected JSON shape.
    Decode(String),
    /// Well-formed JSON carrying an invalid draw.
    Malformed(OutcomeError),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAccessToken => write!(f, "no access token found"),
            Self::Transport(err) => write!(f, "network error: {}", err),
            Self::TimedOut => write!(f, "request timed out"),
            Self::Status {
                code,
                message: Some(message),
            } => write!(f, "backend answered {}: {}", code, message),
            Self::Status {
                code,
                message: None,
            } => write!(f, "backend answered {}", code),
            Self::Decode(err) => write!(f, "unexpected response body: {}", err),
            Self::Malformed(err) => write!(f, "malformed draw: {}", err),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimedOut
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

impl From<OutcomeError> for ProviderError {
    fn from(err: OutcomeError) -> Self {
        Self::Malformed(err)
    }
}

pub type ProviderResult<T = ()> = Result<T, ProviderError>;
