//! Validation errors for the shared domain types.
//!
//! Each error maps to one construction path: `DigitError` for a single reel
//! value, `OutcomeError` for a four-digit combo or a provider response, and
//! `TicketError` for the ticket entry form.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitError {
    OutOfRange(i64),
}

impl fmt::Display for DigitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(value) => write!(f, "digit {} outside 1..=9", value),
        }
    }
}

impl std::error::Error for DigitError {}

/// Reasons a combo or a provider play response is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeError {
    WrongDigitCount { expected: usize, found: usize },
    DigitOutOfRange { index: usize, value: i64 },
    InvalidCharacter { index: usize, ch: char },
    MissingField(&'static str),
}

impl fmt::Display for OutcomeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongDigitCount { expected, found } => {
                write!(f, "expected {} digits, found {}", expected, found)
            }
            Self::DigitOutOfRange { index, value } => {
                write!(f, "digit {} at position {} outside 1..=9", value, index)
            }
            Self::InvalidCharacter { index, ch } => {
                write!(f, "character {:?} at position {} is not a digit 1-9", ch, index)
            }
            Self::MissingField(name) => write!(f, "missing field `{}`", name),
        }
    }
}

impl std::error::Error for OutcomeError {}

#[derive(Debug, Clone, PartialEq)]
pub enum TicketError {
    EmptyTicketNumber,
    InvalidStake(String),
    StakeTooLow { stake: f64, minimum: f64 },
    Numbers(OutcomeError),
}

impl fmt::Display for TicketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTicketNumber => write!(f, "ticket number is missing"),
            Self::InvalidStake(raw) => write!(f, "stake {:?} is not a number", raw),
            Self::StakeTooLow { stake, minimum } => {
                write!(f, "stake {} is below the minimum of {}", stake, minimum)
            }
            Self::Numbers(err) => write!(f, "invalid lucky numbers: {}", err),
        }
    }
}

impl std::error::Error for TicketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Numbers(err) => Some(err),
            _ => None,
        }
    }
}

impl From<OutcomeError> for TicketError {
    fn from(err: OutcomeError) -> Self {
        Self::Numbers(err)
    }
}

pub type DigitResult<T = ()> = Result<T, DigitError>;
pub type OutcomeResult<T = ()> = Result<T, OutcomeError>;
pub type TicketResult<T = ()> = Result<T, TicketError>;
