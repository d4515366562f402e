//! Quatro shared domain types
//!
//! This crate provides the canonical definitions for every value that crosses
//! a boundary: the backend wire format, the reel sequencer and the result
//! display. Having a single source of truth means the digit range and the
//! four-reel layout are checked once, at construction, and never again:
//! - `Digit` cannot hold anything outside 1..=9
//! - `LuckyCombo` always holds exactly `REEL_COUNT` digits
//! - `DrawOutcome` can only be built from a validated combo

#![forbid(unsafe_code)]

pub mod digit;
pub mod error;
pub mod gift;
pub mod handoff;
pub mod outcome;
pub mod ticket;

/// Number of reels on the draw screen, and digits in a combo.
pub const REEL_COUNT: usize = 4;

pub use digit::{DIGIT_COUNT, DIGIT_MAX, DIGIT_MIN, Digit, LuckyCombo};
pub use error::*;
pub use gift::Gift;
pub use handoff::{PlayRequest, ResultBundle, ResultKind};
pub use outcome::{DrawOutcome, FALLBACK_PRIZE, OutcomeSource, PlayResponse};
pub use ticket::{MIN_STAKE, NewTicket, TicketExistence, TicketId, TicketRecord, parse_stake};
