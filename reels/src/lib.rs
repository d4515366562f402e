//! Reel animation for the Quatro draw screen.
//!
//! [`ReelSequencer`] owns the board state and timers; rendering happens in a
//! [`ReelBackend`], and the landing math lives in [`geometry`] as pure
//! functions.

pub mod backend;
pub mod easing;
pub mod geometry;
pub mod reel;
pub mod sequencer;
pub mod timing;

#[cfg(test)]
mod sequencer_tests;

pub use backend::{NullBackend, ReelBackend};
pub use easing::{CubicBezier, Easing};
pub use geometry::{MatchPolicy, ReelGeometry, normalize_offset, resolve_deceleration_target};
pub use reel::{BoardSnapshot, Phase, Reel, ReelPhase, ReelView, SettledReels};
pub use sequencer::{ReelSequencer, SequencerSettings, StartStatus};
pub use timing::ReelTiming;
