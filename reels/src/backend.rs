use quatro_abi::{Digit, ResultBundle};

use crate::reel::Phase;

/// Receives the sequencer's output: a renderer, a sound layer, a test spy.
///
/// Calls happen with the board locked, which is what lets `cancel` promise
/// that no further calls are made for a torn-down draw. Implementations must
/// not block, do I/O, or call back into the sequencer; anything slow belongs
/// on another task, fed through a channel.
pub trait ReelBackend: Send + Sync + 'static {
    fn phase_changed(&self, _phase: Phase) {}

    /// New strip offset for `reel`; emitted once per animation frame.
    fn reel_frame(&self, _reel: usize, _offset: f64) {}

    fn reel_settled(&self, _reel: usize, _digit: Digit) {}

    /// The result screen should take over with `bundle`.
    fn handoff(&self, _bundle: &ResultBundle) {}
}

/// Backend that ignores everything; observers use the watch channels instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl ReelBackend for NullBackend {}
