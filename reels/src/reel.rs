use bitflags::bitflags;
use quatro_abi::{Digit, DrawOutcome, REEL_COUNT};

/// Board-level phase of a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Spinning,
    Decelerating,
    /// Every reel rests on the outcome; the hand-off follows after a delay.
    Result,
}

impl Phase {
    /// A draw is in flight and `start` is refused.
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Spinning | Phase::Decelerating)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Spinning => "spinning",
            Phase::Decelerating => "decelerating",
            Phase::Result => "result",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ReelPhase {
    #[default]
    Idle,
    Spinning,
    Decelerating,
    Resting,
}

bitflags! {
    /// Reels that have come to rest during the current draw.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct SettledReels: u8 {
        const REEL_0 = 1 << 0;
        const REEL_1 = 1 << 1;
        const REEL_2 = 1 << 2;
        const REEL_3 = 1 << 3;
    }
}

impl SettledReels {
    pub fn reel(index: usize) -> Self {
        if index < REEL_COUNT {
            Self::from_bits_truncate(1 << index)
        } else {
            Self::empty()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Reel {
    pub offset: f64,
    pub phase: ReelPhase,
    pub target: Option<Digit>,
}

/// Mutable state of one sequencer. `generation` changes on every start and
/// every cancel; a draw task only touches the board while its own
/// generation is current.
#[derive(Debug, Default)]
pub(crate) struct Board {
    pub phase: Phase,
    pub reels: [Reel; REEL_COUNT],
    pub settled: SettledReels,
    pub generation: u64,
    pub outcome: Option<DrawOutcome>,
}

impl Board {
    pub fn begin_draw(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.phase = Phase::Spinning;
        self.settled = SettledReels::empty();
        self.outcome = None;
        for reel in self.reels.iter_mut() {
            reel.phase = ReelPhase::Spinning;
            reel.target = None;
        }
        self.generation
    }

    /// Invalidate the running draw and freeze the reels where they are.
    pub fn tear_down(&mut self) -> Phase {
        self.generation = self.generation.wrapping_add(1);
        let previous = self.phase;
        self.phase = Phase::Idle;
        for reel in self.reels.iter_mut() {
            reel.phase = ReelPhase::Idle;
        }
        previous
    }
}

/// Point-in-time copy of the board for renderers and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct BoardSnapshot {
    pub phase: Phase,
    pub reels: [ReelView; REEL_COUNT],
    pub settled: SettledReels,
    pub outcome: Option<DrawOutcome>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReelView {
    pub offset: f64,
    pub phase: ReelPhase,
    pub target: Option<Digit>,
    /// Digit currently in the middle of the viewport.
    pub visible: Digit,
}

impl BoardSnapshot {
    pub fn visible_digits(&self) -> [u8; REEL_COUNT] {
        self.reels.map(|reel| reel.visible.get())
    }
}
