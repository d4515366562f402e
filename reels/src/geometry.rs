//! Reel strip geometry and the landing math.
//!
//! A reel renders a strip holding the digits 1..=9 repeated `strip_copies`
//! times, one cell per digit, behind a three-cell viewport. The offset is the
//! distance the strip has scrolled; it only ever grows while the reel moves.
//! The middle cell of the viewport is the "centered" digit:
//!
//! ```text
//! offset = 0            offset = cell
//! +-----+               +-----+
//! |  1  |               |  2  |
//! |  2  |  <- centered  |  3  |  <- centered
//! |  3  |               |  4  |
//! +-----+               +-----+
//! ```
//!
//! so digit `d` is centered at `(d - 2) * cell`, taken modulo the cycle.

use std::time::Duration;

use quatro_abi::{DIGIT_COUNT, Digit};

/// Default cell height, in layout units.
pub const DEFAULT_CELL_HEIGHT: f64 = 96.0;
/// Copies of the 1..=9 sequence on one strip.
pub const DEFAULT_STRIP_COPIES: u32 = 5;

/// What to do when a reel already shows its target as deceleration begins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Travel at least one more full cycle so the stop still reads as a
    /// deceleration.
    #[default]
    ExtraCycle,
    /// Take the raw forward distance, which may be zero.
    Immediate,
}

impl MatchPolicy {
    pub fn from_extra_cycle(extra_cycle: bool) -> Self {
        if extra_cycle {
            MatchPolicy::ExtraCycle
        } else {
            MatchPolicy::Immediate
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReelGeometry {
    cell_height: f64,
    strip_copies: u32,
}

impl Default for ReelGeometry {
    fn default() -> Self {
        Self {
            cell_height: DEFAULT_CELL_HEIGHT,
            strip_copies: DEFAULT_STRIP_COPIES,
        }
    }
}

/// Reduce `offset` into `[0, cycle)`.
pub fn normalize_offset(offset: f64, cycle: f64) -> f64 {
    let wrapped = offset.rem_euclid(cycle);
    // rem_euclid can round up to `cycle` itself for tiny negative inputs.
    if wrapped >= cycle { 0.0 } else { wrapped }
}

impl ReelGeometry {
    pub fn new(cell_height: f64, strip_copies: u32) -> Option<Self> {
        if cell_height.is_finite() && cell_height > 0.0 && strip_copies > 0 {
            Some(Self {
                cell_height,
                strip_copies,
            })
        } else {
            None
        }
    }

    #[inline]
    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Distance after which the strip looks identical again.
    #[inline]
    pub fn cycle_length(&self) -> f64 {
        self.cell_height * f64::from(DIGIT_COUNT) * f64::from(self.strip_copies)
    }

    /// Canonical offset, in `[0, cycle)`, that centers `digit`.
    pub fn rest_offset(&self, digit: Digit) -> f64 {
        let raw = (f64::from(digit.strip_index()) - 1.0) * self.cell_height;
        normalize_offset(raw, self.cycle_length())
    }

    /// Digit whose cell center is nearest the viewport center.
    pub fn visible_digit(&self, offset: f64) -> Digit {
        let cell = (offset / self.cell_height).round() as i64;
        Digit::from_strip_index(cell + 1)
    }

    /// Offset of a looping reel `elapsed` into the spin, for a reel that
    /// covers one cycle every `period`.
    pub fn spin_offset(&self, elapsed: Duration, period: Duration) -> f64 {
        let period = period.as_secs_f64();
        if period <= 0.0 {
            return 0.0;
        }
        let cycle = self.cycle_length();
        normalize_offset(cycle * elapsed.as_secs_f64() / period, cycle)
    }
}

/// Final offset for a reel at `current` that must come to rest on `target`.
///
/// The result is the smallest offset past `current` that centers `target`,
/// so the reel never reverses. When `target` is already the centered digit,
/// [`MatchPolicy::ExtraCycle`] adds one full cycle on top.
pub fn resolve_deceleration_target(
    current: f64,
    target: Digit,
    geometry: &ReelGeometry,
    policy: MatchPolicy,
) -> f64 {
    let cycle = geometry.cycle_length();
    let mut distance = normalize_offset(geometry.rest_offset(target) - current, cycle);
    if policy == MatchPolicy::ExtraCycle && geometry.visible_digit(current) == target {
        distance += cycle;
    }
    current + distance
}
