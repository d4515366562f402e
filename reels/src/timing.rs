use std::time::Duration;

use quatro_abi::REEL_COUNT;
use quatro_lib::AppConfig;

use crate::easing::Easing;

const LOOP_BASE_MS: u64 = 600;
const LOOP_STEP_MS: u64 = 80;
const STOP_STAGGER_MS: u64 = 300;
const DECELERATION_BASE_MS: u64 = 2_000;
const DECELERATION_STEP_MS: u64 = 300;
const FRAME_MS: u64 = 16;

/// Durations of one draw. Per-reel values grow with the reel index so the
/// reels loop at slightly different speeds and stop left to right.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReelTiming {
    /// Fixed spin window; also the provider's deadline.
    pub spin: Duration,
    pub loop_base: Duration,
    pub loop_step: Duration,
    pub stop_stagger: Duration,
    pub deceleration_base: Duration,
    pub deceleration_step: Duration,
    pub deceleration_easing: Easing,
    /// Pause on the settled board before the hand-off.
    pub result_delay: Duration,
    /// Animation tick; anything under a millisecond runs at one millisecond.
    pub frame: Duration,
}

impl Default for ReelTiming {
    fn default() -> Self {
        let cfg = AppConfig::default();
        Self {
            spin: cfg.spin,
            loop_base: Duration::from_millis(LOOP_BASE_MS),
            loop_step: Duration::from_millis(LOOP_STEP_MS),
            stop_stagger: Duration::from_millis(STOP_STAGGER_MS),
            deceleration_base: Duration::from_millis(DECELERATION_BASE_MS),
            deceleration_step: Duration::from_millis(DECELERATION_STEP_MS),
            deceleration_easing: Easing::default(),
            result_delay: cfg.result_delay,
            frame: Duration::from_millis(FRAME_MS),
        }
    }
}

impl ReelTiming {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            spin: cfg.spin,
            result_delay: cfg.result_delay,
            ..Self::default()
        }
    }

    /// Time for `reel` to cover one full cycle while spinning.
    pub fn loop_period(&self, reel: usize) -> Duration {
        self.loop_base + self.loop_step * reel as u32
    }

    /// Delay between the end of the spin and `reel` starting to slow down.
    pub fn stop_delay(&self, reel: usize) -> Duration {
        self.stop_stagger * reel as u32
    }

    pub fn deceleration(&self, reel: usize) -> Duration {
        self.deceleration_base + self.deceleration_step * reel as u32
    }

    /// Upper bound on the time from `start` to the board settling.
    pub fn settle_deadline(&self) -> Duration {
        let slowest = (0..REEL_COUNT)
            .map(|reel| self.stop_delay(reel) + self.deceleration(reel))
            .max()
            .unwrap_or_default();
        self.spin + slowest
    }
}
