//! Four-reel draw sequencer.
//!
//! A draw runs as one spawned task:
//!
//! 1. Spinning: every reel loops at its own speed for the spin window while
//!    the provider is asked for the outcome. The request is bounded by the
//!    same window; an error, a malformed answer or a timeout switches to a
//!    locally generated outcome.
//! 2. Decelerating: each reel keeps looping for its stagger delay, then
//!    eases forward onto its target digit. The four reel routines run
//!    concurrently and the draw waits for all of them.
//! 3. Result: offsets snap to the exact rest positions, and after the
//!    result delay the [`ResultBundle`] is handed off.
//!
//! All board mutation goes through [`Shared::with_board`], which checks the
//! draw's generation under the lock. `cancel` bumps the generation under the
//! same lock, so nothing from a torn-down draw can land afterwards.

use std::sync::Arc;
use std::time::Duration;

use quatro_abi::{Digit, DrawOutcome, LuckyCombo, PlayRequest, REEL_COUNT, ResultBundle};
use quatro_lib::{AppConfig, fallback_outcome};
use quatro_provider::DrawProvider;
use rand::SeedableRng;
use rand::rngs::StdRng;
use spin::Mutex;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval, sleep, timeout};
use tracing::{debug, info, trace, warn};

use crate::backend::{NullBackend, ReelBackend};
use crate::geometry::{MatchPolicy, ReelGeometry, normalize_offset, resolve_deceleration_target};
use crate::reel::{Board, BoardSnapshot, Phase, ReelPhase, ReelView, SettledReels};
use crate::timing::ReelTiming;

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct SequencerSettings {
    pub geometry: ReelGeometry,
    pub timing: ReelTiming,
    pub match_policy: MatchPolicy,
    /// Seed for the fallback generator; entropy when absent.
    pub seed: Option<u64>,
}

impl SequencerSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            geometry: ReelGeometry::default(),
            timing: ReelTiming::from_config(cfg),
            match_policy: MatchPolicy::from_extra_cycle(cfg.extra_cycle_on_match),
            seed: cfg.seed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartStatus {
    Started,
    /// A draw is spinning or decelerating; the request was ignored.
    AlreadyRunning,
}

/// The draw this task belongs to is no longer current.
#[derive(Debug)]
struct Cancelled;

type Step<T = ()> = Result<T, Cancelled>;

/// Where the spin started, so per-reel routines can keep looping seamlessly.
#[derive(Clone, Copy, Debug)]
struct SpinClock {
    started: Instant,
    origins: [f64; REEL_COUNT],
}

// `interval` rejects a zero period.
const MIN_FRAME: Duration = Duration::from_millis(1);

fn frame_interval(timing: &ReelTiming) -> Interval {
    let mut frames = interval(timing.frame.max(MIN_FRAME));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    frames
}

struct Shared<P, B> {
    provider: P,
    backend: B,
    settings: SequencerSettings,
    board: Mutex<Board>,
    rng: Mutex<StdRng>,
    phase_tx: watch::Sender<Phase>,
    handoff_tx: watch::Sender<Option<ResultBundle>>,
}

impl<P: DrawProvider, B: ReelBackend> Shared<P, B> {
    /// Run `f` on the board if `draw_id` is still the current draw.
    fn with_board<R>(&self, draw_id: u64, f: impl FnOnce(&mut Board) -> R) -> Step<R> {
        let mut board = self.board.lock();
        if board.generation != draw_id {
            return Err(Cancelled);
        }
        Ok(f(&mut board))
    }

    fn enter(&self, board: &mut Board, phase: Phase) {
        board.phase = phase;
        self.backend.phase_changed(phase);
        self.phase_tx.send_replace(phase);
    }

    fn local_outcome(&self, chosen: &LuckyCombo) -> DrawOutcome {
        let mut rng = self.rng.lock();
        fallback_outcome(&mut *rng, chosen)
    }

    async fn fetch_outcome(&self, request: &PlayRequest) -> DrawOutcome {
        let window = self.settings.timing.spin;
        match timeout(window, self.provider.play_ticket(request.ticket_id)).await {
            Ok(Ok(outcome)) => {
                debug!("reels: ticket {} drew {}", request.ticket_id, outcome.digits);
                outcome
            }
            Ok(Err(err)) => {
                warn!(
                    "reels: provider failed for ticket {} ({}), drawing locally",
                    request.ticket_id, err
                );
                self.local_outcome(&request.chosen)
            }
            Err(_) => {
                warn!(
                    "reels: provider silent for {:?} on ticket {}, drawing locally",
                    window, request.ticket_id
                );
                self.local_outcome(&request.chosen)
            }
        }
    }

    async fn spin(&self, draw_id: u64) -> Step<SpinClock> {
        let timing = self.settings.timing;
        let geometry = self.settings.geometry;
        let cycle = geometry.cycle_length();
        let clock = SpinClock {
            started: Instant::now(),
            origins: self.with_board(draw_id, |board| board.reels.map(|reel| reel.offset))?,
        };
        let deadline = clock.started + timing.spin;
        let mut frames = frame_interval(&timing);
        loop {
            frames.tick().await;
            let now = Instant::now();
            let elapsed = now.min(deadline).saturating_duration_since(clock.started);
            self.with_board(draw_id, |board| {
                for (index, reel) in board.reels.iter_mut().enumerate() {
                    let travelled = geometry.spin_offset(elapsed, timing.loop_period(index));
                    reel.offset = normalize_offset(clock.origins[index] + travelled, cycle);
                    self.backend.reel_frame(index, reel.offset);
                }
            })?;
            if now >= deadline {
                return Ok(clock);
            }
        }
    }

    async fn stop_reel(
        self: Arc<Self>,
        draw_id: u64,
        reel: usize,
        target: Digit,
        clock: SpinClock,
    ) -> Step {
        let timing = self.settings.timing;
        let geometry = self.settings.geometry;
        let cycle = geometry.cycle_length();
        let period = timing.loop_period(reel);
        let stop_at = clock.started + timing.spin + timing.stop_delay(reel);
        let mut frames = frame_interval(&timing);

        // Keep looping through the stagger delay.
        loop {
            frames.tick().await;
            let now = Instant::now();
            let elapsed = now.min(stop_at).saturating_duration_since(clock.started);
            let offset =
                normalize_offset(clock.origins[reel] + geometry.spin_offset(elapsed, period), cycle);
            self.with_board(draw_id, |board| {
                board.reels[reel].offset = offset;
                self.backend.reel_frame(reel, offset);
            })?;
            if now >= stop_at {
                break;
            }
        }

        let (from, to) = self.with_board(draw_id, |board| {
            let state = &mut board.reels[reel];
            state.offset = normalize_offset(state.offset, cycle);
            state.phase = ReelPhase::Decelerating;
            let to = resolve_deceleration_target(
                state.offset,
                target,
                &geometry,
                self.settings.match_policy,
            );
            (state.offset, to)
        })?;
        trace!("reels: reel {} easing {:.1} -> {:.1} onto {}", reel, from, to, target);

        let duration = timing.deceleration(reel);
        let started = Instant::now();
        loop {
            frames.tick().await;
            let progress = if duration.is_zero() {
                1.0
            } else {
                (started.elapsed().as_secs_f64() / duration.as_secs_f64()).min(1.0)
            };
            let done = progress >= 1.0;
            let offset = if done {
                to
            } else {
                from + (to - from) * timing.deceleration_easing.apply(progress)
            };
            self.with_board(draw_id, |board| {
                let state = &mut board.reels[reel];
                state.offset = offset;
                self.backend.reel_frame(reel, offset);
                if done {
                    state.phase = ReelPhase::Resting;
                    board.settled |= SettledReels::reel(reel);
                    self.backend.reel_settled(reel, target);
                }
            })?;
            if done {
                return Ok(());
            }
        }
    }

    async fn play(self: &Arc<Self>, draw_id: u64, request: PlayRequest) -> Step {
        let (outcome, clock) = tokio::join!(self.fetch_outcome(&request), self.spin(draw_id));
        let clock = clock?;
        let targets = *outcome.digits.digits();

        self.with_board(draw_id, |board| {
            board.outcome = Some(outcome.clone());
            for (reel, target) in board.reels.iter_mut().zip(targets) {
                reel.target = Some(target);
            }
            self.enter(board, Phase::Decelerating);
        })?;

        let mut stops = JoinSet::new();
        for (reel, target) in targets.into_iter().enumerate() {
            stops.spawn(Arc::clone(self).stop_reel(draw_id, reel, target, clock));
        }
        while let Some(joined) = stops.join_next().await {
            match joined {
                Ok(step) => step?,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(_) => return Err(Cancelled),
            }
        }

        let bundle = ResultBundle::new(&request, &outcome);
        let geometry = self.settings.geometry;
        self.with_board(draw_id, |board| {
            for (index, (reel, target)) in board.reels.iter_mut().zip(targets).enumerate() {
                reel.offset = geometry.rest_offset(target);
                reel.phase = ReelPhase::Resting;
                self.backend.reel_frame(index, reel.offset);
            }
            self.enter(board, Phase::Result);
        })?;
        info!(
            "reels: ticket {} settled on {} ({:?}, won: {})",
            bundle.ticket_id,
            bundle.lucky_combo(),
            bundle.source,
            bundle.has_won
        );

        sleep(self.settings.timing.result_delay).await;
        self.with_board(draw_id, |_| {
            self.backend.handoff(&bundle);
            self.handoff_tx.send_replace(Some(bundle));
        })
    }
}

async fn run_draw<P: DrawProvider, B: ReelBackend>(
    shared: Arc<Shared<P, B>>,
    draw_id: u64,
    request: PlayRequest,
) {
    if shared.play(draw_id, request).await.is_err() {
        debug!("reels: draw {} torn down", draw_id);
    }
}

/// Drives four reels through one draw at a time.
///
/// Dropping the sequencer cancels any draw in flight.
pub struct ReelSequencer<P: DrawProvider, B: ReelBackend = NullBackend> {
    shared: Arc<Shared<P, B>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<P: DrawProvider, B: ReelBackend> ReelSequencer<P, B> {
    pub fn new(provider: P, backend: B, settings: SequencerSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (phase_tx, _) = watch::channel(Phase::Idle);
        let (handoff_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                provider,
                backend,
                settings,
                board: Mutex::new(Board::default()),
                rng: Mutex::new(rng),
                phase_tx,
                handoff_tx,
            }),
            task: Mutex::new(None),
        }
    }

    pub fn settings(&self) -> &SequencerSettings {
        &self.shared.settings
    }

    pub fn provider(&self) -> &P {
        &self.shared.provider
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    pub fn phase(&self) -> Phase {
        self.shared.board.lock().phase
    }

    pub fn subscribe(&self) -> watch::Receiver<Phase> {
        self.shared.phase_tx.subscribe()
    }

    /// Yields `Some(bundle)` once a draw's result delay has elapsed; reset to
    /// `None` when the next draw starts.
    pub fn subscribe_handoff(&self) -> watch::Receiver<Option<ResultBundle>> {
        self.shared.handoff_tx.subscribe()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        let geometry = self.shared.settings.geometry;
        let board = self.shared.board.lock();
        BoardSnapshot {
            phase: board.phase,
            reels: board.reels.map(|reel| ReelView {
                offset: reel.offset,
                phase: reel.phase,
                target: reel.target,
                visible: geometry.visible_digit(reel.offset),
            }),
            settled: board.settled,
            outcome: board.outcome.clone(),
        }
    }

    /// Begin a draw for `request`. Allowed from `Idle` and `Result`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, request: PlayRequest) -> StartStatus {
        let draw_id = {
            let mut board = self.shared.board.lock();
            if board.phase.is_running() {
                debug!(
                    "reels: start for ticket {} ignored, draw already {}",
                    request.ticket_id,
                    board.phase.as_str()
                );
                return StartStatus::AlreadyRunning;
            }
            let draw_id = board.begin_draw();
            self.shared.handoff_tx.send_replace(None);
            self.shared.enter(&mut board, Phase::Spinning);
            draw_id
        };
        info!(
            "reels: draw {} for ticket {} (chosen {})",
            draw_id, request.ticket_id, request.chosen
        );

        let handle = tokio::spawn(run_draw(Arc::clone(&self.shared), draw_id, request));
        if let Some(previous) = self.task.lock().replace(handle) {
            previous.abort();
        }
        StartStatus::Started
    }

    /// Stop the current draw where it is and return to `Idle`. The backend
    /// hears nothing more from it.
    pub fn cancel(&self) {
        let previous = {
            let mut board = self.shared.board.lock();
            let previous = board.tear_down();
            self.shared.phase_tx.send_replace(Phase::Idle);
            previous
        };
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
        if previous != Phase::Idle {
            debug!("reels: cancelled while {}", previous.as_str());
        }
    }
}

impl<P: DrawProvider, B: ReelBackend> Drop for ReelSequencer<P, B> {
    fn drop(&mut self) {
        self.cancel();
    }
}
