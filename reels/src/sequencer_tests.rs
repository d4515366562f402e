//! Draw lifecycle tests on a paused tokio clock.

use core::future::Future;
use std::sync::Arc;
use std::time::Duration;

use quatro_abi::{
    Digit, DrawOutcome, LuckyCombo, OutcomeError, OutcomeSource, PlayRequest, REEL_COUNT,
    ResultBundle, TicketId,
};
use quatro_provider::{DrawProvider, ProviderError, ProviderResult};
use spin::Mutex;
use tokio::time::{Instant, sleep};

use crate::backend::ReelBackend;
use crate::easing::{CubicBezier, Easing};
use crate::reel::{Phase, ReelPhase, SettledReels};
use crate::sequencer::{ReelSequencer, SequencerSettings, StartStatus};

#[derive(Clone, Debug, PartialEq)]
enum Event {
    Phase(Phase),
    Frame(usize, f64),
    Settled(usize, Digit),
    Handoff(ResultBundle),
}

#[derive(Default)]
struct SpyBackend {
    events: Mutex<Vec<Event>>,
}

impl SpyBackend {
    fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    fn len(&self) -> usize {
        self.events.lock().len()
    }

    fn phases(&self) -> Vec<Phase> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Phase(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn handoffs(&self) -> Vec<ResultBundle> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Handoff(b) => Some(b),
                _ => None,
            })
            .collect()
    }
}

impl ReelBackend for Arc<SpyBackend> {
    fn phase_changed(&self, phase: Phase) {
        self.events.lock().push(Event::Phase(phase));
    }

    fn reel_frame(&self, reel: usize, offset: f64) {
        self.events.lock().push(Event::Frame(reel, offset));
    }

    fn reel_settled(&self, reel: usize, digit: Digit) {
        self.events.lock().push(Event::Settled(reel, digit));
    }

    fn handoff(&self, bundle: &ResultBundle) {
        self.events.lock().push(Event::Handoff(bundle.clone()));
    }
}

/// Answers every play with the same reply after `delay`.
struct ScriptedProvider {
    reply: ProviderResult<DrawOutcome>,
    delay: Duration,
    calls: Mutex<Vec<TicketId>>,
}

impl ScriptedProvider {
    fn answering(reply: ProviderResult<DrawOutcome>, delay: Duration) -> Self {
        Self {
            reply,
            delay,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl DrawProvider for ScriptedProvider {
    fn play_ticket(
        &self,
        ticket: TicketId,
    ) -> impl Future<Output = ProviderResult<DrawOutcome>> + Send {
        self.calls.lock().push(ticket);
        let reply = self.reply.clone();
        let delay = self.delay;
        async move {
            sleep(delay).await;
            reply
        }
    }
}

fn combo(text: &str) -> LuckyCombo {
    LuckyCombo::parse(text).unwrap()
}

fn request(ticket: u64, chosen: &str) -> PlayRequest {
    PlayRequest {
        ticket_id: TicketId(ticket),
        ticket_number: format!("EXT-{}", ticket),
        agent_id: "007".to_string(),
        chosen: combo(chosen),
    }
}

fn provider_outcome(digits: &str, has_won: bool, prize: Option<&str>) -> DrawOutcome {
    DrawOutcome::new(
        combo(digits),
        has_won,
        prize.map(str::to_string),
        OutcomeSource::Provider,
    )
}

fn settings() -> SequencerSettings {
    SequencerSettings {
        seed: Some(7),
        ..SequencerSettings::default()
    }
}

fn sequencer(
    reply: ProviderResult<DrawOutcome>,
    delay: Duration,
) -> (ReelSequencer<ScriptedProvider, Arc<SpyBackend>>, Arc<SpyBackend>) {
    sequencer_with(settings(), reply, delay)
}

fn sequencer_with(
    settings: SequencerSettings,
    reply: ProviderResult<DrawOutcome>,
    delay: Duration,
) -> (ReelSequencer<ScriptedProvider, Arc<SpyBackend>>, Arc<SpyBackend>) {
    let spy = Arc::new(SpyBackend::default());
    let seq = ReelSequencer::new(
        ScriptedProvider::answering(reply, delay),
        Arc::clone(&spy),
        settings,
    );
    (seq, spy)
}

async fn wait_for_phase<P: DrawProvider, B: ReelBackend>(seq: &ReelSequencer<P, B>, phase: Phase) {
    let mut rx = seq.subscribe();
    rx.wait_for(|p| *p == phase).await.unwrap();
}

async fn wait_for_handoff<P: DrawProvider, B: ReelBackend>(seq: &ReelSequencer<P, B>) -> ResultBundle {
    let mut rx = seq.subscribe_handoff();
    let bundle = rx.wait_for(|b| b.is_some()).await.unwrap();
    bundle.clone().unwrap()
}

fn frame_slack() -> Duration {
    settings().timing.frame * 4
}

#[tokio::test(start_paused = true)]
async fn test_ticket_settles_on_provider_digits() {
    let (seq, spy) = sequencer(
        Ok(provider_outcome("3719", false, None)),
        Duration::from_millis(400),
    );
    let started = Instant::now();
    assert_eq!(seq.start(request(42, "1234")), StartStatus::Started);
    assert_eq!(seq.phase(), Phase::Spinning);

    let bundle = wait_for_handoff(&seq).await;
    let timing = seq.settings().timing;
    assert!(started.elapsed() >= timing.settle_deadline() + timing.result_delay);

    assert_eq!(bundle.ticket_id, TicketId(42));
    assert_eq!(bundle.ticket_number, "EXT-42");
    assert_eq!(bundle.agent_id, "007");
    assert_eq!(bundle.chosen, combo("1234"));
    assert_eq!(bundle.lucky_combo(), "3719");
    assert!(!bundle.has_won);
    assert_eq!(bundle.prize, None);
    assert_eq!(bundle.source, OutcomeSource::Provider);

    let snapshot = seq.snapshot();
    assert_eq!(snapshot.phase, Phase::Result);
    assert_eq!(snapshot.visible_digits(), [3, 7, 1, 9]);
    assert_eq!(snapshot.settled, SettledReels::all());
    assert!(snapshot.reels.iter().all(|r| r.phase == ReelPhase::Resting));
    let geometry = seq.settings().geometry;
    for (reel, digit) in snapshot.reels.iter().zip(combo("3719").digits()) {
        assert_eq!(reel.offset, geometry.rest_offset(*digit));
        assert_eq!(reel.target, Some(*digit));
    }

    assert_eq!(
        spy.phases(),
        vec![Phase::Spinning, Phase::Decelerating, Phase::Result]
    );
    assert_eq!(spy.handoffs(), vec![bundle]);
    assert_eq!(*seq.provider().calls.lock(), vec![TicketId(42)]);
}

#[tokio::test(start_paused = true)]
async fn test_winning_draw_carries_prize() {
    let (seq, _spy) = sequencer(
        Ok(provider_outcome("1234", true, Some("Casquette"))),
        Duration::from_millis(50),
    );
    seq.start(request(5, "1234"));
    let bundle = wait_for_handoff(&seq).await;
    assert!(bundle.has_won);
    assert_eq!(bundle.prize.as_deref(), Some("Casquette"));
    assert_eq!(bundle.kind(), quatro_abi::ResultKind::Win);
}

#[tokio::test(start_paused = true)]
async fn test_reels_settle_in_order_on_their_targets() {
    let (seq, spy) = sequencer(Ok(provider_outcome("9152", false, None)), Duration::ZERO);
    seq.start(request(1, "1111"));
    wait_for_phase(&seq, Phase::Result).await;

    let settled: Vec<_> = spy
        .events()
        .into_iter()
        .filter_map(|e| match e {
            Event::Settled(reel, digit) => Some((reel, digit.get())),
            _ => None,
        })
        .collect();
    assert_eq!(settled, vec![(0, 9), (1, 1), (2, 5), (3, 2)]);
}

/// Frames of `reel` from the start of its ease to its settle. The stagger
/// loop before the ease wraps around the strip; a wrap drops by most of a
/// cycle, while a reversing ease only ever steps back a little.
fn easing_frames(events: &[Event], reel: usize, cycle: f64) -> Vec<f64> {
    let decel_start = events
        .iter()
        .position(|e| *e == Event::Phase(Phase::Decelerating))
        .unwrap();
    let settled_at = events
        .iter()
        .position(|e| matches!(e, Event::Settled(r, _) if *r == reel))
        .unwrap();
    let offsets: Vec<f64> = events[decel_start..=settled_at]
        .iter()
        .filter_map(|e| match e {
            Event::Frame(r, offset) if *r == reel => Some(*offset),
            _ => None,
        })
        .collect();
    let ease_from = offsets
        .windows(2)
        .rposition(|w| w[0] - w[1] > cycle / 2.0)
        .map_or(0, |wrap| wrap + 1);
    offsets[ease_from..].to_vec()
}

fn assert_reels_move_forward<P: DrawProvider>(
    seq: &ReelSequencer<P, Arc<SpyBackend>>,
    spy: &SpyBackend,
    digit: u8,
) {
    let events = spy.events();
    let geometry = seq.settings().geometry;
    for reel in 0..REEL_COUNT {
        let easing = easing_frames(&events, reel, geometry.cycle_length());
        assert!(easing.len() > 10, "reel {} barely moved", reel);
        let backward = easing.windows(2).filter(|w| w[1] < w[0]).count();
        assert_eq!(backward, 0, "reel {} stepped back {} times", reel, backward);
        let last = *easing.last().unwrap();
        assert_eq!(geometry.visible_digit(last).get(), digit);
    }
}

#[tokio::test(start_paused = true)]
async fn test_deceleration_only_moves_forward() {
    let (seq, spy) = sequencer(Ok(provider_outcome("2222", false, None)), Duration::ZERO);
    seq.start(request(3, "2222"));
    wait_for_phase(&seq, Phase::Result).await;
    assert_reels_move_forward(&seq, &spy, 2);
}

#[tokio::test(start_paused = true)]
async fn test_custom_curve_never_reverses() {
    let mut custom = settings();
    // Control points below zero would ease backwards first.
    custom.timing.deceleration_easing = Easing::Bezier(CubicBezier::new(0.3, -0.8, 0.7, 1.0));
    let (seq, spy) = sequencer_with(custom, Ok(provider_outcome("5555", false, None)), Duration::ZERO);
    seq.start(request(4, "5555"));
    wait_for_phase(&seq, Phase::Result).await;
    assert_reels_move_forward(&seq, &spy, 5);
}

#[tokio::test(start_paused = true)]
async fn test_zero_frame_period_still_draws() {
    let mut custom = settings();
    custom.timing.frame = Duration::ZERO;
    let (seq, spy) = sequencer_with(custom, Ok(provider_outcome("8080", false, None)), Duration::ZERO);
    assert_eq!(seq.start(request(5, "1234")), StartStatus::Started);
    let bundle = wait_for_handoff(&seq).await;
    assert_eq!(bundle.lucky_combo(), "8080");
    assert_eq!(spy.handoffs().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_spinning_is_ignored() {
    let (seq, spy) = sequencer(Ok(provider_outcome("4444", false, None)), Duration::ZERO);
    assert_eq!(seq.start(request(1, "1234")), StartStatus::Started);
    sleep(Duration::from_secs(2)).await;
    assert_eq!(seq.start(request(2, "5678")), StartStatus::AlreadyRunning);

    let bundle = wait_for_handoff(&seq).await;
    assert_eq!(bundle.ticket_id, TicketId(1));
    assert_eq!(spy.phases().iter().filter(|p| **p == Phase::Spinning).count(), 1);
    assert_eq!(*seq.provider().calls.lock(), vec![TicketId(1)]);

    // Nothing else was scheduled by the refused start.
    sleep(Duration::from_secs(60)).await;
    assert_eq!(spy.handoffs().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_start_while_decelerating_is_ignored() {
    let (seq, spy) = sequencer(Ok(provider_outcome("4444", false, None)), Duration::ZERO);
    seq.start(request(1, "1234"));
    wait_for_phase(&seq, Phase::Decelerating).await;
    assert_eq!(seq.start(request(2, "5678")), StartStatus::AlreadyRunning);
    assert_eq!(seq.phase(), Phase::Decelerating);

    wait_for_handoff(&seq).await;
    sleep(Duration::from_secs(60)).await;
    assert_eq!(spy.handoffs().len(), 1);
    assert_eq!(spy.phases().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_restart_from_result() {
    let (seq, spy) = sequencer(Ok(provider_outcome("8642", false, None)), Duration::ZERO);
    seq.start(request(1, "1234"));
    wait_for_phase(&seq, Phase::Result).await;

    // Starting again during the result delay replaces the pending hand-off.
    assert_eq!(seq.start(request(2, "1234")), StartStatus::Started);
    assert_eq!(*seq.subscribe_handoff().borrow(), None);
    let bundle = wait_for_handoff(&seq).await;
    assert_eq!(bundle.ticket_id, TicketId(2));
    sleep(Duration::from_secs(60)).await;
    assert_eq!(spy.handoffs(), vec![bundle]);

    // And again after the hand-off.
    assert_eq!(seq.start(request(3, "1234")), StartStatus::Started);
    assert_eq!(wait_for_handoff(&seq).await.ticket_id, TicketId(3));
}

#[tokio::test(start_paused = true)]
async fn test_provider_error_falls_back_in_time() {
    let (seq, spy) = sequencer(
        Err(ProviderError::Transport("connection refused".to_string())),
        Duration::from_millis(300),
    );
    let started = Instant::now();
    seq.start(request(9, "5555"));
    wait_for_phase(&seq, Phase::Result).await;
    let timing = seq.settings().timing;
    assert!(started.elapsed() <= timing.settle_deadline() + frame_slack());

    let outcome = seq.snapshot().outcome.unwrap();
    assert_eq!(outcome.source, OutcomeSource::Fallback);
    assert_eq!(outcome.has_won, outcome.digits == combo("5555"));
    assert_eq!(seq.snapshot().visible_digits(), outcome.digits.values());

    let bundle = wait_for_handoff(&seq).await;
    assert_eq!(bundle.source, OutcomeSource::Fallback);
    assert_eq!(spy.handoffs().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_malformed_response_falls_back() {
    let (seq, _spy) = sequencer(
        Err(ProviderError::Malformed(OutcomeError::DigitOutOfRange {
            index: 1,
            value: 0,
        })),
        Duration::ZERO,
    );
    seq.start(request(9, "5555"));
    let bundle = wait_for_handoff(&seq).await;
    assert_eq!(bundle.source, OutcomeSource::Fallback);
    assert!(bundle.settled.values().iter().all(|d| (1..=9).contains(d)));
}

#[tokio::test(start_paused = true)]
async fn test_silent_provider_times_out_to_fallback() {
    let (seq, _spy) = sequencer(
        Ok(provider_outcome("1111", true, Some("never"))),
        Duration::from_secs(3_600),
    );
    let started = Instant::now();
    seq.start(request(11, "2468"));
    wait_for_phase(&seq, Phase::Decelerating).await;
    let timing = seq.settings().timing;
    assert!(started.elapsed() <= timing.spin + frame_slack());

    wait_for_phase(&seq, Phase::Result).await;
    assert!(started.elapsed() <= timing.settle_deadline() + frame_slack());
    let outcome = seq.snapshot().outcome.unwrap();
    assert_eq!(outcome.source, OutcomeSource::Fallback);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_spinning_silences_backend() {
    let (seq, spy) = sequencer(Ok(provider_outcome("3719", false, None)), Duration::ZERO);
    seq.start(request(42, "1234"));
    sleep(Duration::from_secs(2)).await;
    assert!(spy.len() > 0);

    seq.cancel();
    let seen = spy.len();
    assert_eq!(seq.phase(), Phase::Idle);
    sleep(Duration::from_secs(60)).await;
    assert_eq!(spy.len(), seen);
    assert_eq!(*seq.subscribe().borrow(), Phase::Idle);
    assert_eq!(*seq.subscribe_handoff().borrow(), None);
    assert_eq!(seq.snapshot().outcome, None);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_while_decelerating_freezes_board() {
    let (seq, spy) = sequencer(Ok(provider_outcome("3719", false, None)), Duration::ZERO);
    seq.start(request(42, "1234"));
    wait_for_phase(&seq, Phase::Decelerating).await;
    sleep(Duration::from_millis(500)).await;

    seq.cancel();
    let frozen = seq.snapshot();
    let seen = spy.len();
    sleep(Duration::from_secs(60)).await;
    assert_eq!(spy.len(), seen);
    assert_eq!(seq.snapshot(), frozen);
    assert_eq!(frozen.phase, Phase::Idle);
    assert!(frozen.settled != SettledReels::all());
    assert!(spy.handoffs().is_empty());

    // A fresh draw still works afterwards.
    assert_eq!(seq.start(request(43, "1234")), StartStatus::Started);
    assert_eq!(wait_for_handoff(&seq).await.ticket_id, TicketId(43));
}

#[tokio::test(start_paused = true)]
async fn test_drop_tears_down() {
    let (seq, spy) = sequencer(Ok(provider_outcome("3719", false, None)), Duration::ZERO);
    let mut phases = seq.subscribe();
    seq.start(request(42, "1234"));
    sleep(Duration::from_secs(1)).await;

    drop(seq);
    let seen = spy.len();
    sleep(Duration::from_secs(60)).await;
    assert_eq!(spy.len(), seen);
    assert_eq!(*phases.borrow_and_update(), Phase::Idle);
    // The sender went away with the sequencer.
    assert!(phases.changed().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_observers_see_every_phase() {
    let (seq, _spy) = sequencer(Ok(provider_outcome("5678", false, None)), Duration::ZERO);
    let mut rx = seq.subscribe();
    assert_eq!(*rx.borrow_and_update(), Phase::Idle);
    seq.start(request(1, "1234"));
    let mut seen = Vec::new();
    while seen.last() != Some(&Phase::Result) {
        rx.changed().await.unwrap();
        seen.push(*rx.borrow_and_update());
    }
    assert_eq!(seen, vec![Phase::Spinning, Phase::Decelerating, Phase::Result]);
}
