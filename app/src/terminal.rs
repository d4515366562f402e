use quatro_abi::{Digit, ResultBundle, ResultKind};
use quatro_reels::{Phase, ReelBackend};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::trace;

/// Line-oriented stand-in for the draw screen.
///
/// Backend calls arrive with the board locked, so lines are only queued
/// here; [`print_lines`] writes them to stdout from its own task.
#[derive(Clone, Debug)]
pub struct TerminalBackend {
    lines: UnboundedSender<String>,
}

impl TerminalBackend {
    pub fn new() -> (Self, UnboundedReceiver<String>) {
        let (lines, rx) = unbounded_channel();
        (Self { lines }, rx)
    }

    fn say(&self, line: String) {
        if self.lines.send(line).is_err() {
            trace!("terminal printer is gone");
        }
    }
}

/// Drains queued lines until every [`TerminalBackend`] clone is dropped.
pub async fn print_lines(mut rx: UnboundedReceiver<String>) {
    while let Some(line) = rx.recv().await {
        println!("{}", line);
    }
}

impl ReelBackend for TerminalBackend {
    fn phase_changed(&self, phase: Phase) {
        match phase {
            Phase::Spinning => self.say("Spinning...".to_string()),
            Phase::Decelerating => self.say("Stopping the reels".to_string()),
            Phase::Result | Phase::Idle => {}
        }
    }

    fn reel_frame(&self, reel: usize, offset: f64) {
        trace!("reel {} at {:.1}", reel, offset);
    }

    fn reel_settled(&self, reel: usize, digit: Digit) {
        self.say(format!("  reel {}: {}", reel + 1, digit));
    }

    fn handoff(&self, bundle: &ResultBundle) {
        self.say(String::new());
        self.say(format!("Ticket {}  agent {}", bundle.ticket_number, bundle.agent_id));
        self.say(format!("  chosen  {}", bundle.chosen));
        self.say(format!("  drawn   {}", bundle.lucky_combo()));
        let verdict = match (bundle.kind(), bundle.prize.as_deref()) {
            (ResultKind::Win, Some(prize)) => format!("  WINNER: {}", prize),
            (ResultKind::Win, None) => "  WINNER".to_string(),
            (ResultKind::Done, _) => "  no win this time".to_string(),
        };
        self.say(verdict);
    }
}
