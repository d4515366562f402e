//! Parameters passed into a draw and out to the result display.

use serde::{Deserialize, Serialize};

use crate::digit::LuckyCombo;
use crate::outcome::{DrawOutcome, OutcomeSource};
use crate::ticket::TicketId;

/// Everything the draw screen knows about the ticket being played.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRequest {
    pub ticket_id: TicketId,
    pub ticket_number: String,
    pub agent_id: String,
    pub chosen: LuckyCombo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Win,
    Done,
}

/// Opaque bundle handed to the result display once the reels settle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub ticket_number: String,
    pub agent_id: String,
    pub chosen: LuckyCombo,
    pub settled: LuckyCombo,
    pub has_won: bool,
    pub prize: Option<String>,
    pub ticket_id: TicketId,
    pub source: OutcomeSource,
}

impl ResultBundle {
    pub fn new(request: &PlayRequest, outcome: &DrawOutcome) -> Self {
        Self {
            ticket_number: request.ticket_number.clone(),
            agent_id: request.agent_id.clone(),
            chosen: request.chosen,
            settled: outcome.digits,
            has_won: outcome.has_won,
            prize: outcome.prize.clone(),
            ticket_id: request.ticket_id,
            source: outcome.source,
        }
    }

    /// Compact settled digits, e.g. `"3719"`.
    pub fn lucky_combo(&self) -> String {
        self.settled.to_string()
    }

    pub fn kind(&self) -> ResultKind {
        if self.has_won {
            ResultKind::Win
        } else {
            ResultKind::Done
        }
    }
}
