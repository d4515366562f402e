//! Ticket entry from `quatro.*` command-line keys.
//!
//! Either an already registered ticket is replayed (`quatro.ticket_id` plus
//! `quatro.numbers`), or a new one is registered from `quatro.ticket`,
//! `quatro.stake` and optionally `quatro.numbers`; missing numbers are
//! drawn at random, like the entry form's flash button.

use core::fmt;

use quatro_abi::{LuckyCombo, NewTicket, OutcomeError, TicketError, TicketId};
use quatro_lib::{cmdline_tokens, random_combo};
use rand::Rng;

const DEFAULT_AGENT: &str = "agent";

#[derive(Debug, Clone, PartialEq)]
pub enum EntryError {
    Missing(&'static str),
    InvalidTicketId(String),
    Numbers(OutcomeError),
    Ticket(TicketError),
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(key) => write!(f, "quatro.{} is required", key),
            Self::InvalidTicketId(raw) => write!(f, "ticket id {:?} is not a number", raw),
            Self::Numbers(err) => write!(f, "invalid lucky numbers: {}", err),
            Self::Ticket(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for EntryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Numbers(err) => Some(err),
            Self::Ticket(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TicketError> for EntryError {
    fn from(err: TicketError) -> Self {
        Self::Ticket(err)
    }
}

pub type EntryResult<T = ()> = Result<T, EntryError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Ticket {
    Registered { id: TicketId, numbers: LuckyCombo },
    New(NewTicket),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub agent_id: String,
    /// Winner's phone number, sent to the backend after a win.
    pub phone: Option<String>,
    pub ticket: Ticket,
}

#[derive(Default)]
struct RawEntry<'a> {
    ticket: Option<&'a str>,
    ticket_id: Option<&'a str>,
    stake: Option<&'a str>,
    numbers: Option<&'a str>,
    agent: Option<&'a str>,
    phone: Option<&'a str>,
}

impl Entry {
    pub fn from_cmdline<R: Rng + ?Sized>(cmdline: &str, rng: &mut R) -> EntryResult<Self> {
        let mut raw = RawEntry::default();
        for (key, value) in cmdline_tokens(cmdline) {
            let slot = match key {
                "ticket" => &mut raw.ticket,
                "ticket_id" => &mut raw.ticket_id,
                "stake" => &mut raw.stake,
                "numbers" => &mut raw.numbers,
                "agent" => &mut raw.agent,
                "phone" => &mut raw.phone,
                _ => continue,
            };
            *slot = Some(value);
        }

        let numbers = raw
            .numbers
            .map(LuckyCombo::parse)
            .transpose()
            .map_err(EntryError::Numbers)?;

        let ticket = match raw.ticket_id {
            Some(id) => Ticket::Registered {
                id: TicketId(
                    id.parse()
                        .map_err(|_| EntryError::InvalidTicketId(id.to_string()))?,
                ),
                numbers: numbers.ok_or(EntryError::Missing("numbers"))?,
            },
            None => {
                let number = raw.ticket.ok_or(EntryError::Missing("ticket"))?;
                let stake = raw.stake.ok_or(EntryError::Missing("stake"))?;
                let numbers = numbers.unwrap_or_else(|| random_combo(rng));
                Ticket::New(NewTicket::new(number, numbers, stake)?)
            }
        };

        Ok(Self {
            agent_id: raw.agent.unwrap_or(DEFAULT_AGENT).to_string(),
            phone: raw.phone.map(str::to_string),
            ticket,
        })
    }

    pub fn numbers(&self) -> LuckyCombo {
        match &self.ticket {
            Ticket::Registered { numbers, .. } => *numbers,
            Ticket::New(ticket) => ticket.numbers,
        }
    }
}
