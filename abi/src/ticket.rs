//! Ticket registration types.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::digit::LuckyCombo;
use crate::error::{TicketError, TicketResult};

/// Smallest stake accepted for a Quatro ticket.
pub const MIN_STAKE: f64 = 5.0;

/// Backend identifier of a registered ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(pub u64);

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a stake as typed on the ticket form. Accepts `,` as the decimal
/// separator (`"5,50"` is 5.5).
pub fn parse_stake(raw: &str) -> TicketResult<f64> {
    let normalized = raw.trim().replace(',', ".");
    let stake: f64 = normalized
        .parse()
        .map_err(|_| TicketError::InvalidStake(raw.to_string()))?;
    if !stake.is_finite() {
        return Err(TicketError::InvalidStake(raw.to_string()));
    }
    if stake < MIN_STAKE {
        return Err(TicketError::StakeTooLow {
            stake,
            minimum: MIN_STAKE,
        });
    }
    Ok(stake)
}

/// Body of `POST /games/tickets/`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewTicket {
    pub external_ticket_number: String,
    pub numbers: LuckyCombo,
    pub stake: f64,
    pub age_verified: bool,
    #[serde(rename = "Is_quatro_plus")]
    pub is_quatro_plus: bool,
    #[serde(rename = "CRC", skip_serializing_if = "Option::is_none")]
    pub crc: Option<String>,
    #[serde(rename = "Detaillant", skip_serializing_if = "Option::is_none")]
    pub detaillant: Option<String>,
}

impl NewTicket {
    pub fn new(external_ticket_number: &str, numbers: LuckyCombo, stake: &str) -> TicketResult<Self> {
        let external_ticket_number = external_ticket_number.trim();
        if external_ticket_number.is_empty() {
            return Err(TicketError::EmptyTicketNumber);
        }
        Ok(Self {
            external_ticket_number: external_ticket_number.to_string(),
            numbers,
            stake: parse_stake(stake)?,
            age_verified: false,
            is_quatro_plus: false,
            crc: None,
            detaillant: None,
        })
    }
}

/// Ticket as returned by the create and update endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TicketRecord {
    pub id: TicketId,
    #[serde(default)]
    pub external_ticket_number: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Body of `GET /games/tickets/check_external_ticket/`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct TicketExistence {
    pub exists: bool,
}
