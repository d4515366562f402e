//! Draw outcomes and the provider's play response.

use serde::{Deserialize, Serialize};

use crate::digit::LuckyCombo;
use crate::error::{OutcomeError, OutcomeResult};

/// Prize awarded when a locally generated draw matches the player's numbers.
pub const FALLBACK_PRIZE: &str = "Porte-clés";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeSource {
    /// Authoritative result from the draw provider.
    Provider,
    /// Generated on the device after the provider failed or timed out.
    Fallback,
}

/// Result of one draw. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawOutcome {
    pub digits: LuckyCombo,
    pub has_won: bool,
    pub prize: Option<String>,
    pub source: OutcomeSource,
}

impl DrawOutcome {
    pub fn new(
        digits: LuckyCombo,
        has_won: bool,
        prize: Option<String>,
        source: OutcomeSource,
    ) -> Self {
        // The backend sends "" for "no gift"; keep a single representation.
        let prize = prize.filter(|p| !p.trim().is_empty());
        Self {
            digits,
            has_won,
            prize,
            source,
        }
    }

    /// Local draw: a win only when every reel matches the chosen number.
    pub fn fallback(digits: LuckyCombo, chosen: &LuckyCombo) -> Self {
        let has_won = digits == *chosen;
        let prize = has_won.then(|| FALLBACK_PRIZE.to_string());
        Self::new(digits, has_won, prize, OutcomeSource::Fallback)
    }
}

/// Body of `POST /games/tickets/{id}/play/`.
///
/// Every field is optional on the wire so a partial body decodes and is then
/// rejected by [`PlayResponse::into_outcome`] with a precise reason.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlayResponse {
    #[serde(default)]
    pub winning_numbers: Option<Vec<i64>>,
    #[serde(default)]
    pub has_won: Option<bool>,
    #[serde(default)]
    pub gift: Option<String>,
}

impl PlayResponse {
    pub fn into_outcome(self) -> OutcomeResult<DrawOutcome> {
        let numbers = self
            .winning_numbers
            .ok_or(OutcomeError::MissingField("winning_numbers"))?;
        let has_won = self.has_won.ok_or(OutcomeError::MissingField("has_won"))?;
        let digits = LuckyCombo::from_values(&numbers)?;
        Ok(DrawOutcome::new(
            digits,
            has_won,
            self.gift,
            OutcomeSource::Provider,
        ))
    }
}
