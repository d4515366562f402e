//! Reel digits and four-digit combos.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::REEL_COUNT;
use crate::error::{DigitError, DigitResult, OutcomeError, OutcomeResult};

pub const DIGIT_MIN: u8 = 1;
pub const DIGIT_MAX: u8 = 9;
/// Distinct symbols on one reel strip.
pub const DIGIT_COUNT: u8 = DIGIT_MAX - DIGIT_MIN + 1;

/// One reel symbol, always in `DIGIT_MIN..=DIGIT_MAX`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Digit(u8);

impl Digit {
    pub const fn new(value: u8) -> Option<Self> {
        if value >= DIGIT_MIN && value <= DIGIT_MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position of this digit on the strip (`1` → `0`).
    #[inline]
    pub const fn strip_index(self) -> u8 {
        self.0 - DIGIT_MIN
    }

    /// Inverse of [`Digit::strip_index`], wrapping around the strip.
    pub fn from_strip_index(index: i64) -> Self {
        let wrapped = index.rem_euclid(DIGIT_COUNT as i64) as u8;
        Self(wrapped + DIGIT_MIN)
    }

    pub fn all() -> impl Iterator<Item = Digit> {
        (DIGIT_MIN..=DIGIT_MAX).map(Self)
    }
}

impl TryFrom<i64> for Digit {
    type Error = DigitError;

    fn try_from(value: i64) -> DigitResult<Self> {
        u8::try_from(value)
            .ok()
            .and_then(Digit::new)
            .ok_or(DigitError::OutOfRange(value))
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> u8 {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Four reel digits in reel order. Used both for the player's chosen numbers
/// and for a draw's winning numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<u8>")]
pub struct LuckyCombo([Digit; REEL_COUNT]);

impl LuckyCombo {
    pub const fn new(digits: [Digit; REEL_COUNT]) -> Self {
        Self(digits)
    }

    /// Validate raw integers, reporting the first offending position.
    pub fn from_values(values: &[i64]) -> OutcomeResult<Self> {
        if values.len() != REEL_COUNT {
            return Err(OutcomeError::WrongDigitCount {
                expected: REEL_COUNT,
                found: values.len(),
            });
        }
        let mut digits = [Digit(DIGIT_MIN); REEL_COUNT];
        for (index, &value) in values.iter().enumerate() {
            digits[index] = Digit::try_from(value)
                .map_err(|_| OutcomeError::DigitOutOfRange { index, value })?;
        }
        Ok(Self(digits))
    }

    /// Parse the compact form used on screen, e.g. `"3719"`.
    pub fn parse(text: &str) -> OutcomeResult<Self> {
        let text = text.trim();
        let found = text.chars().count();
        if found != REEL_COUNT {
            return Err(OutcomeError::WrongDigitCount {
                expected: REEL_COUNT,
                found,
            });
        }
        let mut digits = [Digit(DIGIT_MIN); REEL_COUNT];
        for (index, ch) in text.chars().enumerate() {
            digits[index] = ch
                .to_digit(10)
                .and_then(|v| Digit::new(v as u8))
                .ok_or(OutcomeError::InvalidCharacter { index, ch })?;
        }
        Ok(Self(digits))
    }

    #[inline]
    pub fn digits(&self) -> &[Digit; REEL_COUNT] {
        &self.0
    }

    #[inline]
    pub fn get(&self, reel: usize) -> Option<Digit> {
        self.0.get(reel).copied()
    }

    pub fn values(&self) -> [u8; REEL_COUNT] {
        self.0.map(Digit::get)
    }
}

impl FromStr for LuckyCombo {
    type Err = OutcomeError;

    fn from_str(s: &str) -> OutcomeResult<Self> {
        Self::parse(s)
    }
}

impl TryFrom<Vec<i64>> for LuckyCombo {
    type Error = OutcomeError;

    fn try_from(values: Vec<i64>) -> OutcomeResult<Self> {
        Self::from_values(&values)
    }
}

impl From<LuckyCombo> for Vec<u8> {
    fn from(combo: LuckyCombo) -> Vec<u8> {
        combo.values().to_vec()
    }
}

impl fmt::Display for LuckyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for digit in &self.0 {
            write!(f, "{}", digit)?;
        }
        Ok(())
    }
}
