use quatro_abi::{DIGIT_MAX, DIGIT_MIN, Digit, DrawOutcome, LuckyCombo, REEL_COUNT};
use rand::Rng;

pub fn random_digit<R: Rng + ?Sized>(rng: &mut R) -> Digit {
    Digit::from_strip_index(rng.gen_range(0..=(DIGIT_MAX - DIGIT_MIN)) as i64)
}

/// Four independent digits; also backs the "flash" auto-fill on ticket entry.
pub fn random_combo<R: Rng + ?Sized>(rng: &mut R) -> LuckyCombo {
    let mut digits = [Digit::from_strip_index(0); REEL_COUNT];
    for slot in digits.iter_mut() {
        *slot = random_digit(rng);
    }
    LuckyCombo::new(digits)
}

/// Local draw used when the provider is unavailable.
pub fn fallback_outcome<R: Rng + ?Sized>(rng: &mut R, chosen: &LuckyCombo) -> DrawOutcome {
    DrawOutcome::fallback(random_combo(rng), chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quatro_abi::{FALLBACK_PRIZE, OutcomeSource};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_digits_cover_range() {
        let mut rng = StdRng::seed_from_u64(0xACE1);
        let mut seen = [false; 10];
        for _ in 0..2_000 {
            let d = random_digit(&mut rng).get();
            assert!((DIGIT_MIN..=DIGIT_MAX).contains(&d));
            seen[d as usize] = true;
        }
        assert!(!seen[0]);
        assert!(seen[1..].iter().all(|&s| s));
    }

    #[test]
    fn test_fallback_win_flag_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let chosen = LuckyCombo::parse("5555").unwrap();
        for _ in 0..500 {
            let outcome = fallback_outcome(&mut rng, &chosen);
            assert_eq!(outcome.source, OutcomeSource::Fallback);
            assert_eq!(outcome.has_won, outcome.digits == chosen);
            if outcome.has_won {
                assert_eq!(outcome.prize.as_deref(), Some(FALLBACK_PRIZE));
            } else {
                assert_eq!(outcome.prize, None);
            }
        }
    }

    #[test]
    fn test_fallback_same_seed_same_draw() {
        let chosen = LuckyCombo::parse("1234").unwrap();
        let a = fallback_outcome(&mut StdRng::seed_from_u64(9), &chosen);
        let b = fallback_outcome(&mut StdRng::seed_from_u64(9), &chosen);
        assert_eq!(a, b);
    }
}
