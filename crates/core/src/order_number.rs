//! Human-readable order number format and candidate generation.
//!
//! Format: `CMD` + YYMMDD + 3-digit random + 2-digit counter, e.g.
//! `CMD25081442002` for the third retry (counter 02) of draw 420 on
//! 2025-08-14. The orders repository walks the candidate sequence and keeps
//! the first number not already taken; the unique constraint on
//! `orders.order_number` remains the safety net against concurrent inserts.
//!
//! The retry loop is bounded: for each random draw the counter runs 0..=99,
//! and at most [`MAX_RANDOM_DRAWS`] draws are attempted before giving up
//! with [`OrderNumberExhausted`].

use chrono::NaiveDate;

/// Prefix for every order number.
pub const PREFIX: &str = "CMD";

/// How many values the 2-digit retry counter can take.
pub const COUNTER_SPAN: u8 = 100;

/// How many random draws to walk before giving up.
pub const MAX_RANDOM_DRAWS: usize = 3;

/// Candidate space exhausted for the day; practically unreachable outside
/// of pathological load, but the loop must terminate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("could not find a free order number after {attempts} attempts")]
pub struct OrderNumberExhausted {
    pub attempts: usize,
}

/// Format a single candidate from its parts.
///
/// `random` is truncated to 3 digits and `counter` to 2.
#[must_use]
pub fn candidate(date: NaiveDate, random: u16, counter: u8) -> String {
    format!(
        "{PREFIX}{}{:03}{:02}",
        date.format("%y%m%d"),
        random % 1000,
        counter % COUNTER_SPAN
    )
}

/// The bounded candidate sequence for one order-creation attempt.
///
/// `randoms` supplies one 3-digit draw per pass (callers draw with `rand`;
/// tests pass fixed values). Yields `randoms.len() × 100` candidates:
/// counters 0..=99 for the first draw, then the next draw, and so on.
pub fn candidates(
    date: NaiveDate,
    randoms: &[u16],
) -> impl Iterator<Item = String> + use<> {
    let draws: Vec<u16> = randoms
        .iter()
        .take(MAX_RANDOM_DRAWS)
        .copied()
        .collect();
    draws.into_iter().flat_map(move |random| {
        (0..COUNTER_SPAN).map(move |counter| candidate(date, random, counter))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 14).expect("valid date")
    }

    #[test]
    fn test_candidate_format() {
        assert_eq!(candidate(date(), 420, 2), "CMD25081442002");
        assert_eq!(candidate(date(), 7, 0), "CMD25081400700");
    }

    #[test]
    fn test_candidate_truncates_parts() {
        // 4-digit random and 3-digit counter are folded into range
        assert_eq!(candidate(date(), 1420, 102), "CMD25081442002");
    }

    #[test]
    fn test_fixed_length() {
        for number in candidates(date(), &[0, 999]) {
            assert_eq!(number.len(), PREFIX.len() + 6 + 3 + 2);
            assert!(number.starts_with(PREFIX));
        }
    }

    #[test]
    fn test_sequence_counts_then_redraws() {
        let all: Vec<String> = candidates(date(), &[420, 421]).collect();
        assert_eq!(all.len(), 200);
        assert_eq!(all.first().map(String::as_str), Some("CMD25081442000"));
        assert_eq!(all.get(99).map(String::as_str), Some("CMD25081442099"));
        assert_eq!(all.get(100).map(String::as_str), Some("CMD25081442100"));
    }

    #[test]
    fn test_sequential_generation_never_repeats() {
        // Simulates the repository loop: keep the first free candidate,
        // mark it taken, repeat. No two orders share a number.
        let mut taken: HashSet<String> = HashSet::new();
        for draw in 0..50u16 {
            let number = candidates(date(), &[draw])
                .find(|c| !taken.contains(c))
                .expect("free candidate");
            assert!(taken.insert(number));
        }
        assert_eq!(taken.len(), 50);
    }

    #[test]
    fn test_draws_are_capped() {
        let over: Vec<u16> = (0..10).collect();
        let count = candidates(date(), &over).count();
        assert_eq!(count, MAX_RANDOM_DRAWS * usize::from(COUNTER_SPAN));
    }
}
