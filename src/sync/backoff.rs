// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Jittered exponential backoff for sync retries.

use crate::constants::sync::{JITTER_HIGH, JITTER_LOW};
use rand::Rng;
use std::time::Duration;

/// Delay before retry number `retry_count`.
///
/// The exponential term is `max(base, base * 2^(retry_count - 1))`; the
/// result is drawn uniformly between 80% and 120% of it.
pub fn retry_delay<R: Rng + ?Sized>(base: Duration, retry_count: u32, rng: &mut R) -> Duration {
    let base_ms = u64::try_from(base.as_millis()).unwrap_or(u64::MAX);
    let factor = retry_count
        .checked_sub(1)
        .and_then(|exponent| 1u64.checked_shl(exponent))
        .unwrap_or(if retry_count == 0 { 1 } else { u64::MAX });
    let delta = base_ms.saturating_mul(factor).max(base_ms) as f64;

    let low = delta * JITTER_LOW;
    let high = delta * JITTER_HIGH;
    if high <= low {
        return Duration::from_millis(low as u64);
    }

    Duration::from_millis(rng.gen_range(low..high) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const BASE: Duration = Duration::from_secs(10);

    fn assert_within(delay: Duration, low_secs: u64, high_secs: u64) {
        assert!(
            delay >= Duration::from_secs(low_secs) && delay <= Duration::from_secs(high_secs),
            "{:?} not within [{}, {}]s",
            delay,
            low_secs,
            high_secs
        );
    }

    #[test]
    fn test_first_retries_follow_exponential_bands() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            assert_within(retry_delay(BASE, 1, &mut rng), 8, 12);
            assert_within(retry_delay(BASE, 2, &mut rng), 16, 24);
            assert_within(retry_delay(BASE, 3, &mut rng), 32, 48);
        }
    }

    #[test]
    fn test_zero_retries_floors_at_base() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_within(retry_delay(BASE, 0, &mut rng), 8, 12);
    }

    #[test]
    fn test_large_retry_counts_saturate() {
        let mut rng = StdRng::seed_from_u64(3);
        let delay = retry_delay(BASE, 200, &mut rng);
        assert!(delay > Duration::from_secs(10_000));
    }

    #[test]
    fn test_zero_base_is_zero() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(retry_delay(Duration::ZERO, 4, &mut rng), Duration::ZERO);
    }

    #[test]
    fn test_jitter_spreads_delays() {
        let mut rng = StdRng::seed_from_u64(11);
        let delays: Vec<_> = (0..20).map(|_| retry_delay(BASE, 2, &mut rng)).collect();
        assert!(delays.iter().any(|d| *d != delays[0]));
    }
}
