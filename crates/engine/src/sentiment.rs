//! Market-wide sentiment and regime evolution.
//!
//! Sentiment follows a mean-reverting stochastic process clamped to
//! [-1, 1]. The regime is redrawn memorylessly: each tick, with the
//! configured probability, a fresh uniform draw over the three regimes
//! replaces the current one (and may repeat it).

use rand::Rng;
use types::Regime;

use crate::noise::{brownian_increment, DT};

/// Speed at which sentiment reverts to the long-term mean.
const REVERSION_SPEED: f64 = 0.5;

/// Long-term sentiment mean.
const LONG_TERM_MEAN: f64 = 0.0;

/// Volatility of the sentiment noise term.
const NOISE_VOL: f64 = 0.1;

/// Advance sentiment one step, clamped to [-1, 1].
pub fn step_sentiment<R: Rng + ?Sized>(rng: &mut R, sentiment: f64) -> f64 {
    let dw = brownian_increment(rng);
    let next = sentiment + REVERSION_SPEED * (LONG_TERM_MEAN - sentiment) * DT + NOISE_VOL * dw;
    next.clamp(-1.0, 1.0)
}

/// Redraw the regime with probability `change_probability`.
pub fn redraw_regime<R: Rng + ?Sized>(
    rng: &mut R,
    current: Regime,
    change_probability: f64,
) -> Regime {
    if rng.random_bool(change_probability.clamp(0.0, 1.0)) {
        let all = Regime::all();
        all[rng.random_range(0..all.len())]
    } else {
        current
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sentiment_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut sentiment = 0.95;
        for _ in 0..10_000 {
            sentiment = step_sentiment(&mut rng, sentiment);
            assert!((-1.0..=1.0).contains(&sentiment));
        }
    }

    #[test]
    fn test_sentiment_reverts_toward_zero() {
        // Average many paths from a strongly positive start; the mean
        // must drift down toward the long-term mean.
        let mut rng = StdRng::seed_from_u64(23);
        let paths = 200;
        let steps = 2_000;
        let mut total = 0.0;
        for _ in 0..paths {
            let mut s = 0.9;
            for _ in 0..steps {
                s = step_sentiment(&mut rng, s);
            }
            total += s;
        }
        let mean = total / paths as f64;
        assert!(mean < 0.5, "mean {} did not revert", mean);
    }

    #[test]
    fn test_regime_redraw_frequency() {
        let mut rng = StdRng::seed_from_u64(31);
        let p = 0.05;
        let trials = 100_000;
        let mut switched = 0;
        for _ in 0..trials {
            if redraw_regime(&mut rng, Regime::Bull, p) != Regime::Bull {
                switched += 1;
            }
        }
        // A redraw lands back on the current regime 1/3 of the time, so
        // observable switches happen at rate p * 2/3.
        let observed = switched as f64 / trials as f64;
        let expected = p * 2.0 / 3.0;
        assert!(
            (observed - expected).abs() < 0.005,
            "observed {} expected {}",
            observed,
            expected
        );
    }

    #[test]
    fn test_regime_never_changes_at_zero_probability() {
        let mut rng = StdRng::seed_from_u64(37);
        for _ in 0..1_000 {
            assert_eq!(redraw_regime(&mut rng, Regime::Bear, 0.0), Regime::Bear);
        }
    }

    #[test]
    fn test_regime_probability_clamped() {
        // Out-of-range probabilities must not panic.
        let mut rng = StdRng::seed_from_u64(41);
        redraw_regime(&mut rng, Regime::Bull, 1.5);
        redraw_regime(&mut rng, Regime::Bull, -0.5);
    }
}
