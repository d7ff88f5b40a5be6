//! Synthetic agent demand.
//!
//! Three trader populations contribute additively per instrument:
//! fundamentalists compare price to `quality * 100`, chartists follow the
//! most recent one-step return, and noise traders add a small random
//! perturbation. The sum is scaled by sentiment and the current regime.
//! The result is unbounded by construction (typically within roughly
//! [-1, 1]) and is deliberately not clamped.

use std::collections::HashMap;

use rand::Rng;
use types::{Regime, Symbol};

use crate::instrument::Instrument;

/// Fundamentalist contribution when price is below/above fundamental value.
const FUNDAMENTALIST_STEP: f64 = 0.3;

/// Chartist contribution when the recent return crosses the threshold.
const CHARTIST_STEP: f64 = 0.2;

/// Return threshold the chartists react to (±2%).
const CHARTIST_THRESHOLD: f64 = 0.02;

/// Half-width of the noise-trader perturbation.
const NOISE_HALF_WIDTH: f64 = 0.05;

/// Demand signal for a single instrument.
pub fn demand_for<R: Rng + ?Sized>(
    rng: &mut R,
    instrument: &Instrument,
    sentiment: f64,
    regime: Regime,
) -> f64 {
    let mut demand = 0.0;

    let price = instrument.price.to_float();
    let fundamental = instrument.fundamental_value();
    if price < fundamental {
        demand += FUNDAMENTALIST_STEP;
    } else if price > fundamental {
        demand -= FUNDAMENTALIST_STEP;
    }

    let recent_return = instrument.recent_return();
    if recent_return > CHARTIST_THRESHOLD {
        demand += CHARTIST_STEP;
    } else if recent_return < -CHARTIST_THRESHOLD {
        demand -= CHARTIST_STEP;
    }

    demand += (rng.random::<f64>() - 0.5) * 2.0 * NOISE_HALF_WIDTH;

    demand *= 1.0 + sentiment * 0.5;
    demand *= match regime {
        Regime::Bull => 1.2,
        Regime::Bear => 0.8,
        Regime::Volatile => rng.random_range(0.8..1.2),
    };

    demand
}

/// Demand signals for the whole roster, keyed by symbol.
pub fn compute_demand<R: Rng + ?Sized>(
    rng: &mut R,
    instruments: &[Instrument],
    sentiment: f64,
    regime: Regime,
) -> HashMap<Symbol, f64> {
    instruments
        .iter()
        .map(|i| (i.symbol.clone(), demand_for(rng, i, sentiment, regime)))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::generate_roster;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use types::Price;

    fn cheap_instrument() -> Instrument {
        let mut instr = generate_roster(&mut StdRng::seed_from_u64(1)).remove(0);
        // TECH has quality 0.8, so fundamental value is 80.
        instr.price = Price::from_float(40.0);
        instr.history.clear();
        instr
    }

    #[test]
    fn test_fundamentalists_buy_below_value() {
        let mut rng = StdRng::seed_from_u64(2);
        let instr = cheap_instrument();

        // Noise is within ±0.05 and Bull scales by 1.2, so the
        // fundamentalist +0.3 dominates.
        for _ in 0..100 {
            let d = demand_for(&mut rng, &instr, 0.0, Regime::Bull);
            assert!(d > 0.0, "demand {} should be positive", d);
        }
    }

    #[test]
    fn test_fundamentalists_sell_above_value() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut instr = cheap_instrument();
        instr.price = Price::from_float(120.0);

        for _ in 0..100 {
            let d = demand_for(&mut rng, &instr, 0.0, Regime::Bull);
            assert!(d < 0.0, "demand {} should be negative", d);
        }
    }

    #[test]
    fn test_chartists_follow_momentum() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut instr = cheap_instrument();

        // Price exactly at fundamental value removes the fundamentalist
        // term; a +3% move triggers the chartist +0.2.
        instr.price = Price::from_float(77.67);
        instr.push_history(1, 0, 0);
        instr.price = Price::from_float(80.0);
        instr.push_history(2, 0, 0);

        for _ in 0..100 {
            let d = demand_for(&mut rng, &instr, 0.0, Regime::Bull);
            assert!(d > 0.0, "demand {} should follow momentum", d);
        }
    }

    #[test]
    fn test_regime_scales_demand() {
        let instr = cheap_instrument();

        // Same RNG stream for both regimes keeps the noise draw identical.
        let bull = demand_for(&mut StdRng::seed_from_u64(7), &instr, 0.0, Regime::Bull);
        let bear = demand_for(&mut StdRng::seed_from_u64(7), &instr, 0.0, Regime::Bear);

        assert!(bull > bear);
        assert!((bull / 1.2 - bear / 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_sentiment_scales_demand() {
        let instr = cheap_instrument();

        let neutral = demand_for(&mut StdRng::seed_from_u64(9), &instr, 0.0, Regime::Bull);
        let euphoric = demand_for(&mut StdRng::seed_from_u64(9), &instr, 1.0, Regime::Bull);

        assert!((euphoric - neutral * 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_compute_demand_covers_roster() {
        let mut rng = StdRng::seed_from_u64(12);
        let roster = generate_roster(&mut rng);
        let demand = compute_demand(&mut rng, &roster, 0.1, Regime::Volatile);

        assert_eq!(demand.len(), roster.len());
        for instr in &roster {
            assert!(demand.contains_key(&instr.symbol));
        }
    }
}
