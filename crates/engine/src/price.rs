//! The stochastic price/volatility step.
//!
//! Each instrument advances independently per tick:
//! 1. draw correlated noise increments `dW1`, `dW2`
//! 2. volatility recurrence with mean reversion, floored at 0.01
//! 3. log-price step using the pre-update volatility
//! 4. demand impact, price floored at $0.01
//! 5. consume the pending event effects, if any (exactly once)
//! 6. global volatility multiplier, then the pending volatility
//!    multiplier, clamped to [0.01, 1.0]
//! 7. round the price to the cent

use rand::Rng;
use types::Price;

use crate::instrument::Instrument;
use crate::noise::{brownian_increment, DT};

/// Advance one instrument's price and volatility by one tick.
///
/// `volatility_multiplier` is the global setting; the one-shot event
/// multipliers come from the instrument's own pending slot, which is
/// cleared here. Returns the consumed event impact magnitude (0.0 when no
/// effects were pending) for the volume model.
pub fn advance_price<R: Rng + ?Sized>(
    instrument: &mut Instrument,
    demand: f64,
    volatility_multiplier: f64,
    rng: &mut R,
) -> f64 {
    let params = instrument.params;
    let vol = instrument.volatility;
    let price = instrument.price.to_float();

    let dw1 = brownian_increment(rng);
    let dw2 = params.correlation * dw1
        + (1.0 - params.correlation * params.correlation).sqrt() * brownian_increment(rng);

    let stepped_vol = (vol
        + params.mean_reversion * (params.long_term_vol - vol) * DT
        + params.vol_of_vol * vol.sqrt() * dw2)
        .max(0.01);
    let stepped_price = price * ((params.drift - 0.5 * vol) * DT + vol.sqrt() * dw1).exp();

    let mut new_price = (stepped_price * (1.0 + demand * 0.1)).max(0.01);

    // Consume-and-clear: the slot must never apply twice.
    let pending = instrument.pending.take();
    let mut impact = 0.0;
    if let Some(effects) = pending {
        new_price *= effects.price_multiplier;
        impact = effects.impact_magnitude;
    }

    let mut new_vol = stepped_vol * volatility_multiplier;
    if let Some(effects) = pending {
        new_vol *= effects.volatility_multiplier;
    }

    instrument.price = Price::from_float(new_price).max(Price::MIN_TICK);
    instrument.volatility = new_vol.clamp(0.01, 1.0);

    impact
}

// =============================================================================
// Tests
// =============================================================================
