//! Instruments: identity, mutable price/volatility state, and the one-shot
//! pending-effects slot written by acknowledged news events.

use rand::Rng;
use serde::{Deserialize, Serialize};

use news::NewsEvent;
use types::{Price, Sector, Symbol, Tick};

use crate::noise::normal;

// =============================================================================
// StochasticParams
// =============================================================================

/// Per-instrument parameters of the stochastic-volatility recurrence,
/// drawn once at roster creation and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticParams {
    /// Annual drift of the log price.
    pub drift: f64,
    /// Volatility of volatility.
    pub vol_of_vol: f64,
    /// Speed at which volatility reverts to its long-term level.
    pub mean_reversion: f64,
    /// Long-term volatility level.
    pub long_term_vol: f64,
    /// Correlation between the price and volatility noise terms.
    pub correlation: f64,
}

impl StochasticParams {
    /// Draw a fresh parameter set. Floors keep the recurrence stable;
    /// correlation stays in the leverage-effect range [-0.9, -0.3].
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            drift: normal(rng, 0.08, 0.03).max(0.01),
            vol_of_vol: normal(rng, 0.3, 0.1).max(0.1),
            mean_reversion: normal(rng, 2.0, 0.5).max(0.5),
            long_term_vol: normal(rng, 0.25, 0.05).max(0.1),
            correlation: normal(rng, -0.7, 0.2).clamp(-0.9, -0.3),
        }
    }
}

// =============================================================================
// PendingEffects
// =============================================================================

/// One-shot price/volatility adjustment queued by an acknowledged news
/// event, consumed by exactly the next price step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingEffects {
    /// Multiplier applied to the post-demand price.
    pub price_multiplier: f64,
    /// Multiplier applied to the post-step volatility.
    pub volatility_multiplier: f64,
    /// Largest matching impact magnitude, fed to the volume model.
    pub impact_magnitude: f64,
}

impl PendingEffects {
    /// Identity effects: the next price step is unaffected.
    pub fn identity() -> Self {
        Self {
            price_multiplier: 1.0,
            volatility_multiplier: 1.0,
            impact_magnitude: 0.0,
        }
    }

    /// Compute the effects an event has on an instrument in `sector`.
    ///
    /// The first positive-side and first negative-side impact matching the
    /// sector each contribute; a sector named on both sides receives both.
    pub fn for_event(event: &NewsEvent, sector: Sector, impact_multiplier: f64) -> Self {
        let mut effects = Self::identity();

        if let Some(pos) = event.sector_impacts.positive_for(sector) {
            effects.price_multiplier *= 1.0 + pos.magnitude * 0.1 * impact_multiplier;
            effects.volatility_multiplier *= 1.0 + pos.volatility;
            effects.impact_magnitude = effects.impact_magnitude.max(pos.magnitude);
        }

        if let Some(neg) = event.sector_impacts.negative_for(sector) {
            effects.price_multiplier *= 1.0 - neg.magnitude * 0.1 * impact_multiplier;
            effects.volatility_multiplier *= 1.0 + neg.volatility;
            effects.impact_magnitude = effects.impact_magnitude.max(neg.magnitude);
        }

        effects
    }
}

// =============================================================================
// PricePoint
// =============================================================================

/// One `(tick, price, volume)` record in an instrument's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub tick: Tick,
    pub price: Price,
    pub volume: u64,
}

// =============================================================================
// Instrument
// =============================================================================

/// A simulated stock: fixed identity plus mutable market state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Display name.
    pub name: String,
    /// Industry sector, targeted by news events.
    pub sector: Sector,
    /// Fixed quality score in [0,1]; fundamental value is `quality * 100`.
    pub quality: f64,

    /// Current price, rounded to the cent, never below $0.01.
    pub price: Price,
    /// Current volatility, in [0.01, 1.0].
    pub volatility: f64,
    /// Immutable stochastic parameters.
    pub params: StochasticParams,
    /// Reference daily volume drawn at creation.
    pub base_volume: u64,

    /// Append-only `(tick, price, volume)` history.
    pub history: Vec<PricePoint>,

    /// One-shot event effects awaiting the next price step.
    pub pending: Option<PendingEffects>,
}

impl Instrument {
    /// Fundamental value used by the fundamentalist demand component.
    pub fn fundamental_value(&self) -> f64 {
        self.quality * 100.0
    }

    /// Most recent one-step fractional return.
    ///
    /// The current price equals the last history entry, so the return is
    /// measured against the entry before it. Zero until two ticks exist.
    pub fn recent_return(&self) -> f64 {
        if self.history.len() < 2 {
            return 0.0;
        }
        let prev = self.history[self.history.len() - 2].price.to_float();
        (self.price.to_float() - prev) / prev
    }

    /// Append a history record, trimming from the front when
    /// `max_history_points` is non-zero.
    pub fn push_history(&mut self, tick: Tick, volume: u64, max_history_points: usize) {
        self.history.push(PricePoint {
            tick,
            price: self.price,
            volume,
        });
        if max_history_points > 0 && self.history.len() > max_history_points {
            let excess = self.history.len() - max_history_points;
            self.history.drain(..excess);
        }
    }
}

// =============================================================================
// Roster
// =============================================================================

/// The fixed company roster: (name, symbol, sector, quality).
const COMPANIES: [(&str, &str, Sector, f64); 12] = [
    ("TechCorp", "TECH", Sector::Technology, 0.8),
    ("MediCure", "MEDI", Sector::Healthcare, 0.7),
    ("FinanceFlow", "FINF", Sector::Finance, 0.6),
    ("EnergyMax", "ENMX", Sector::Energy, 0.5),
    ("ConsumeAll", "CONS", Sector::Consumer, 0.7),
    ("BuildTech", "BLTC", Sector::Industrial, 0.6),
    ("CloudNet", "CLNT", Sector::Technology, 0.9),
    ("HealthPlus", "HLTH", Sector::Healthcare, 0.8),
    ("BankSecure", "BNKS", Sector::Finance, 0.7),
    ("OilDrill", "OILD", Sector::Energy, 0.4),
    ("AirlineGo", "AIRG", Sector::Industrial, 0.6),
    ("RetailMax", "RETL", Sector::Consumer, 0.5),
];

/// Generate the full instrument roster with freshly drawn stochastic state:
/// initial price uniform $50-$150 rounded to cents, volatility uniform
/// 0.2-0.5, base volume uniform 1000-10000.
pub fn generate_roster<R: Rng + ?Sized>(rng: &mut R) -> Vec<Instrument> {
    COMPANIES
        .iter()
        .map(|&(name, symbol, sector, quality)| Instrument {
            symbol: symbol.to_string(),
            name: name.to_string(),
            sector,
            quality,
            price: Price::from_float(50.0 + rng.random::<f64>() * 100.0),
            volatility: 0.2 + rng.random::<f64>() * 0.3,
            params: StochasticParams::draw(rng),
            base_volume: (1000.0 + rng.random::<f64>() * 9000.0) as u64,
            history: Vec::new(),
            pending: None,
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use news::{SectorImpact, SectorImpacts};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_params_respect_floors() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..1000 {
            let p = StochasticParams::draw(&mut rng);
            assert!(p.drift >= 0.01);
            assert!(p.vol_of_vol >= 0.1);
            assert!(p.mean_reversion >= 0.5);
            assert!(p.long_term_vol >= 0.1);
            assert!((-0.9..=-0.3).contains(&p.correlation));
        }
    }

    #[test]
    fn test_roster_identities_and_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        let roster = generate_roster(&mut rng);

        assert_eq!(roster.len(), 12);
        assert_eq!(roster[0].symbol, "TECH");
        assert_eq!(roster[6].symbol, "CLNT");
        assert_eq!(roster[6].quality, 0.9);

        for instr in &roster {
            let price = instr.price.to_float();
            assert!((50.0..=150.0).contains(&price));
            assert!((0.2..0.5).contains(&instr.volatility));
            assert!((1000..10_000).contains(&instr.base_volume));
            assert!(instr.history.is_empty());
            assert!(instr.pending.is_none());
        }
    }

    #[test]
    fn test_seeded_roster_is_reproducible() {
        let a = generate_roster(&mut StdRng::seed_from_u64(5));
        let b = generate_roster(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_recent_return() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut instr = generate_roster(&mut rng).remove(0);

        assert_eq!(instr.recent_return(), 0.0);

        instr.price = Price::from_float(100.0);
        instr.push_history(1, 0, 0);
        instr.price = Price::from_float(102.0);
        instr.push_history(2, 0, 0);

        assert!((instr.recent_return() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_history_trim() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut instr = generate_roster(&mut rng).remove(0);

        for tick in 1..=10 {
            instr.push_history(tick, 100, 3);
        }
        assert_eq!(instr.history.len(), 3);
        assert_eq!(instr.history[0].tick, 8);

        // 0 means unlimited
        let mut unbounded = generate_roster(&mut rng).remove(0);
        for tick in 1..=10 {
            unbounded.push_history(tick, 100, 0);
        }
        assert_eq!(unbounded.history.len(), 10);
    }

    #[test]
    fn test_effects_for_matching_sectors() {
        let event = NewsEvent::new(
            "Battery breakthrough",
            SectorImpacts {
                positive: vec![SectorImpact::new(Sector::Technology, 0.2, 0.1)],
                negative: vec![SectorImpact::new(Sector::Energy, 0.1, 0.05)],
            },
            0.15,
            0.7,
        );

        let tech = PendingEffects::for_event(&event, Sector::Technology, 1.0);
        assert!((tech.price_multiplier - 1.02).abs() < 1e-12);
        assert!((tech.volatility_multiplier - 1.1).abs() < 1e-12);
        assert_eq!(tech.impact_magnitude, 0.2);

        let energy = PendingEffects::for_event(&event, Sector::Energy, 1.0);
        assert!((energy.price_multiplier - 0.99).abs() < 1e-12);
        assert_eq!(energy.impact_magnitude, 0.1);

        let finance = PendingEffects::for_event(&event, Sector::Finance, 1.0);
        assert_eq!(finance, PendingEffects::identity());
    }

    #[test]
    fn test_effects_scale_with_impact_multiplier() {
        let event = NewsEvent::new(
            "Sector rally",
            SectorImpacts {
                positive: vec![SectorImpact::new(Sector::Finance, 0.2, 0.0)],
                negative: vec![],
            },
            0.0,
            0.5,
        );

        let doubled = PendingEffects::for_event(&event, Sector::Finance, 2.0);
        assert!((doubled.price_multiplier - 1.04).abs() < 1e-12);
    }

    #[test]
    fn test_both_sides_compound() {
        let event = NewsEvent::new(
            "Mixed news for consumer staples",
            SectorImpacts {
                positive: vec![SectorImpact::new(Sector::Consumer, 0.3, 0.2)],
                negative: vec![SectorImpact::new(Sector::Consumer, 0.1, 0.1)],
            },
            0.0,
            0.5,
        );

        let effects = PendingEffects::for_event(&event, Sector::Consumer, 1.0);
        assert!((effects.price_multiplier - 1.03 * 0.99).abs() < 1e-12);
        assert!((effects.volatility_multiplier - 1.2 * 1.1).abs() < 1e-12);
        assert_eq!(effects.impact_magnitude, 0.3);
    }
}
