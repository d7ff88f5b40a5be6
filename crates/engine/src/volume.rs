//! Reported trade volume.
//!
//! Volume is derived, not simulated: base volume jittered by ±20%, then
//! amplified by agent activity, event impact, and sentiment intensity.

use rand::Rng;

/// Volume for one instrument for one tick.
///
/// `event_impact` is the impact magnitude consumed from the pending
/// effects this tick (0.0 when none).
pub fn generate_volume<R: Rng + ?Sized>(
    rng: &mut R,
    base_volume: u64,
    demand: f64,
    event_impact: f64,
    sentiment: f64,
) -> u64 {
    let mut volume = base_volume as f64 * rng.random_range(0.8..1.2);
    volume *= 1.0 + demand.abs() * 2.0;
    volume *= 1.0 + event_impact * 3.0;
    volume *= 1.0 + sentiment.abs() * 0.5;
    volume.round().max(0.0) as u64
}

// =============================================================================
// Tests
// =============================================================================
