//! Shared noise sources for the stochastic updates.
//!
//! All price, volatility, and sentiment updates draw the same
//! uniform-derived increment `u*sqrt(dt) - sqrt(dt)/2`. Its variance is
//! `dt/12` rather than the `dt` a Brownian increment would have; the
//! recurrences downstream are calibrated against this exact source, so it
//! is kept as-is.

use rand::Rng;

/// Time step per tick: one trading day out of 252.
pub const DT: f64 = 1.0 / 252.0;

/// Zero-mean uniform-derived noise increment scaled by `sqrt(DT)`.
pub fn brownian_increment<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>() * DT.sqrt() - DT.sqrt() / 2.0
}

/// Box-Muller normal sample, used for drawing per-instrument stochastic
/// parameters at roster creation.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u: f64 = rng.random();
    let v: f64 = rng.random();
    let z = (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos();
    z * std_dev + mean
}

// =============================================================================
// Tests
// =============================================================================
