//! Market numerics for the training-game simulation.
//!
//! This crate implements the per-tick state transitions and the trading
//! ledger. The pieces compose in a fixed order each tick:
//!
//! ```text
//! sentiment step ─> regime redraw ─> event trigger check
//!       │
//!       v
//! agent demand ─> price/volatility step ─> volume ─> history append
//!                 (consumes any pending
//!                  one-shot event effects)
//! ```
//!
//! Everything stochastic takes `&mut impl Rng`, so callers own the seed and
//! tests can substitute a fixed source. The ledger operates out-of-band
//! against the same instrument and account state.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod demand;
pub mod events;
pub mod instrument;
pub mod ledger;
pub mod noise;
pub mod price;
pub mod sentiment;
pub mod volume;

// =============================================================================
// Re-exports
// =============================================================================

pub use demand::compute_demand;
pub use events::EventEffectProcessor;
pub use instrument::{generate_roster, Instrument, PendingEffects, PricePoint, StochasticParams};
pub use ledger::{execute_trade, Account, FeePolicy, TradeReceipt, TradeRejected};
pub use noise::{brownian_increment, DT};
pub use price::advance_price;
pub use sentiment::{redraw_regime, step_sentiment};
pub use volume::generate_volume;
