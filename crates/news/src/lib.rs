//! News-event catalog for the market training game.
//!
//! This crate provides:
//! - **Events**: Market-moving news with per-sector impacts and a market
//!   sentiment shift
//! - **Catalog**: An ordered sequence of events consumed front-to-back by
//!   an advancing cursor
//!
//! # Event Lifecycle
//!
//! ```text
//! catalog[cursor]  --trigger-->  surfaced (sim pauses, cursor unchanged)
//! surfaced         --acknowledge-->  effects queued, cursor advances
//! queued effects   --next tick-->  applied once to prices, then cleared
//! ```
//!
//! The catalog is loaded from JSON at startup. A failed load degrades to an
//! empty catalog: the simulation runs, no events ever trigger.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod events;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{CatalogError, EventCatalog};
pub use events::{NewsEvent, SectorImpact, SectorImpacts};
