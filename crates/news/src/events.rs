//! Event types for the news catalog.
//!
//! This module defines:
//! - [`SectorImpact`]: A single sector-targeted price/volatility impact
//! - [`NewsEvent`]: A catalog entry with impacts, sentiment shift, and
//!   significance
//!
//! Catalog JSON uses camelCase keys, e.g.:
//!
//! ```json
//! {
//!   "description": "Breakthrough in battery technology",
//!   "sectorImpacts": {
//!     "positive": [{ "sector": "Technology", "magnitude": 0.2, "volatility": 0.1 }],
//!     "negative": [{ "sector": "Energy", "magnitude": 0.1, "volatility": 0.05 }]
//!   },
//!   "deltaSentiment": 0.15,
//!   "significance": 0.7
//! }
//! ```

use serde::{Deserialize, Serialize};
use types::Sector;

// =============================================================================
// SectorImpact
// =============================================================================

/// A single sector-targeted impact carried by a news event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorImpact {
    /// Sector the impact applies to.
    pub sector: Sector,

    /// Price impact intensity (non-negative fraction; 0.2 moves prices
    /// by ±2% at impact multiplier 1.0).
    pub magnitude: f64,

    /// Volatility impact intensity (non-negative fraction added to the
    /// one-shot volatility multiplier).
    #[serde(default)]
    pub volatility: f64,
}

impl SectorImpact {
    /// Create a new sector impact. Negative intensities are clamped to 0.
    pub fn new(sector: Sector, magnitude: f64, volatility: f64) -> Self {
        Self {
            sector,
            magnitude: magnitude.max(0.0),
            volatility: volatility.max(0.0),
        }
    }
}

/// Positive and negative impact lists for one event.
///
/// An event may lift one sector while hitting another; a sector appearing
/// on both sides receives both effects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorImpacts {
    /// Sectors the event benefits.
    #[serde(default)]
    pub positive: Vec<SectorImpact>,

    /// Sectors the event hurts.
    #[serde(default)]
    pub negative: Vec<SectorImpact>,
}

impl SectorImpacts {
    /// First positive impact matching the sector, if any.
    pub fn positive_for(&self, sector: Sector) -> Option<&SectorImpact> {
        self.positive.iter().find(|i| i.sector == sector)
    }

    /// First negative impact matching the sector, if any.
    pub fn negative_for(&self, sector: Sector) -> Option<&SectorImpact> {
        self.negative.iter().find(|i| i.sector == sector)
    }

    /// Whether the sector is named on either side.
    pub fn touches(&self, sector: Sector) -> bool {
        self.positive_for(sector).is_some() || self.negative_for(sector).is_some()
    }
}

// =============================================================================
// NewsEvent
// =============================================================================

/// A market-moving news event from the ordered catalog.
///
/// Surfacing an event pauses the simulation for the player to read it;
/// acknowledging it applies `delta_sentiment` immediately and queues the
/// sector impacts as one-shot effects for the next price step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsEvent {
    /// Headline shown to the player.
    pub description: String,

    /// Per-sector price and volatility impacts.
    #[serde(default)]
    pub sector_impacts: SectorImpacts,

    /// Immediate shift applied to market sentiment on acknowledgement
    /// (-1.0 to +1.0).
    #[serde(default)]
    pub delta_sentiment: f64,

    /// How significant the event is (0.0 to 1.0), for display ordering.
    #[serde(default)]
    pub significance: f64,
}

impl NewsEvent {
    /// Create a new event with sentiment and significance clamped to range.
    pub fn new(
        description: impl Into<String>,
        sector_impacts: SectorImpacts,
        delta_sentiment: f64,
        significance: f64,
    ) -> Self {
        Self {
            description: description.into(),
            sector_impacts,
            delta_sentiment: delta_sentiment.clamp(-1.0, 1.0),
            significance: significance.clamp(0.0, 1.0),
        }
    }

    /// Whether the event impacts the given sector on either side.
    pub fn touches(&self, sector: Sector) -> bool {
        self.sector_impacts.touches(sector)
    }
}

// =============================================================================
// Tests
// =============================================================================
