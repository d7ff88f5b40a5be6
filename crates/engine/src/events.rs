//! Two-phase news-event processing.
//!
//! Phase 1 (**trigger**): once per tick, before the price step, the event
//! at the catalog cursor may surface. Surfacing pauses the session and
//! leaves the cursor in place.
//!
//! Phase 2 (**acknowledge**): the player accepts the surfaced event. Its
//! sector impacts are converted into one-shot [`PendingEffects`] on every
//! instrument, its sentiment delta is returned for immediate application,
//! and the cursor advances. The effects fire on exactly the next price
//! step.

use rand::Rng;

use news::{EventCatalog, NewsEvent};

use crate::instrument::{Instrument, PendingEffects};

/// Holds the catalog cursor and the surfaced-but-unacknowledged event.
#[derive(Debug, Clone, Default)]
pub struct EventEffectProcessor {
    catalog: EventCatalog,
    surfaced: Option<NewsEvent>,
}

impl EventEffectProcessor {
    pub fn new(catalog: EventCatalog) -> Self {
        Self {
            catalog,
            surfaced: None,
        }
    }

    /// The event awaiting acknowledgement, if any.
    pub fn surfaced(&self) -> Option<&NewsEvent> {
        self.surfaced.as_ref()
    }

    /// Number of catalog events not yet consumed.
    pub fn remaining(&self) -> usize {
        self.catalog.remaining()
    }

    /// Whether the catalog has no further events to surface.
    pub fn is_exhausted(&self) -> bool {
        self.catalog.is_exhausted()
    }

    /// Phase 1: maybe surface the event at the cursor.
    ///
    /// Fires with probability `probability` when no event is already
    /// surfaced and the catalog is not exhausted. The cursor does not
    /// move. Returns the surfaced event for display.
    pub fn check_trigger<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        probability: f64,
    ) -> Option<&NewsEvent> {
        if self.surfaced.is_some() || self.catalog.is_exhausted() {
            return None;
        }
        if !rng.random_bool(probability.clamp(0.0, 1.0)) {
            return None;
        }
        self.surfaced = self.catalog.peek().cloned();
        self.surfaced.as_ref()
    }

    /// Phase 2: acknowledge the surfaced event.
    ///
    /// Writes the pending-effects slot on every instrument (identity
    /// effects where no sector matches), advances the cursor, and returns
    /// the event's sentiment delta. Returns `None` when nothing is
    /// surfaced.
    pub fn acknowledge(
        &mut self,
        instruments: &mut [Instrument],
        impact_multiplier: f64,
    ) -> Option<f64> {
        let event = self.surfaced.take()?;
        for instrument in instruments.iter_mut() {
            instrument.pending = Some(PendingEffects::for_event(
                &event,
                instrument.sector,
                impact_multiplier,
            ));
        }
        self.catalog.advance();
        Some(event.delta_sentiment)
    }

    /// Rewind the cursor and drop any surfaced event (session reset).
    pub fn reset(&mut self) {
        self.catalog.rewind();
        self.surfaced = None;
    }
}

// =============================================================================
// Tests
// =============================================================================
