//! Ordered event catalog with an advancing cursor.
//!
//! Events are authored as a JSON array and consumed strictly front-to-back.
//! The cursor moves only on acknowledgement; surfacing an event leaves it in
//! place so the same entry is re-surfaced if the session is reset.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::events::NewsEvent;

// =============================================================================
// CatalogError
// =============================================================================

/// Errors from loading an event catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    Io(std::io::Error),
    /// The catalog file is not a valid JSON event array.
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(e) => write!(f, "failed to read event catalog: {}", e),
            CatalogError::Parse(e) => write!(f, "failed to parse event catalog: {}", e),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(e) => Some(e),
            CatalogError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e)
    }
}

// =============================================================================
// EventCatalog
// =============================================================================

/// An ordered sequence of news events consumed by an advancing cursor.
///
/// An empty or exhausted catalog is valid: the trigger check simply never
/// fires and the simulation runs event-free.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventCatalog {
    events: Vec<NewsEvent>,
    #[serde(default)]
    cursor: usize,
}

impl EventCatalog {
    /// Create an empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a catalog from an ordered event list.
    pub fn from_events(events: Vec<NewsEvent>) -> Self {
        Self { events, cursor: 0 }
    }

    /// Load a catalog from a JSON array file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let events: Vec<NewsEvent> = serde_json::from_str(&raw)?;
        Ok(Self::from_events(events))
    }

    /// The event at the cursor, without consuming it.
    pub fn peek(&self) -> Option<&NewsEvent> {
        self.events.get(self.cursor)
    }

    /// Advance the cursor past the current event.
    ///
    /// Returns the event that was consumed, or `None` if exhausted.
    pub fn advance(&mut self) -> Option<NewsEvent> {
        let event = self.events.get(self.cursor).cloned();
        if event.is_some() {
            self.cursor += 1;
        }
        event
    }

    /// Rewind the cursor to the start of the catalog.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Whether every event has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.events.len()
    }

    /// Total number of events in the catalog.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the catalog has no events at all.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events not yet consumed.
    pub fn remaining(&self) -> usize {
        self.events.len().saturating_sub(self.cursor)
    }

    /// Current cursor position.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

// =============================================================================
// Tests
// =============================================================================
