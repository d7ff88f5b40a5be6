//! Session orchestration for the market training game.
//!
//! This crate ties the engine's per-tick numerics into a playable session:
//! - **Settings**: the grouped configuration surface with forgiving loading
//! - **Session**: the single state aggregate advanced tick by tick
//! - **Scheduler**: the timer thread that paces a shared session
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use news::EventCatalog;
//! use simulation::{GameSettings, MarketSession, TickScheduler};
//!
//! let settings = GameSettings::load_or_default("settings.json");
//! let catalog = EventCatalog::load_json("news_events.json").unwrap_or_default();
//!
//! let session = Arc::new(Mutex::new(MarketSession::new(settings, catalog)));
//! session.lock().resume();
//!
//! let scheduler = TickScheduler::spawn(Arc::clone(&session));
//! // ... player commands through session.lock() ...
//! scheduler.shutdown();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod scheduler;
pub mod session;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use scheduler::TickScheduler;
pub use session::{MarketSession, TickOutcome};
pub use settings::{
    AdvancedConfig, EventConfig, GameConfig, GameSettings, MarketConfig, SettingsError,
};
