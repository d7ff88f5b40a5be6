//! Session settings.
//!
//! Settings are grouped the way the settings surface presents them: game,
//! market, events, advanced. Every field has a documented default; loading
//! is forgiving — missing fields take their defaults, malformed numerics
//! are substituted with a warning rather than propagated as errors.
//!
//! JSON uses camelCase keys, e.g. `{"game": {"startingCash": 100000}}`.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use engine::FeePolicy;
use types::{Cash, Regime};

// =============================================================================
// Setting groups
// =============================================================================

/// Player-facing game parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Cash the account starts with.
    /// Default: 100000.0
    pub starting_cash: f64,

    /// Milliseconds between scheduler ticks.
    /// Default: 500
    #[serde(rename = "tickInterval")]
    pub tick_interval_ms: u64,

    /// Whether trades pay a fee.
    /// Default: false
    pub trading_fees_enabled: bool,

    /// Fee as a percentage of base cost.
    /// Default: 0.0
    pub trading_fee_percent: f64,

    /// Whether sells may exceed holdings (negative positions).
    /// Default: false
    pub allow_short_selling: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            starting_cash: 100_000.0,
            tick_interval_ms: 500,
            trading_fees_enabled: false,
            trading_fee_percent: 0.0,
            allow_short_selling: false,
        }
    }
}

/// Market-dynamics parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MarketConfig {
    /// Regime the session starts in.
    /// Default: Bull
    pub initial_regime: Regime,

    /// Global multiplier applied to every instrument's volatility.
    /// Default: 1.0
    pub volatility_multiplier: f64,

    /// Sentiment the session starts with, in [-1, 1].
    /// Default: 0.0
    pub initial_sentiment: f64,

    /// Per-tick probability of a memoryless regime redraw.
    /// Default: 0.05
    pub regime_change_probability: f64,

    /// Whether synthetic agent demand feeds into prices.
    /// Default: false
    pub enable_agent_trading: bool,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            initial_regime: Regime::Bull,
            volatility_multiplier: 1.0,
            initial_sentiment: 0.0,
            regime_change_probability: 0.05,
            enable_agent_trading: false,
        }
    }
}

/// News-event parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EventConfig {
    /// Whether catalog events can trigger at all.
    /// Default: true
    pub enabled: bool,

    /// Per-tick probability of surfacing the next catalog event.
    /// Default: 0.08
    pub event_probability: f64,

    /// Scales event price impacts.
    /// Default: 1.0
    pub impact_multiplier: f64,

    /// Whether surfaced events acknowledge themselves after a delay.
    /// Default: false
    pub auto_continue: bool,

    /// Seconds before an auto-continued event is acknowledged.
    /// Default: 5
    #[serde(rename = "autoContinueDelay")]
    pub auto_continue_delay_secs: u64,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            event_probability: 0.08,
            impact_multiplier: 1.0,
            auto_continue: false,
            auto_continue_delay_secs: 5,
        }
    }
}

/// Developer and tuning parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdvancedConfig {
    /// Extra logging for invariant clamps and internals.
    /// Default: false
    pub developer_mode: bool,

    /// Per-tick debug output.
    /// Default: false
    pub show_debug_info: bool,

    /// History records kept per instrument (0 = unlimited).
    /// Default: 0
    pub max_history_points: usize,

    /// Seed for the session's random stream. `None` draws from OS entropy.
    /// Default: None
    pub random_seed: Option<u64>,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            developer_mode: false,
            show_debug_info: false,
            max_history_points: 0,
            random_seed: None,
        }
    }
}

// =============================================================================
// GameSettings
// =============================================================================

/// The full settings surface.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameSettings {
    pub game: GameConfig,
    pub market: MarketConfig,
    pub events: EventConfig,
    pub advanced: AdvancedConfig,
}

/// Error from an explicit settings load; callers normally degrade to
/// defaults instead of propagating it.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "failed to read settings: {}", e),
            SettingsError::Parse(e) => write!(f, "failed to parse settings: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

fn substitute(value: &mut f64, in_range: bool, default: f64, name: &str, fixes: &mut usize) {
    if !value.is_finite() || !in_range {
        warn!(
            setting = name,
            found = *value,
            default,
            "invalid setting substituted with default"
        );
        *value = default;
        *fixes += 1;
    }
}

impl GameSettings {
    /// Load settings from a JSON file, substituting full defaults when the
    /// file is missing or malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::try_load(path.as_ref()) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from a JSON file.
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(SettingsError::Io)?;
        serde_json::from_str(&raw).map_err(SettingsError::Parse)
    }

    /// Replace out-of-range or non-finite numerics with their documented
    /// defaults, warning per substitution. Returns the substitution count.
    pub fn sanitize(&mut self) -> usize {
        let mut fixes = 0;

        let v = self.game.starting_cash;
        substitute(
            &mut self.game.starting_cash,
            v >= 0.0,
            100_000.0,
            "game.startingCash",
            &mut fixes,
        );

        if self.game.tick_interval_ms == 0 {
            warn!(setting = "game.tickInterval", "invalid setting substituted with default");
            self.game.tick_interval_ms = 500;
            fixes += 1;
        }

        let v = self.game.trading_fee_percent;
        substitute(
            &mut self.game.trading_fee_percent,
            (0.0..=100.0).contains(&v),
            0.0,
            "game.tradingFeePercent",
            &mut fixes,
        );

        let v = self.market.volatility_multiplier;
        substitute(
            &mut self.market.volatility_multiplier,
            v > 0.0 && v <= 10.0,
            1.0,
            "market.volatilityMultiplier",
            &mut fixes,
        );

        let v = self.market.initial_sentiment;
        substitute(
            &mut self.market.initial_sentiment,
            (-1.0..=1.0).contains(&v),
            0.0,
            "market.initialSentiment",
            &mut fixes,
        );

        let v = self.market.regime_change_probability;
        substitute(
            &mut self.market.regime_change_probability,
            (0.0..=1.0).contains(&v),
            0.05,
            "market.regimeChangeProbability",
            &mut fixes,
        );

        let v = self.events.event_probability;
        substitute(
            &mut self.events.event_probability,
            (0.0..=1.0).contains(&v),
            0.08,
            "events.eventProbability",
            &mut fixes,
        );

        let v = self.events.impact_multiplier;
        substitute(
            &mut self.events.impact_multiplier,
            v >= 0.0 && v <= 10.0,
            1.0,
            "events.impactMultiplier",
            &mut fixes,
        );

        fixes
    }

    /// Sanitized copy.
    pub fn sanitized(mut self) -> Self {
        self.sanitize();
        self
    }

    /// Starting cash as a fixed-point value.
    pub fn starting_cash(&self) -> Cash {
        Cash::from_float(self.game.starting_cash)
    }

    /// Scheduler pacing interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.game.tick_interval_ms)
    }

    /// Fee policy for the ledger.
    pub fn fee_policy(&self) -> FeePolicy {
        FeePolicy {
            enabled: self.game.trading_fees_enabled,
            percent: self.game.trading_fee_percent,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
