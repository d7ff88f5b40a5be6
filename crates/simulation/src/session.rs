//! The session aggregate: one struct owning every piece of mutable market
//! state, advanced by [`MarketSession::advance_tick`] and mutated
//! out-of-band by player commands.
//!
//! Tick phase order is fixed:
//!
//! ```text
//! tick += 1
//!   -> sentiment step
//!   -> regime redraw
//!   -> event trigger check      (surfacing pauses the session,
//!                                the tick still completes)
//!   -> agent demand
//!   -> per instrument: price/volatility (consuming pending effects),
//!                      volume, history append
//! ```
//!
//! The session holds its own seeded random stream; two sessions built with
//! the same seed, settings, and catalog replay identically.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use engine::{
    advance_price, compute_demand, execute_trade, generate_roster, generate_volume,
    redraw_regime, step_sentiment, Account, EventEffectProcessor, Instrument, TradeReceipt,
    TradeRejected,
};
use news::{EventCatalog, NewsEvent};
use types::{Cash, Price, Quantity, Regime, Tick, TradeSide};

use crate::settings::GameSettings;

/// What a single tick produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub tick: Tick,
    /// Event surfaced this tick, awaiting acknowledgement.
    pub surfaced_event: Option<NewsEvent>,
}

/// The full simulation state for one game session.
#[derive(Debug)]
pub struct MarketSession {
    settings: GameSettings,
    instruments: Vec<Instrument>,
    account: Account,
    events: EventEffectProcessor,
    sentiment: f64,
    regime: Regime,
    tick: Tick,
    running: bool,
    rng: StdRng,
}

impl MarketSession {
    /// Build a session from settings and a fetched event catalog.
    ///
    /// Settings are sanitized first. The session starts paused; call
    /// [`resume`](Self::resume) to let the scheduler tick it.
    pub fn new(settings: GameSettings, catalog: EventCatalog) -> Self {
        let settings = settings.sanitized();
        let mut rng = Self::seeded_rng(&settings);
        let instruments = generate_roster(&mut rng);

        Self {
            account: Account::new(settings.starting_cash()),
            events: EventEffectProcessor::new(catalog),
            sentiment: settings.market.initial_sentiment,
            regime: settings.market.initial_regime,
            tick: 0,
            running: false,
            instruments,
            rng,
            settings,
        }
    }

    fn seeded_rng(settings: &GameSettings) -> StdRng {
        match settings.advanced.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Tick pipeline
    // ─────────────────────────────────────────────────────────────────────

    /// Advance one tick. A paused session is a no-op.
    pub fn advance_tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome {
                tick: self.tick,
                surfaced_event: None,
            };
        }

        self.tick += 1;
        self.sentiment = step_sentiment(&mut self.rng, self.sentiment);
        self.regime = redraw_regime(
            &mut self.rng,
            self.regime,
            self.settings.market.regime_change_probability,
        );

        let surfaced_event = if self.settings.events.enabled {
            self.events
                .check_trigger(&mut self.rng, self.settings.events.event_probability)
                .cloned()
        } else {
            None
        };
        if let Some(event) = &surfaced_event {
            self.running = false;
            info!(tick = self.tick, description = %event.description, "news event surfaced");
        }

        let demand = if self.settings.market.enable_agent_trading {
            compute_demand(&mut self.rng, &self.instruments, self.sentiment, self.regime)
        } else {
            HashMap::new()
        };

        let vol_mult = self.settings.market.volatility_multiplier;
        let max_history = self.settings.advanced.max_history_points;
        let sentiment = self.sentiment;
        let developer_mode = self.settings.advanced.developer_mode;

        for instrument in self.instruments.iter_mut() {
            let d = demand.get(&instrument.symbol).copied().unwrap_or(0.0);
            let impact = advance_price(instrument, d, vol_mult, &mut self.rng);
            let volume =
                generate_volume(&mut self.rng, instrument.base_volume, d, impact, sentiment);
            instrument.push_history(self.tick, volume, max_history);

            if developer_mode && instrument.price == Price::MIN_TICK {
                warn!(symbol = %instrument.symbol, tick = self.tick, "price clamped at floor");
            }
        }

        if self.settings.advanced.show_debug_info {
            debug!(
                tick = self.tick,
                sentiment = self.sentiment,
                regime = %self.regime,
                "tick complete"
            );
        }

        TickOutcome {
            tick: self.tick,
            surfaced_event,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Player commands
    // ─────────────────────────────────────────────────────────────────────

    /// Suspend ticking.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resume ticking. Refused while an event awaits acknowledgement.
    pub fn resume(&mut self) -> bool {
        if self.events.surfaced().is_some() {
            return false;
        }
        self.running = true;
        true
    }

    /// Acknowledge the surfaced event: apply its sentiment delta, queue
    /// its one-shot effects for the next tick, advance the catalog cursor,
    /// and resume. Returns false when no event is surfaced.
    pub fn acknowledge_event(&mut self) -> bool {
        let impact_multiplier = self.settings.events.impact_multiplier;
        match self.events.acknowledge(&mut self.instruments, impact_multiplier) {
            Some(delta) => {
                self.sentiment = (self.sentiment + delta).clamp(-1.0, 1.0);
                self.running = true;
                info!(delta_sentiment = delta, "event acknowledged, effects queued");
                true
            }
            None => false,
        }
    }

    /// Execute a trade at the price of the last completed tick.
    pub fn submit_trade(
        &mut self,
        symbol: &str,
        side: TradeSide,
        shares: Quantity,
    ) -> Result<TradeReceipt, TradeRejected> {
        let result = execute_trade(
            &mut self.account,
            &self.instruments,
            symbol,
            side,
            shares,
            self.settings.fee_policy(),
            self.settings.game.allow_short_selling,
        );
        match &result {
            Ok(receipt) => info!(%receipt, "trade executed"),
            Err(reason) => debug!(%reason, symbol, "trade rejected"),
        }
        result
    }

    /// Adjust cash by a signed amount; the balance never goes below zero.
    pub fn add_funds(&mut self, amount: Cash) {
        self.account.add_funds(amount);
    }

    /// Discard all state and restart from the configured initial
    /// conditions: fresh roster and stochastic parameters, restored cash,
    /// rewound catalog, paused. A seeded session resets to an identical
    /// replay.
    pub fn reset(&mut self) {
        self.rng = Self::seeded_rng(&self.settings);
        self.instruments = generate_roster(&mut self.rng);
        self.account = Account::new(self.settings.starting_cash());
        self.events.reset();
        self.sentiment = self.settings.market.initial_sentiment;
        self.regime = self.settings.market.initial_regime;
        self.tick = 0;
        self.running = false;
        info!("session reset");
    }

    /// Swap in new settings (sanitized); applies from the next tick.
    pub fn update_settings(&mut self, settings: GameSettings) {
        self.settings = settings.sanitized();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read access
    // ─────────────────────────────────────────────────────────────────────

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn sentiment(&self) -> f64 {
        self.sentiment
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Event awaiting acknowledgement, if any.
    pub fn surfaced_event(&self) -> Option<&NewsEvent> {
        self.events.surfaced()
    }

    /// Catalog events not yet consumed.
    pub fn events_remaining(&self) -> usize {
        self.events.remaining()
    }

    /// Cash plus mark-to-market portfolio value.
    pub fn equity(&self) -> Cash {
        self.account.equity(&self.instruments)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_settings(seed: u64) -> GameSettings {
        let mut settings = GameSettings::default();
        settings.advanced.random_seed = Some(seed);
        settings
    }

    fn quiet_session(seed: u64) -> MarketSession {
        let mut settings = seeded_settings(seed);
        settings.events.enabled = false;
        MarketSession::new(settings, EventCatalog::empty())
    }

    #[test]
    fn test_session_starts_paused() {
        let mut session = quiet_session(1);
        assert!(!session.is_running());

        let outcome = session.advance_tick();
        assert_eq!(outcome.tick, 0);
        assert_eq!(session.tick(), 0);
    }

    #[test]
    fn test_tick_advances_state() {
        let mut session = quiet_session(2);
        session.resume();

        let outcome = session.advance_tick();
        assert_eq!(outcome.tick, 1);
        assert!(outcome.surfaced_event.is_none());

        for instrument in session.instruments() {
            assert_eq!(instrument.history.len(), 1);
            assert_eq!(instrument.history[0].tick, 1);
        }
    }

    #[test]
    fn test_seeded_sessions_replay_identically() {
        let mut a = quiet_session(99);
        let mut b = quiet_session(99);
        a.resume();
        b.resume();

        for _ in 0..100 {
            a.advance_tick();
            b.advance_tick();
        }

        assert_eq!(a.instruments(), b.instruments());
        assert_eq!(a.sentiment(), b.sentiment());
        assert_eq!(a.regime(), b.regime());
    }

    #[test]
    fn test_reset_restores_initial_conditions() {
        let mut session = quiet_session(7);
        session.resume();
        for _ in 0..20 {
            session.advance_tick();
        }
        session
            .submit_trade("TECH", TradeSide::Buy, Quantity(10))
            .unwrap();

        let initial_prices: Vec<Price> = {
            let fresh = quiet_session(7);
            fresh.instruments().iter().map(|i| i.price).collect()
        };

        session.reset();
        assert_eq!(session.tick(), 0);
        assert!(!session.is_running());
        assert_eq!(session.account().cash(), Cash::from_float(100_000.0));
        assert_eq!(session.account().position("TECH"), 0);
        let reset_prices: Vec<Price> = session.instruments().iter().map(|i| i.price).collect();
        assert_eq!(reset_prices, initial_prices);
    }

    #[test]
    fn test_add_funds_floors_at_zero() {
        let mut session = quiet_session(3);
        session.add_funds(Cash::from_float(-200_000.0));
        assert_eq!(session.account().cash(), Cash::ZERO);
    }

    #[test]
    fn test_trade_uses_last_tick_price() {
        let mut session = quiet_session(5);
        session.resume();
        session.advance_tick();

        let price = session.instruments()[0].price;
        let receipt = session
            .submit_trade("TECH", TradeSide::Buy, Quantity(3))
            .unwrap();
        assert_eq!(receipt.price, price);
        // History untouched by the trade.
        assert_eq!(session.instruments()[0].history.len(), 1);
    }
}
