//! Market training-game driver.
//!
//! Runs a [`MarketSession`] headless for a fixed number of ticks and prints
//! a closing summary. The session is ticked directly rather than through
//! the timer scheduler, so a 252-tick year finishes in milliseconds.
//!
//! ```text
//! settings.json ──┐
//!                 ├─> MarketSession ──> tick loop ──> summary table
//! news_events.json┘        │
//!                          └─ surfaced events: acknowledged immediately
//!                             with --auto-ack, otherwise the run stops
//! ```
//!
//! Both input files degrade gracefully: a missing or malformed settings
//! file falls back to defaults, a missing or malformed catalog runs the
//! market without news.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use news::EventCatalog;
use simulation::{GameSettings, MarketSession};

/// Market training-game simulation, headless.
#[derive(Parser, Debug)]
#[command(name = "market-gym")]
#[command(about = "Stochastic market simulation for the trading training game")]
#[command(version)]
struct Args {
    /// Ticks to simulate (252 = one trading year)
    #[arg(long, default_value_t = 252)]
    ticks: u64,

    /// Seed for a reproducible run (overrides the settings file)
    #[arg(long)]
    seed: Option<u64>,

    /// Settings file (JSON); defaults apply when absent
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// News event catalog (JSON); the market runs without news when absent
    #[arg(long, default_value = "assets/news_events.json")]
    catalog: PathBuf,

    /// Acknowledge surfaced news events immediately instead of stopping
    #[arg(long)]
    auto_ack: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut settings = GameSettings::load_or_default(&args.settings);
    if let Some(seed) = args.seed {
        settings.advanced.random_seed = Some(seed);
    }

    let catalog = match EventCatalog::load_json(&args.catalog) {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(path = %args.catalog.display(), error = %e, "running without news events");
            EventCatalog::empty()
        }
    };

    let mut session = MarketSession::new(settings, catalog);
    session.resume();

    info!(ticks = args.ticks, auto_ack = args.auto_ack, "starting run");
    let start = Instant::now();

    let mut events_seen = 0u64;
    for _ in 0..args.ticks {
        let outcome = session.advance_tick();
        if outcome.surfaced_event.is_some() {
            events_seen += 1;
            if args.auto_ack {
                session.acknowledge_event();
            } else {
                info!(
                    tick = outcome.tick,
                    "event awaiting acknowledgement, stopping (rerun with --auto-ack)"
                );
                break;
            }
        }
    }
    let elapsed = start.elapsed();

    print_summary(&session, events_seen, elapsed.as_secs_f64());
}

/// Closing report: one row per instrument, then the account line.
fn print_summary(session: &MarketSession, events_seen: u64, elapsed_secs: f64) {
    eprintln!();
    eprintln!("╔════════╤══════════════╤════════════╤═══════════╤════════╤══════════╗");
    eprintln!("║ Symbol │ Name         │ Sector     │     Price │    Vol │   Volume ║");
    eprintln!("╟────────┼──────────────┼────────────┼───────────┼────────┼──────────╢");
    for instrument in session.instruments() {
        let last_volume = instrument.history.last().map_or(0, |p| p.volume);
        eprintln!(
            "║ {:6} │ {:12} │ {:10} │ {:>9} │ {:>5.1}% │ {:>8} ║",
            instrument.symbol,
            instrument.name,
            instrument.sector.to_string(),
            instrument.price.to_string(),
            instrument.volatility * 100.0,
            last_volume,
        );
    }
    eprintln!("╚════════╧══════════════╧════════════╧═══════════╧════════╧══════════╝");
    eprintln!(
        "  Ticks: {:>5}  │  Sentiment: {:+.3}  │  Regime: {}",
        session.tick(),
        session.sentiment(),
        session.regime()
    );
    eprintln!(
        "  Cash: {}  │  Equity: {}  │  Events: {} surfaced, {} remaining",
        session.account().cash(),
        session.equity(),
        events_seen,
        session.events_remaining()
    );
    eprintln!("  Elapsed: {:.3}s", elapsed_secs);
}
