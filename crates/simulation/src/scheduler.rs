//! Timer-driven tick scheduler.
//!
//! One background thread paces the session: every `tickInterval` it takes
//! the session lock and, if the session is running, advances exactly one
//! tick. The lock serializes ticks with player commands, so a trade never
//! observes a half-updated instrument and no two ticks overlap.
//!
//! Shutdown is a message, not a flag: [`TickScheduler::shutdown`] sends on
//! a channel the loop waits on, so teardown is prompt and deterministic.
//! When `autoContinue` is on, a surfaced event is acknowledged by the
//! scheduler itself after the configured delay.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::debug;

use crate::session::MarketSession;

/// Handle to the scheduler thread.
pub struct TickScheduler {
    shutdown_tx: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TickScheduler {
    /// Start the scheduler thread over a shared session.
    ///
    /// The session keeps ultimate say: a paused session makes the
    /// scheduler idle without consuming it.
    pub fn spawn(session: Arc<Mutex<MarketSession>>) -> Self {
        let (shutdown_tx, shutdown_rx) = bounded(1);
        let handle = thread::Builder::new()
            .name("tick-scheduler".to_string())
            .spawn(move || run_loop(session, shutdown_rx))
            .expect("failed to spawn scheduler thread");

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    /// Stop issuing ticks and join the thread. An in-progress tick always
    /// completes first.
    pub fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TickScheduler {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_loop(session: Arc<Mutex<MarketSession>>, shutdown_rx: Receiver<()>) {
    // When an auto-continued event is surfaced, acknowledge it at this
    // instant.
    let mut auto_ack_due: Option<Instant> = None;

    loop {
        let interval = session.lock().settings().tick_interval();
        match shutdown_rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        let mut session = session.lock();
        if session.is_running() {
            let outcome = session.advance_tick();
            if outcome.surfaced_event.is_some() && session.settings().events.auto_continue {
                let delay = Duration::from_secs(session.settings().events.auto_continue_delay_secs);
                auto_ack_due = Some(Instant::now() + delay);
            }
        } else if let Some(due) = auto_ack_due {
            if Instant::now() >= due {
                auto_ack_due = None;
                if session.acknowledge_event() {
                    debug!("auto-continue acknowledged surfaced event");
                }
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
