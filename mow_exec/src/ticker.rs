//! # Tick scheduler
//!
//! Fixed-period wake-up source for the control loop. A timer thread marks the
//! period boundaries and hands off to the control thread through a single-slot
//! channel; the timer thread itself never touches any control state.
//!
//! Guarantees:
//! - ticks never overlap: there is one consumer and it runs the tick to
//!   completion before waiting again;
//! - if the control thread overruns, the next wake is simply held in the slot
//!   and taken when the tick completes;
//! - missed periods are absorbed, not replayed: wakes are dropped while the
//!   slot is full and the timer re-aligns to the next future boundary, so a
//!   stall never produces a burst of catch-up ticks.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::sync::mpsc::{sync_channel, Receiver, TrySendError};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Fixed-period tick source.
///
/// Dropping the `Ticker` disconnects the channel and stops the timer thread.
pub struct Ticker {
    rx: Receiver<()>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum TickerError {
    #[error("Could not spawn the ticker thread: {0}")]
    SpawnError(std::io::Error),

    #[error("The ticker thread has stopped")]
    TickerStopped,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Ticker {
    /// Start a new ticker with the given period.
    pub fn start(period: Duration) -> Result<Self, TickerError> {
        let (tx, rx) = sync_channel::<()>(1);

        thread::Builder::new()
            .name("ticker".into())
            .spawn(move || {
                let mut deadline = Instant::now() + period;

                loop {
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    }

                    // Single-slot handoff. A full slot means the control
                    // thread has not consumed the previous wake yet, the new
                    // one is dropped rather than queued.
                    match tx.try_send(()) {
                        Ok(()) | Err(TrySendError::Full(())) => (),
                        Err(TrySendError::Disconnected(())) => break,
                    }

                    // Re-align to the next future boundary, skipping any
                    // periods missed outright
                    deadline += period;
                    let now = Instant::now();
                    while deadline <= now {
                        deadline += period;
                    }
                }
            })
            .map_err(TickerError::SpawnError)?;

        Ok(Self { rx })
    }

    /// Block until the next tick boundary.
    pub fn wait(&self) -> Result<(), TickerError> {
        self.rx.recv().map_err(|_| TickerError::TickerStopped)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_wakes_at_fixed_period() {
        let ticker = Ticker::start(Duration::from_millis(10)).unwrap();

        let start = Instant::now();
        for _ in 0..5 {
            ticker.wait().unwrap();
        }
        let elapsed = start.elapsed();

        // Five wakes at a 10ms period cannot arrive early
        assert!(elapsed >= Duration::from_millis(40), "elapsed {:?}", elapsed);
        // ...and a gross stall would mean the ticker is broken
        assert!(elapsed < Duration::from_millis(500), "elapsed {:?}", elapsed);
    }

    #[test]
    fn test_missed_periods_are_absorbed() {
        let ticker = Ticker::start(Duration::from_millis(10)).unwrap();
        ticker.wait().unwrap();

        // Stall the consumer across several periods
        thread::sleep(Duration::from_millis(55));

        // Exactly one wake was held in the slot while we were stalled...
        ticker.wait().unwrap();

        // ...so the next wait must block until a future boundary rather than
        // draining a backlog
        let start = Instant::now();
        ticker.wait().unwrap();
        assert!(
            start.elapsed() >= Duration::from_millis(2),
            "backlog of catch-up ticks detected"
        );
    }
}
