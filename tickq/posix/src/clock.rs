//! Tick sources for POSIX hosts
//!
//! Uses monotonic clocks so wall-clock adjustments never move deadlines.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tickq_core::{Tick, TickCounter, TickSource};

/// Milliseconds elapsed since the clock was created, wrapped to the tick width
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    start: Instant,
    offset: Tick,
}

impl StdClock {
    /// Clock reading zero now
    pub fn new() -> Self {
        Self::starting_at(Tick::ZERO)
    }

    /// Clock reading `tick` now
    pub fn starting_at(tick: Tick) -> Self {
        Self {
            start: Instant::now(),
            offset: tick,
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for StdClock {
    fn now(&self) -> Tick {
        // Truncation is the counter wrapping
        self.offset.offset(self.start.elapsed().as_millis() as u32)
    }
}

/// Thread that increments a [`TickCounter`] once per period, standing in for
/// the periodic tick interrupt of a microcontroller.
///
/// Sleeps until absolute tick times rather than for relative durations, so
/// the counter does not drift. Stops when dropped.
pub struct Ticker {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Start ticking `counter` every `period`
    ///
    /// # Panics
    ///
    /// Panics if `period` is zero.
    pub fn spawn(counter: &'static TickCounter, period: Duration) -> Self {
        assert!(!period.is_zero(), "Tick period must be greater than 0");

        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let thread = thread::spawn(move || {
            let mut next_tick = Instant::now();
            while flag.load(Ordering::Relaxed) {
                next_tick += period;
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                }
                counter.increment();
            }
        });
        log::debug!("ticker started, period {:?}", period);

        Self {
            running,
            thread: Some(thread),
        }
    }

    /// Stop the ticker thread and wait for it to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread.take() {
            match handle.join() {
                Ok(()) => log::debug!("ticker stopped"),
                Err(_) => log::warn!("ticker thread panicked"),
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
