//! Tick arithmetic and tick sources

use core::cell::Cell;
use core::fmt;

use critical_section::Mutex;

/// Half of the tick range; two ticks further apart than this are ambiguous
const HALF_RANGE: u32 = 1 << 31;

/// Longest relative delay, in milliseconds, that can be scheduled.
///
/// Deadlines are compared with wrapping arithmetic, so every pending deadline
/// must lie within half the tick range of the current tick.
///
/// The same bound applies to overdue work: the host must dispatch at least
/// once every 2^31 ms. A deadline more than that behind `now` reads as not
/// elapsed, and as the front task it holds back everything queued behind it
/// until the counter wraps round again.
pub const MAX_DELAY_MS: u32 = HALF_RANGE - 1;

/// Absolute point on the free-running millisecond timeline.
///
/// The counter wraps at `u32::MAX`; comparisons go through [`Tick::is_after`]
/// and [`Tick::has_elapsed`] so they stay correct across the wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tick(u32);

impl Tick {
    /// Zero tick
    pub const ZERO: Self = Self(0);

    /// Maximum tick value, one tick before the counter wraps
    pub const MAX: Self = Self(u32::MAX);

    /// Create a tick from a raw counter value
    pub const fn new(ticks: u32) -> Self {
        Self(ticks)
    }

    /// Get the raw counter value
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The tick `delay_ms` milliseconds from this one
    pub const fn offset(self, delay_ms: u32) -> Self {
        Self(self.0.wrapping_add(delay_ms))
    }

    /// Ticks elapsed since a previous tick
    pub const fn elapsed_since(self, previous: Tick) -> u32 {
        self.0.wrapping_sub(previous.0)
    }

    /// Check if this tick is strictly later than `other` (handles wraparound)
    pub const fn is_after(self, other: Tick) -> bool {
        let diff = self.0.wrapping_sub(other.0);
        diff != 0 && diff < HALF_RANGE
    }

    /// Check if this tick, taken as a deadline, is due at `now`.
    ///
    /// Only deadlines up to [`MAX_DELAY_MS`] behind `now` count as elapsed.
    pub const fn has_elapsed(self, now: Tick) -> bool {
        now.0.wrapping_sub(self.0) < HALF_RANGE
    }

    /// Milliseconds from `now` until this tick, zero once it has elapsed
    pub const fn until(self, now: Tick) -> u32 {
        if self.has_elapsed(now) {
            0
        } else {
            self.0.wrapping_sub(now.0)
        }
    }
}

impl From<u32> for Tick {
    fn from(ticks: u32) -> Self {
        Self(ticks)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick:{}", self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Tick {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "tick:{}", self.0);
    }
}

/// Monotonic millisecond counter owned by the host platform.
///
/// The scheduler reads it once per `schedule` call and never advances it.
pub trait TickSource {
    /// Current tick
    fn now(&self) -> Tick;
}

/// Any `Fn() -> Tick`, such as a HAL's `GetTick` or a closure over a timer
/// peripheral, is a tick source.
impl<F: Fn() -> Tick> TickSource for F {
    fn now(&self) -> Tick {
        self()
    }
}

/// Clock advanced explicitly by its owner.
///
/// Useful on hosts that drive the scheduler from simulated time and in tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: Cell<u32>,
}

impl ManualClock {
    /// Create a clock reading `start`
    pub const fn new(start: Tick) -> Self {
        Self {
            tick: Cell::new(start.0),
        }
    }

    /// Jump to an absolute tick
    pub fn set(&self, tick: Tick) {
        self.tick.set(tick.0);
    }

    /// Move forward by `ms` milliseconds, wrapping at the counter width
    pub fn advance(&self, ms: u32) -> Tick {
        let next = self.tick.get().wrapping_add(ms);
        self.tick.set(next);
        Tick(next)
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> Tick {
        Tick(self.tick.get())
    }
}

/// Free-running counter incremented from a periodic interrupt.
///
/// Reads and writes go through a critical section so the counter can live in
/// a `static` shared between the tick ISR and the main loop.
pub struct TickCounter {
    count: Mutex<Cell<u32>>,
}

impl TickCounter {
    /// Create a counter starting at zero
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Advance by one tick; call from the periodic tick interrupt
    pub fn increment(&self) {
        self.advance(1);
    }

    /// Advance by `ticks`
    pub fn advance(&self, ticks: u32) {
        critical_section::with(|cs| {
            let count = self.count.borrow(cs);
            count.set(count.get().wrapping_add(ticks));
        });
    }
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for TickCounter {
    fn now(&self) -> Tick {
        critical_section::with(|cs| Tick(self.count.borrow(cs).get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_wraps() {
        let tick = Tick::new(u32::MAX - 5);
        assert_eq!(tick.offset(10), Tick::new(4));
    }

    #[test]
    fn test_is_after_across_wrap() {
        let before = Tick::new(u32::MAX - 1);
        let after = before.offset(3);
        assert!(after.is_after(before));
        assert!(!before.is_after(after));
        assert!(!after.is_after(after));
    }

    #[test]
    fn test_has_elapsed() {
        let deadline = Tick::new(100);
        assert!(!deadline.has_elapsed(Tick::new(99)));
        assert!(deadline.has_elapsed(Tick::new(100)));
        assert!(deadline.has_elapsed(Tick::new(101)));

        let wrapped = Tick::new(u32::MAX).offset(5);
        assert!(!wrapped.has_elapsed(Tick::MAX));
        assert!(wrapped.has_elapsed(Tick::new(4)));
    }

    #[test]
    fn test_until() {
        let deadline = Tick::new(50);
        assert_eq!(deadline.until(Tick::new(20)), 30);
        assert_eq!(deadline.until(Tick::new(50)), 0);
        assert_eq!(deadline.until(Tick::new(70)), 0);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(Tick::new(10));
        assert_eq!(clock.now(), Tick::new(10));
        assert_eq!(clock.advance(5), Tick::new(15));
        clock.set(Tick::ZERO);
        assert_eq!(clock.now(), Tick::ZERO);
    }
}
