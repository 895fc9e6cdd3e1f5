//! Tick source tests for tickq-core
//! These run on the host with the std critical-section implementation

use tickq_core::{ManualClock, Tick, TickCounter, TickSource, MAX_DELAY_MS};

static SYSTICK: TickCounter = TickCounter::new();

fn hal_get_tick() -> Tick {
    Tick::new(1234)
}

#[test]
fn test_tick_counter_increment() {
    let start = SYSTICK.now();
    for _ in 0..10 {
        SYSTICK.increment();
    }
    assert_eq!(SYSTICK.now().elapsed_since(start), 10);
}

#[test]
fn test_tick_counter_wraps() {
    let counter = TickCounter::new();
    counter.advance(u32::MAX);
    assert_eq!(counter.now(), Tick::MAX);
    counter.increment();
    assert_eq!(counter.now(), Tick::ZERO);
}

#[test]
fn test_fn_pointer_source() {
    let source: fn() -> Tick = hal_get_tick;
    assert_eq!(source.now(), Tick::new(1234));
}

fn read<S: TickSource>(source: S) -> Tick {
    source.now()
}

#[test]
fn test_closure_source() {
    let clock = ManualClock::new(Tick::new(7));
    let source = || clock.now();
    assert_eq!(read(&source), Tick::new(7));
    clock.advance(3);
    assert_eq!(read(source), Tick::new(10));
}

#[test]
fn test_closure_over_counter() {
    let counter = TickCounter::new();
    counter.advance(40);
    let offset = 2;
    let source = move || counter.now().offset(offset);
    assert_eq!(source.now(), Tick::new(42));
}

#[test]
fn test_max_delay_stays_ordered() {
    let now = Tick::new(u32::MAX - 100);
    let deadline = now.offset(MAX_DELAY_MS);
    assert!(deadline.is_after(now));
    assert!(!deadline.has_elapsed(now));
}

#[test]
fn test_deadline_overdue_past_half_range_reads_pending() {
    let deadline = Tick::new(100);
    assert!(deadline.has_elapsed(deadline.offset(MAX_DELAY_MS)));
    // Dispatching this late breaks the wrap-aware comparison
    assert!(!deadline.has_elapsed(deadline.offset(MAX_DELAY_MS + 1)));
    assert_eq!(deadline.until(deadline.offset(MAX_DELAY_MS + 1)), 1 << 31);
}
