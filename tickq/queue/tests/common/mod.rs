//! Shared fixtures for the queue integration tests

#![allow(dead_code)]

use std::cell::RefCell;

use tickq_queue::{ManualClock, QueueConfig, TaskQueue, Tick};

pub type Queue = TaskQueue<ManualClock, 8, 4>;

thread_local! {
    static RAN: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

pub fn queue() -> Queue {
    queue_with(QueueConfig::DEFAULT)
}

pub fn queue_with(config: QueueConfig) -> Queue {
    TaskQueue::new(ManualClock::new(Tick::ZERO), config)
}

/// Callback that records the first byte of its parameters
pub fn log(_queue: &mut Queue, params: &[u8]) {
    record(params.first().copied().unwrap_or(0));
}

/// Second callback; its body differs from [`log`] so the two are never
/// folded into one symbol
pub fn log_other(_queue: &mut Queue, params: &[u8]) {
    record(0x80 | params.first().copied().unwrap_or(0));
}

pub fn record(id: u8) {
    RAN.with(|ran| ran.borrow_mut().push(id));
}

/// Drains the ids recorded on this thread
pub fn take_ran() -> Vec<u8> {
    RAN.with(|ran| std::mem::take(&mut *ran.borrow_mut()))
}
