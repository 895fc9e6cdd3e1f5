#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # tickq queue
//!
//! A tick-driven, single-threaded cooperative task scheduler for firmware.
//! Callers register a callback, a parameter blob and a relative delay; the
//! main loop calls [`TaskQueue::dispatch`] with the current tick and every
//! task whose deadline has passed runs once, earliest deadline first.
//!
//! ## Module Overview
//! - [`queue`]  – The fixed-capacity, deadline-ordered task arena.
//! - [`task`]   – Callback type, task handles and removed-task records.
//! - [`shared`] – Critical-section wrapper for queues touched by interrupts.
//! - [`config`] – Runtime queue configuration.
//! - [`stats`]  – Slot usage statistics.
//!
//! ```
//! use tickq_queue::{ManualClock, QueueConfig, TaskQueue, Tick};
//!
//! type Queue = TaskQueue<ManualClock, 8, 4>;
//!
//! fn blink(_queue: &mut Queue, params: &[u8]) {
//!     assert_eq!(params, [3]);
//! }
//!
//! let mut queue: Queue = TaskQueue::new(ManualClock::new(Tick::ZERO), QueueConfig::DEFAULT);
//! queue.schedule(blink, &[3], 50).unwrap();
//!
//! assert_eq!(queue.dispatch(Tick::new(40)), 0);
//! assert_eq!(queue.dispatch(Tick::new(50)), 1);
//! assert!(queue.is_empty());
//! ```

#[macro_use]
mod fmt;

pub mod config;
pub mod queue;
pub mod shared;
pub mod stats;
pub mod task;

pub use config::{QueueConfig, QueueConfigBuilder};
pub use queue::{Deadlines, TaskQueue};
pub use shared::SharedTaskQueue;
pub use stats::SlotStats;
pub use task::{Params, RemovedTask, TaskFn, TaskHandle};
pub use tickq_core::{
    ManualClock, SchedResult, ScheduleError, Tick, TickCounter, TickSource, MAX_DELAY_MS,
};

#[cfg(test)]
mod tests;
