//! Interrupt-safe access to a task queue.
//!
//! [`TaskQueue`] assumes one thread of control. On targets where interrupt
//! handlers also schedule or cancel work, wrap the queue in a
//! [`SharedTaskQueue`]: every operation runs inside a critical section.

use core::cell::RefCell;

use critical_section::Mutex;
use tickq_core::{SchedResult, Tick, TickSource};

use crate::config::QueueConfig;
use crate::queue::TaskQueue;
use crate::task::{RemovedTask, TaskFn, TaskHandle};

/// A [`TaskQueue`] guarded by a critical section, usable from a `static`.
pub struct SharedTaskQueue<C, const N: usize, const P: usize> {
    inner: Mutex<RefCell<TaskQueue<C, N, P>>>,
}

impl<C, const N: usize, const P: usize> SharedTaskQueue<C, N, P> {
    /// Create a shared queue
    pub const fn new(clock: C, config: QueueConfig) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(TaskQueue::new(clock, config))),
        }
    }

    /// Run `f` with exclusive access to the queue
    pub fn with<R>(&self, f: impl FnOnce(&mut TaskQueue<C, N, P>) -> R) -> R {
        critical_section::with(|cs| f(&mut *self.inner.borrow_ref_mut(cs)))
    }

    /// See [`TaskQueue::cancel`]
    pub fn cancel(&self, callback: TaskFn<C, N, P>) -> Option<RemovedTask<C, N, P>> {
        self.with(|queue| queue.cancel(callback))
    }

    /// See [`TaskQueue::cancel_handle`]
    pub fn cancel_handle(&self, handle: TaskHandle<C, N, P>) -> Option<RemovedTask<C, N, P>> {
        self.with(|queue| queue.cancel_handle(handle))
    }

    /// Number of pending tasks
    pub fn count(&self) -> usize {
        self.with(|queue| queue.count())
    }

    /// Run every due task, as [`TaskQueue::dispatch`].
    ///
    /// The critical section is entered once per task and released in between,
    /// so pending interrupts are serviced between callbacks. A callback runs
    /// with the section held and must use the queue it is handed, not this
    /// wrapper.
    pub fn dispatch(&self, now: Tick) -> usize {
        let mut executed = 0;
        while self.with(|queue| queue.run_next(now)) {
            executed += 1;
        }
        executed
    }
}

impl<C: TickSource, const N: usize, const P: usize> SharedTaskQueue<C, N, P> {
    /// See [`TaskQueue::schedule`]
    pub fn schedule(
        &self,
        callback: TaskFn<C, N, P>,
        params: &[u8],
        delay_ms: u32,
    ) -> SchedResult<TaskHandle<C, N, P>> {
        self.with(|queue| queue.schedule(callback, params, delay_ms))
    }

    /// Dispatch at the clock's current tick
    pub fn poll(&self) -> usize {
        let now = self.with(|queue| queue.clock().now());
        self.dispatch(now)
    }
}
