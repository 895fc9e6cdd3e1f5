//! Task records exchanged between the queue and its callers

use core::fmt;

use tickq_core::Tick;

use crate::queue::TaskQueue;

/// Owned, exact-size copy of the parameters passed to `schedule`
pub type Params<const P: usize> = heapless::Vec<u8, P>;

/// Task callback.
///
/// Receives the queue it was dispatched from, so it may schedule or cancel
/// further work, and a borrow of its parameter copy. The copy is released as
/// soon as the callback returns.
pub type TaskFn<C, const N: usize, const P: usize> = fn(&mut TaskQueue<C, N, P>, &[u8]);

/// Callbacks are matched by address, never by behaviour.
pub(crate) fn same_callback<C, const N: usize, const P: usize>(
    a: TaskFn<C, N, P>,
    b: TaskFn<C, N, P>,
) -> bool {
    a as usize == b as usize
}

pub(crate) struct Task<C, const N: usize, const P: usize> {
    pub(crate) deadline: Tick,
    pub(crate) callback: TaskFn<C, N, P>,
    pub(crate) params: Params<P>,
}

impl<C, const N: usize, const P: usize> Task<C, N, P> {
    pub(crate) fn into_removed(self) -> RemovedTask<C, N, P> {
        RemovedTask {
            deadline: self.deadline,
            callback: self.callback,
            params: self.params,
        }
    }
}

/// Identifies one scheduled task.
///
/// Carries the callback for identity-based [`TaskQueue::cancel`] and the slot
/// generation for exact [`TaskQueue::cancel_handle`]. A handle goes stale once
/// its task runs or is cancelled.
pub struct TaskHandle<C, const N: usize, const P: usize> {
    pub(crate) slot: usize,
    pub(crate) generation: u32,
    deadline: Tick,
    callback: TaskFn<C, N, P>,
}

impl<C, const N: usize, const P: usize> TaskHandle<C, N, P> {
    pub(crate) fn new(slot: usize, generation: u32, deadline: Tick, callback: TaskFn<C, N, P>) -> Self {
        Self {
            slot,
            generation,
            deadline,
            callback,
        }
    }

    /// Absolute deadline the task was scheduled for
    pub fn deadline(&self) -> Tick {
        self.deadline
    }

    /// Callback the task will invoke
    pub fn callback(&self) -> TaskFn<C, N, P> {
        self.callback
    }
}

impl<C, const N: usize, const P: usize> Clone for TaskHandle<C, N, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, const N: usize, const P: usize> Copy for TaskHandle<C, N, P> {}

impl<C, const N: usize, const P: usize> PartialEq for TaskHandle<C, N, P> {
    fn eq(&self, other: &Self) -> bool {
        self.slot == other.slot && self.generation == other.generation
    }
}

impl<C, const N: usize, const P: usize> Eq for TaskHandle<C, N, P> {}

impl<C, const N: usize, const P: usize> fmt::Debug for TaskHandle<C, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("slot", &self.slot)
            .field("generation", &self.generation)
            .field("deadline", &self.deadline)
            .field("callback", &format_args!("{:#x}", self.callback as usize))
            .finish()
    }
}

/// A task taken out of the queue without running.
///
/// Owns the parameter copy, so the caller can inspect it or schedule the same
/// work again.
pub struct RemovedTask<C, const N: usize, const P: usize> {
    pub deadline: Tick,
    pub callback: TaskFn<C, N, P>,
    pub params: Params<P>,
}

impl<C, const N: usize, const P: usize> RemovedTask<C, N, P> {
    /// Parameter bytes the task was scheduled with
    pub fn params(&self) -> &[u8] {
        &self.params
    }

    /// Check whether this task would have invoked `callback`
    pub fn is_callback(&self, callback: TaskFn<C, N, P>) -> bool {
        same_callback(self.callback, callback)
    }
}

impl<C, const N: usize, const P: usize> fmt::Debug for RemovedTask<C, N, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemovedTask")
            .field("deadline", &self.deadline)
            .field("callback", &format_args!("{:#x}", self.callback as usize))
            .field("params", &self.params.as_slice())
            .finish()
    }
}
