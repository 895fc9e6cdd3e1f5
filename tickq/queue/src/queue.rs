//! Deadline-ordered task queue.
//!
//! Tasks live in a fixed arena of `N` slots. Occupied slots are threaded into
//! a singly linked list sorted by deadline; released slots go onto a free
//! list. Slots that were never used are handed out from a watermark, so the
//! arena needs no initialisation pass and [`TaskQueue::new`] is `const`.

use tickq_core::{SchedResult, ScheduleError, Tick, TickSource, MAX_DELAY_MS};

use crate::config::QueueConfig;
use crate::stats::SlotStats;
use crate::task::{same_callback, Params, RemovedTask, Task, TaskFn, TaskHandle};

struct Slot<C, const N: usize, const P: usize> {
    task: Option<Task<C, N, P>>,
    /// Next slot in the deadline list while occupied, in the free list while vacant
    next: Option<usize>,
    generation: u32,
}

impl<C, const N: usize, const P: usize> Slot<C, N, P> {
    const VACANT: Self = Self {
        task: None,
        next: None,
        generation: 0,
    };
}

/// Tick-driven cooperative task queue.
///
/// `N` is the number of task slots and `P` the largest parameter copy, in
/// bytes, a task may own. Both are fixed at compile time; nothing is
/// allocated after construction.
pub struct TaskQueue<C, const N: usize, const P: usize> {
    clock: C,
    config: QueueConfig,
    slots: [Slot<C, N, P>; N],
    head: Option<usize>,
    free: Option<usize>,
    watermark: usize,
    len: usize,
    active: bool,
    stats: SlotStats,
}

impl<C, const N: usize, const P: usize> TaskQueue<C, N, P> {
    /// Create an empty, idle queue reading time from `clock`
    pub const fn new(clock: C, config: QueueConfig) -> Self {
        Self {
            clock,
            config,
            slots: [const { Slot::VACANT }; N],
            head: None,
            free: None,
            watermark: 0,
            len: 0,
            active: false,
            stats: SlotStats::new(N),
        }
    }

    /// Remove the first (earliest deadline) task that would invoke `callback`.
    ///
    /// Never runs the callback. When the same callback is pending more than
    /// once only the earliest match is removed; use
    /// [`cancel_handle`](Self::cancel_handle) to target one task exactly.
    pub fn cancel(&mut self, callback: TaskFn<C, N, P>) -> Option<RemovedTask<C, N, P>> {
        let Some((index, prev)) = self.position(|_, task| same_callback(task.callback, callback))
        else {
            debug!("[CANCEL] {}: no pending task for callback", self.config.name);
            return None;
        };

        let task = self.unlink(index, prev);
        debug!(
            "[CANCEL] {}: slot {}, deadline {}, {} pending",
            self.config.name,
            index,
            task.deadline,
            self.len
        );
        Some(task.into_removed())
    }

    /// Remove exactly the task identified by `handle`, if it is still pending
    pub fn cancel_handle(&mut self, handle: TaskHandle<C, N, P>) -> Option<RemovedTask<C, N, P>> {
        let slot = self.slots.get(handle.slot)?;
        if slot.generation != handle.generation || slot.task.is_none() {
            debug!("[CANCEL] {}: stale handle for slot {}", self.config.name, handle.slot);
            return None;
        }

        let (index, prev) = self.position(|index, _| index == handle.slot)?;
        let task = self.unlink(index, prev);
        debug!(
            "[CANCEL] {}: slot {}, deadline {}, {} pending",
            self.config.name,
            index,
            task.deadline,
            self.len
        );
        Some(task.into_removed())
    }

    /// Run every task whose deadline has been reached at `now`.
    ///
    /// Tasks run in deadline order, ties in the order they were scheduled.
    /// Each task is unlinked before its callback runs and its parameter copy
    /// is released right after, so callbacks may freely `schedule` or
    /// `cancel` on this queue. The front is re-inspected after every task:
    /// due work scheduled by a callback runs in the same call, in deadline
    /// order. A callback that keeps rescheduling itself with no delay
    /// therefore keeps this call running. Returns the number of callbacks
    /// invoked.
    pub fn dispatch(&mut self, now: Tick) -> usize {
        let mut executed = 0;
        self.activate();
        while self.run_next(now) {
            executed += 1;
        }

        if executed > 0 {
            trace!(
                "[DISPATCH] {}: ran {} at {}, {} pending",
                self.config.name,
                executed,
                now,
                self.len
            );
        }
        executed
    }

    /// Run the front task if its deadline has been reached at `now`.
    ///
    /// Marks the queue active like [`dispatch`](Self::dispatch). Returns
    /// `false`, running nothing, when the front task is not yet due.
    pub fn run_next(&mut self, now: Tick) -> bool {
        self.activate();
        let Some(task) = self.take_due(now) else {
            return false;
        };

        (task.callback)(self, &task.params);
        true
    }

    fn activate(&mut self) {
        if !self.active {
            self.active = true;
            info!("[ACTIVE] {}", self.config.name);
        }
    }

    /// Number of pending tasks
    pub fn count(&self) -> usize {
        self.len
    }

    /// Maximum number of pending tasks
    pub fn capacity(&self) -> usize {
        self.config.capacity(N)
    }

    /// Check if no task is pending
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if `schedule` would fail with `QueueFull`
    pub fn is_full(&self) -> bool {
        self.len >= self.capacity()
    }

    /// Check if dispatch has been invoked at least once
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Deadline of the earliest pending task
    pub fn next_deadline(&self) -> Option<Tick> {
        self.head.map(|index| self.task_at(index).deadline)
    }

    /// Pending deadlines, earliest first
    pub fn deadlines(&self) -> Deadlines<'_, C, N, P> {
        Deadlines {
            queue: self,
            cursor: self.head,
        }
    }

    /// Check if a task invoking `callback` is pending
    pub fn contains(&self, callback: TaskFn<C, N, P>) -> bool {
        self.position(|_, task| same_callback(task.callback, callback))
            .is_some()
    }

    /// The tick source this queue reads
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The queue configuration
    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Slot usage statistics
    pub fn stats(&self) -> SlotStats {
        self.stats
    }
}

impl<C: TickSource, const N: usize, const P: usize> TaskQueue<C, N, P> {
    /// Schedule `callback` to run `delay_ms` milliseconds from now.
    ///
    /// `params` is copied into storage owned by the task and handed back to
    /// the callback when it runs; an empty slice means no parameters. On any
    /// error the queue is left untouched.
    pub fn schedule(
        &mut self,
        callback: TaskFn<C, N, P>,
        params: &[u8],
        delay_ms: u32,
    ) -> SchedResult<TaskHandle<C, N, P>> {
        if self.config.gate_until_active && !self.active {
            debug!("[SCHEDULE] {}: rejected, never dispatched", self.config.name);
            return Err(ScheduleError::NotActive);
        }
        if delay_ms > MAX_DELAY_MS {
            debug!("[SCHEDULE] {}: delay {} out of range", self.config.name, delay_ms);
            return Err(ScheduleError::DelayOutOfRange);
        }
        if self.is_full() {
            debug!("[SCHEDULE] {}: queue full at {}", self.config.name, self.len);
            return Err(ScheduleError::QueueFull);
        }
        let params = Params::<P>::from_slice(params).map_err(|_| {
            debug!(
                "[SCHEDULE] {}: {} parameter bytes exceed {}",
                self.config.name,
                params.len(),
                P
            );
            ScheduleError::AllocationFailed
        })?;

        let deadline = self.clock.now().offset(delay_ms);
        let index = self.alloc_slot().ok_or(ScheduleError::QueueFull)?;

        self.slots[index].task = Some(Task {
            deadline,
            callback,
            params,
        });
        self.link(index, deadline);
        self.len += 1;

        debug_assert!(self.is_ordered(), "BUG: deadline order broken");
        debug_assert_eq!(self.stats.live() as usize, self.len);

        debug!(
            "[SCHEDULE] {}: slot {}, deadline {}, {} pending",
            self.config.name,
            index,
            deadline,
            self.len
        );
        Ok(TaskHandle::new(
            index,
            self.slots[index].generation,
            deadline,
            callback,
        ))
    }

    /// Dispatch at the clock's current tick
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        self.dispatch(now)
    }
}

impl<C, const N: usize, const P: usize> TaskQueue<C, N, P> {
    fn task_at(&self, index: usize) -> &Task<C, N, P> {
        self.slots[index]
            .task
            .as_ref()
            .expect("BUG: linked slot is vacant")
    }

    /// Walk the deadline list; yields the matching slot and its predecessor.
    fn position<F>(&self, mut pred: F) -> Option<(usize, Option<usize>)>
    where
        F: FnMut(usize, &Task<C, N, P>) -> bool,
    {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(index) = cursor {
            if pred(index, self.task_at(index)) {
                return Some((index, prev));
            }
            prev = Some(index);
            cursor = self.slots[index].next;
        }
        None
    }

    /// Insert after every task whose deadline is not later than `deadline`,
    /// keeping equal deadlines in schedule order.
    fn link(&mut self, index: usize, deadline: Tick) {
        let mut prev = None;
        let mut cursor = self.head;
        while let Some(at) = cursor {
            if self.task_at(at).deadline.is_after(deadline) {
                break;
            }
            prev = Some(at);
            cursor = self.slots[at].next;
        }

        self.slots[index].next = cursor;
        match prev {
            Some(at) => self.slots[at].next = Some(index),
            None => self.head = Some(index),
        }
    }

    fn unlink(&mut self, index: usize, prev: Option<usize>) -> Task<C, N, P> {
        let next = self.slots[index].next.take();
        match prev {
            Some(at) => self.slots[at].next = next,
            None => self.head = next,
        }
        self.release_slot(index)
    }

    fn take_due(&mut self, now: Tick) -> Option<Task<C, N, P>> {
        let index = self.head?;
        if !self.task_at(index).deadline.has_elapsed(now) {
            return None;
        }
        Some(self.unlink(index, None))
    }

    fn alloc_slot(&mut self) -> Option<usize> {
        let index = match self.free {
            Some(index) => {
                self.free = self.slots[index].next.take();
                index
            }
            None if self.watermark < N => {
                self.watermark += 1;
                self.watermark - 1
            }
            None => return None,
        };
        self.stats.on_alloc();
        Some(index)
    }

    fn release_slot(&mut self, index: usize) -> Task<C, N, P> {
        let slot = &mut self.slots[index];
        let task = slot.task.take().expect("BUG: releasing a vacant slot");
        slot.generation = slot.generation.wrapping_add(1);
        slot.next = self.free;
        self.free = Some(index);
        self.len -= 1;
        self.stats.on_dealloc();
        task
    }

    fn is_ordered(&self) -> bool {
        let mut deadlines = self.deadlines();
        let Some(mut prev) = deadlines.next() else {
            return true;
        };
        for deadline in deadlines {
            if prev.is_after(deadline) {
                return false;
            }
            prev = deadline;
        }
        true
    }
}

impl<C: Default, const N: usize, const P: usize> Default for TaskQueue<C, N, P> {
    fn default() -> Self {
        Self::new(C::default(), QueueConfig::DEFAULT)
    }
}

/// Iterator over pending deadlines, earliest first.
pub struct Deadlines<'a, C, const N: usize, const P: usize> {
    queue: &'a TaskQueue<C, N, P>,
    cursor: Option<usize>,
}

impl<'a, C, const N: usize, const P: usize> Iterator for Deadlines<'a, C, N, P> {
    type Item = Tick;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.cursor?;
        self.cursor = self.queue.slots[index].next;
        Some(self.queue.task_at(index).deadline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickq_core::ManualClock;

    type Queue = TaskQueue<ManualClock, 4, 8>;

    fn noop(_queue: &mut Queue, _params: &[u8]) {}

    fn other(_queue: &mut Queue, _params: &[u8]) {}

    fn queue() -> Queue {
        TaskQueue::new(ManualClock::new(Tick::ZERO), QueueConfig::DEFAULT)
    }

    #[test]
    fn test_released_slots_are_reused() {
        let mut queue = queue();
        let first = queue.schedule(noop, &[], 10).unwrap();
        queue.schedule(noop, &[], 20).unwrap();
        assert_eq!(queue.watermark, 2);

        queue.cancel_handle(first).unwrap();
        let reused = queue.schedule(other, &[], 30).unwrap();
        assert_eq!(reused.slot, first.slot);
        assert_ne!(reused.generation, first.generation);
        assert_eq!(queue.watermark, 2);
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut queue = queue();
        let handle = queue.schedule(noop, &[1], 10).unwrap();
        assert!(queue.cancel_handle(handle).is_some());

        queue.schedule(other, &[2], 10).unwrap();
        assert!(queue.cancel_handle(handle).is_none());
        assert_eq!(queue.count(), 1);
    }

    #[test]
    fn test_list_links_follow_deadlines() {
        let mut queue = queue();
        let late = queue.schedule(noop, &[], 300).unwrap();
        let early = queue.schedule(noop, &[], 100).unwrap();
        let middle = queue.schedule(noop, &[], 200).unwrap();

        assert_eq!(queue.head, Some(early.slot));
        assert_eq!(queue.slots[early.slot].next, Some(middle.slot));
        assert_eq!(queue.slots[middle.slot].next, Some(late.slot));
        assert_eq!(queue.slots[late.slot].next, None);
    }

    #[test]
    fn test_free_list_order() {
        let mut queue = queue();
        let a = queue.schedule(noop, &[], 1).unwrap();
        let b = queue.schedule(noop, &[], 2).unwrap();
        queue.cancel_handle(a).unwrap();
        queue.cancel_handle(b).unwrap();

        // Most recently released slot is handed out first
        assert_eq!(queue.free, Some(b.slot));
        assert_eq!(queue.schedule(noop, &[], 3).unwrap().slot, b.slot);
        assert_eq!(queue.schedule(noop, &[], 3).unwrap().slot, a.slot);
    }

    #[test]
    fn test_ordering_across_tick_wrap() {
        let mut queue: Queue =
            TaskQueue::new(ManualClock::new(Tick::new(u32::MAX - 10)), QueueConfig::DEFAULT);

        queue.schedule(noop, &[], 20).unwrap();
        queue.schedule(noop, &[], 5).unwrap();

        let deadlines: Vec<Tick> = queue.deadlines().collect();
        assert_eq!(deadlines, [Tick::new(u32::MAX - 5), Tick::new(9)]);
        assert!(queue.is_ordered());

        assert_eq!(queue.dispatch(Tick::MAX), 1);
        assert_eq!(queue.dispatch(Tick::new(8)), 0);
        assert_eq!(queue.dispatch(Tick::new(9)), 1);
    }
}
