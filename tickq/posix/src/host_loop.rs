//! Host main loop
//!
//! Stands in for the `while (1)` loop of a firmware image: poll the queue,
//! then sleep until the next deadline instead of spinning.

use std::thread;
use std::time::{Duration, Instant};

use tickq_core::TickSource;
use tickq_queue::TaskQueue;

/// Default upper bound on a single sleep
const DEFAULT_IDLE: Duration = Duration::from_millis(10);

/// Drives a [`TaskQueue`] from the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct HostLoop {
    idle: Duration,
}

impl HostLoop {
    /// Loop that sleeps at most `idle` between polls
    pub fn new(idle: Duration) -> Self {
        Self { idle }
    }

    /// Longest sleep between polls
    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Poll `queue` for `duration`, returning the number of tasks run
    pub fn run_for<C, const N: usize, const P: usize>(
        &self,
        queue: &mut TaskQueue<C, N, P>,
        duration: Duration,
    ) -> usize
    where
        C: TickSource,
    {
        let end = Instant::now() + duration;
        let mut executed = 0;
        loop {
            executed += queue.poll();
            let now = Instant::now();
            if now >= end {
                break;
            }
            thread::sleep(self.sleep_time(queue).min(end - now));
        }

        log::info!(
            "{}: ran {} task(s) in {:?}, {} pending",
            queue.config().name,
            executed,
            duration,
            queue.count()
        );
        executed
    }

    /// Poll `queue` until no task is pending, returning the number of tasks run.
    ///
    /// Never returns if callbacks keep rescheduling work.
    pub fn run_until_idle<C, const N: usize, const P: usize>(
        &self,
        queue: &mut TaskQueue<C, N, P>,
    ) -> usize
    where
        C: TickSource,
    {
        let mut executed = queue.poll();
        while !queue.is_empty() {
            thread::sleep(self.sleep_time(queue));
            executed += queue.poll();
        }

        log::info!("{}: idle after {} task(s)", queue.config().name, executed);
        executed
    }

    fn sleep_time<C, const N: usize, const P: usize>(&self, queue: &TaskQueue<C, N, P>) -> Duration
    where
        C: TickSource,
    {
        match queue.next_deadline() {
            Some(deadline) => {
                let wait = Duration::from_millis(deadline.until(queue.clock().now()).into());
                log::trace!("next deadline {} in {:?}", deadline, wait);
                wait.min(self.idle)
            }
            None => self.idle,
        }
    }
}

impl Default for HostLoop {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE)
    }
}
