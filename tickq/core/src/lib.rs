#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![forbid(unsafe_code)]

//! # tickq core
//!
//! Tick arithmetic, tick sources and the error taxonomy shared by the tickq
//! crates. Everything here is `no_std` and allocation free.

use core::fmt;

pub mod time;

pub use time::*;

/// tickq version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type returned by scheduling operations
pub type SchedResult<T> = Result<T, ScheduleError>;

/// Reasons a task could not be scheduled.
///
/// All of them are local and recoverable: the queue is left exactly as it was
/// before the failed call and retrying is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// The queue already holds its configured maximum of pending tasks
    QueueFull,
    /// Storage for the parameter copy could not be obtained
    AllocationFailed,
    /// The relative delay exceeds [`MAX_DELAY_MS`]
    DelayOutOfRange,
    /// The queue only accepts work once dispatch has run at least once
    NotActive,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::QueueFull => write!(f, "Task queue is full"),
            ScheduleError::AllocationFailed => write!(f, "Unable to allocate task parameters"),
            ScheduleError::DelayOutOfRange => write!(f, "Delay exceeds the tick half-range"),
            ScheduleError::NotActive => write!(f, "Scheduler has not been dispatched yet"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ScheduleError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ScheduleError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            ScheduleError::QueueFull => defmt::write!(fmt, "QueueFull"),
            ScheduleError::AllocationFailed => defmt::write!(fmt, "AllocationFailed"),
            ScheduleError::DelayOutOfRange => defmt::write!(fmt, "DelayOutOfRange"),
            ScheduleError::NotActive => defmt::write!(fmt, "NotActive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ScheduleError::QueueFull.to_string(), "Task queue is full");
        assert_eq!(
            ScheduleError::AllocationFailed.to_string(),
            "Unable to allocate task parameters"
        );
    }

    #[test]
    fn test_error_equality() {
        assert_eq!(ScheduleError::NotActive, ScheduleError::NotActive);
        assert_ne!(ScheduleError::QueueFull, ScheduleError::DelayOutOfRange);
    }
}
