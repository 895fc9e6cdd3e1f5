//! # tickq POSIX port
//!
//! Runs the tickq scheduler on a Linux/Unix host. Provides a millisecond
//! [`StdClock`], a [`Ticker`] thread that drives an interrupt-style
//! [`TickCounter`](tickq_core::TickCounter), and a [`HostLoop`] playing the
//! part of the firmware main loop.

pub mod clock;
pub mod host_loop;

pub use clock::{StdClock, Ticker};
pub use host_loop::HostLoop;
