//! Monotonic timing module
//!
//! This module provides nanosecond-precision timing that is:
//! - Monotonic (never goes backward)
//! - Consistent across the pointer, camera, and timer threads
//! - Zero-overhead in the hot path

pub mod clock;

pub use clock::{Duration, MonotonicClock, Timestamp};
