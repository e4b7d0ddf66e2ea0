//! # Steady-clock helpers.
//!
//! The scheduling surface measures everything against the monotonic
//! clock; microseconds are the universal unit, with millisecond and
//! second constructors provided by multiplication.

use std::time::{Duration, Instant};

/// Microseconds.
pub fn us(value: u64) -> Duration {
    Duration::from_micros(value)
}

/// Milliseconds.
pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Seconds.
pub fn secs(value: u64) -> Duration {
    Duration::from_secs(value)
}

/// Current steady-clock instant.
pub fn now() -> Instant {
    Instant::now()
}

/// Steady-clock instant `delay` from now.
///
/// Convenience for `schedule_at` call sites.
pub fn after(delay: Duration) -> Instant {
    Instant::now() + delay
}
