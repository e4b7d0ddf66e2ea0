//! # Runtime configuration.
//!
//! [`Config`] fixes the two init-time constants of the public contract —
//! worker count and default subscriber queue capacity — plus the timer
//! spin threshold, an internal tunable the timer loop uses to decide
//! between busy-waiting and a condition-variable sleep.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use taskloom::Config;
//!
//! let mut cfg = Config::default();
//! cfg.workers = 2;
//! cfg.queue_capacity = 32;
//! cfg.spin_threshold = Duration::from_millis(5);
//!
//! assert_eq!(cfg.workers, 2);
//! ```

use std::time::Duration;

/// Default number of worker threads in the pool.
pub const DEFAULT_WORKERS: usize = 4;

/// Default capacity of a subscriber's message queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10;

/// Default spin threshold for the timer loop.
///
/// Deadlines closer than this, and interval tasks with a period at or
/// under it, are met by busy-waiting instead of a condition-variable
/// sleep. This trades CPU for jitter on short intervals.
pub const DEFAULT_SPIN_THRESHOLD: Duration = Duration::from_millis(20);

/// Configuration for a [`Runtime`](crate::Runtime).
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of worker threads draining the ready queue (clamped to ≥ 1).
    pub workers: usize,
    /// Default capacity of subscriber queues created by `Bus::subscribe`.
    pub queue_capacity: usize,
    /// Timer deadlines within this distance are spin-waited.
    pub spin_threshold: Duration,
}

impl Default for Config {
    /// Provides the default configuration:
    /// - `workers = 4`
    /// - `queue_capacity = 10`
    /// - `spin_threshold = 20ms`
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            spin_threshold: DEFAULT_SPIN_THRESHOLD,
        }
    }
}
