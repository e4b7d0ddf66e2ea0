//! # Pub/sub bus.
//!
//! Topic-keyed, type-checked routing of shared messages into bounded
//! per-subscriber queues:
//! - [`Bus`] — the topic table; publish / subscribe / unsubscribe
//! - [`Subscriber`] — bounded FIFO + callback, drained by `spin`
//!
//! The bus is orthogonal to the scheduler but is the normal producer of
//! `emit_event` calls: a publisher task publishes a message, then emits
//! the event whose tasks spin their subscribers.

mod bus;
mod subscriber;

pub use bus::Bus;
pub use subscriber::Subscriber;
