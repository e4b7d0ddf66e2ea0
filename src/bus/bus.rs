//! # Topic table and fan-out.
//!
//! [`Bus`] maps topic names to the subscribers registered on them and
//! fans published messages out into their bounded queues.
//!
//! ## Key characteristics
//! - **Shared messages**: one `Arc` per publish, cloned per subscriber.
//! - **Best-effort fan-out**: a full subscriber queue drops that
//!   subscriber's copy; other subscribers are unaffected and the
//!   publisher sees no aggregate error.
//! - **Checked dispatch**: subscribers are stored type-erased and
//!   recovered by downcast at publish time; a publish with a mismatched
//!   message type skips the subscriber with a warning instead of
//!   corrupting it.
//!
//! ## Ordering
//! Within a single publisher thread and a single topic, messages reach
//! every subscriber's queue in publish order. Across publishers, nothing
//! is guaranteed.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::DEFAULT_QUEUE_CAPACITY;

use super::subscriber::Subscriber;

type ErasedSubscriber = Arc<dyn Any + Send + Sync>;

struct BusInner {
    topics: DashMap<String, Vec<ErasedSubscriber>>,
    default_capacity: usize,
}

/// Topic-keyed router of shared messages into bounded subscriber
/// queues. Cheap to clone; clones share the topic table.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

impl Bus {
    /// Creates a bus whose `subscribe` uses `default_capacity` for new
    /// subscriber queues.
    pub fn new(default_capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                topics: DashMap::new(),
                default_capacity: default_capacity.max(1),
            }),
        }
    }

    /// Publishes `message` to every subscriber of `topic`.
    ///
    /// Best-effort per subscriber: a full queue drops that subscriber's
    /// copy, a subscriber of a different message type is skipped.
    pub fn publish<T: Send + Sync + 'static>(&self, topic: &str, message: T) {
        let Some(bucket) = self.inner.topics.get(topic) else {
            return;
        };
        let message = Arc::new(message);
        for entry in bucket.iter() {
            match Arc::clone(entry).downcast::<Subscriber<T>>() {
                Ok(subscriber) => {
                    if !subscriber.push(Arc::clone(&message)) {
                        log::debug!("subscriber on '{topic}' dropped a message: queue full");
                    }
                }
                Err(_) => {
                    log::warn!("publish on '{topic}' with mismatched message type; subscriber skipped");
                }
            }
        }
    }

    /// Registers `callback` on `topic` with the bus default queue
    /// capacity.
    pub fn subscribe<T, F>(&self, topic: &str, callback: F) -> Arc<Subscriber<T>>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.subscribe_bounded(topic, self.inner.default_capacity, callback)
    }

    /// Registers `callback` on `topic` with an explicit queue capacity
    /// (clamped to ≥ 1).
    pub fn subscribe_bounded<T, F>(
        &self,
        topic: &str,
        capacity: usize,
        callback: F,
    ) -> Arc<Subscriber<T>>
    where
        T: Send + Sync + 'static,
        F: Fn(&T) + Send + Sync + 'static,
    {
        let subscriber = Arc::new(Subscriber::new(topic, capacity.max(1), callback));
        self.inner
            .topics
            .entry(topic.to_string())
            .or_default()
            .push(Arc::clone(&subscriber) as ErasedSubscriber);
        subscriber
    }

    /// Removes `handle` from its topic bucket. O(bucket); this is a
    /// rare operation. True if the subscriber was still registered.
    pub fn unsubscribe<T: Send + Sync + 'static>(&self, handle: &Arc<Subscriber<T>>) -> bool {
        let Some(mut bucket) = self.inner.topics.get_mut(handle.topic()) else {
            return false;
        };
        let position = bucket.iter().position(|entry| {
            Arc::clone(entry)
                .downcast::<Subscriber<T>>()
                .map(|s| Arc::ptr_eq(&s, handle))
                .unwrap_or(false)
        });
        match position {
            Some(at) => {
                bucket.remove(at);
                true
            }
            None => false,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}
