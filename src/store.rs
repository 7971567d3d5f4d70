//! Observable value container shared by the sync engines and their consumers.
//!
//! A [`Store`] holds one immutable value at a time. Writers replace it
//! wholesale with [`Store::set`]; readers either take the current value with
//! [`Store::get`] or register a callback with [`Store::subscribe`]. Callbacks
//! run in registration order, exactly once per publish, on the publishing
//! task. A callback must not publish into the store it is subscribed to.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Subscriber<T> = Arc<dyn Fn(&Arc<T>) + Send + Sync>;

/// Token returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Store<T> {
    inner: Arc<StoreInner<T>>,
}

struct StoreInner<T> {
    current: Mutex<Published<T>>,
    subscribers: Mutex<Vec<(SubscriptionId, Subscriber<T>)>>,
    // Serializes publish + fan-out so subscribers observe versions in order.
    publish: Mutex<()>,
    next_id: AtomicU64,
}

struct Published<T> {
    value: Arc<T>,
    version: u64,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default> Default for Store<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("version", &self.version())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Store<T> {
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                current: Mutex::new(Published {
                    value: Arc::new(initial),
                    version: 0,
                }),
                subscribers: Mutex::new(Vec::new()),
                publish: Mutex::new(()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn get(&self) -> Arc<T> {
        Arc::clone(&lock(&self.inner.current).value)
    }

    /// Number of publishes since creation.
    pub fn version(&self) -> u64 {
        lock(&self.inner.current).version
    }

    /// Current value together with the version it was published under.
    pub fn get_versioned(&self) -> (Arc<T>, u64) {
        let current = lock(&self.inner.current);
        (Arc::clone(&current.value), current.version)
    }

    /// Replaces the value, notifies subscribers and returns the new version.
    pub fn set(&self, value: T) -> u64 {
        let _publishing = lock(&self.inner.publish);
        let value = Arc::new(value);
        let version = {
            let mut current = lock(&self.inner.current);
            current.value = Arc::clone(&value);
            current.version += 1;
            current.version
        };

        let subscribers: Vec<Subscriber<T>> = lock(&self.inner.subscribers)
            .iter()
            .map(|(_, subscriber)| Arc::clone(subscriber))
            .collect();
        for subscriber in subscribers {
            subscriber(&value);
        }

        version
    }

    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&Arc<T>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        lock(&self.inner.subscribers).push((id, Arc::new(subscriber)));
        id
    }

    /// Returns `false` if the token was unknown or already removed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = lock(&self.inner.subscribers);
        let before = subscribers.len();
        subscribers.retain(|(existing, _)| *existing != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }
}

// A panicking subscriber must not wedge the store for everyone else.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
