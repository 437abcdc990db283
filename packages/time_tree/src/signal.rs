use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::ERR_POISONED_LOCK;

/// A callback registered with a [`Signal`].
///
/// Subscribers are identified by the allocation behind the `Arc`, so keep the value returned by
/// [`Signal::subscribe()`] if you intend to unsubscribe later.
pub type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// An ordered list of callbacks that are all invoked whenever a value is published.
///
/// This is a general-purpose observer list. The package uses one process-wide instance,
/// [`post_timing()`](crate::post_timing), to announce completed regions.
///
/// # Publishing
///
/// [`publish()`](Self::publish) takes a copy of the subscriber list and then calls each
/// subscriber synchronously, in subscription order, on the publishing thread. The lock
/// guarding the list is not held while subscribers run, so a slow subscriber does not block
/// other threads from publishing or (un)subscribing. Changes made to the list while a publish
/// is in progress, including by the subscribers themselves, take effect from the next publish.
///
/// Panics raised by subscribers are not caught. They propagate to the caller of `publish()`
/// and the remaining subscribers are not called.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use time_tree::Signal;
///
/// let signal = Signal::<u32>::new("numbers");
/// let sum = Arc::new(AtomicUsize::new(0));
///
/// let subscriber = signal.subscribe({
///     let sum = Arc::clone(&sum);
///     move |value: &u32| {
///         sum.fetch_add(*value as usize, Ordering::Relaxed);
///     }
/// });
///
/// signal.publish(&5);
/// signal.publish(&6);
/// assert_eq!(sum.load(Ordering::Relaxed), 11);
///
/// assert!(signal.unsubscribe(&subscriber));
/// signal.publish(&100);
/// assert_eq!(sum.load(Ordering::Relaxed), 11);
/// ```
pub struct Signal<T> {
    name: &'static str,
    subscribers: Mutex<Vec<Subscriber<T>>>,
}

impl<T> Signal<T> {
    /// Creates a signal without any subscribers.
    ///
    /// The name is only used for diagnostics.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// The name given to the signal when it was created.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Appends a callback to the end of the subscriber list.
    ///
    /// Returns the subscriber as registered, which identifies it for
    /// [`unsubscribe()`](Self::unsubscribe).
    pub fn subscribe<F>(&self, callback: F) -> Subscriber<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let subscriber: Subscriber<T> = Arc::new(callback);
        self.subscribe_arc(Arc::clone(&subscriber));
        subscriber
    }

    /// Appends an existing subscriber to the end of the subscriber list.
    ///
    /// The same subscriber may be registered multiple times, in which case it is called once
    /// for each registration.
    pub fn subscribe_arc(&self, subscriber: Subscriber<T>) {
        let mut subscribers = self.subscribers.lock().expect(ERR_POISONED_LOCK);
        subscribers.push(subscriber);

        debug!(
            signal = self.name,
            subscribers = subscribers.len(),
            "subscribed"
        );
    }

    /// Removes the first registration of `subscriber` from the list.
    ///
    /// Returns whether a registration was found. Removing a subscriber that is not registered
    /// is not an error.
    pub fn unsubscribe(&self, subscriber: &Subscriber<T>) -> bool {
        let mut subscribers = self.subscribers.lock().expect(ERR_POISONED_LOCK);

        let Some(index) = subscribers
            .iter()
            .position(|registered| Arc::ptr_eq(registered, subscriber))
        else {
            return false;
        };

        subscribers.remove(index);

        debug!(
            signal = self.name,
            subscribers = subscribers.len(),
            "unsubscribed"
        );

        true
    }

    /// Calls every subscriber with `value`, in subscription order.
    pub fn publish(&self, value: &T) {
        let subscribers = self.subscribers.lock().expect(ERR_POISONED_LOCK).clone();

        for subscriber in &subscribers {
            subscriber(value);
        }
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.lock().expect(ERR_POISONED_LOCK).len()
    }

    /// Whether there are no registered subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.lock().expect(ERR_POISONED_LOCK).is_empty()
    }
}

impl<T> fmt::Debug for Signal<T> {
    #[cfg_attr(test, mutants::skip)] // No API contract to test.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("name", &self.name)
            .field("subscribers", &self.len())
            .finish()
    }
}
