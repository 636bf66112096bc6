#![forbid(unsafe_code)]

//! Observable value cell with change notification.
//!
//! [`Observable<T>`] holds a value in shared, reference-counted storage.
//! Handles are cheap to clone and all see the same value. When the value
//! changes (compared by `PartialEq`), live subscribers are invoked in
//! registration order with a reference to the new value.
//!
//! Notification collects the live callbacks and releases the interior
//! borrow *before* invoking any of them, so a subscriber may set other
//! observables, or even this one, without panicking. Combined with the
//! synchronous delivery, this gives derived state a simple guarantee:
//! by the time `set` returns, every subscriber has run to completion.
//!
//! Subscribers are held as weak references. Dropping the [`Subscription`]
//! guard unsubscribes; dead entries are pruned lazily on the next
//! notification.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::trace;

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    version: u64,
    subscribers: Vec<Weak<dyn Fn(&T)>>,
}

/// A shared, version-tracked value with change notification.
///
/// Invariants:
/// 1. `version` increments by exactly one per value-changing mutation.
/// 2. Setting an equal value is a no-op: no version bump, no notification.
/// 3. Subscribers run in registration order, synchronously.
pub struct Observable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value`, at version 0, with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    /// Clone out the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Read the current value by reference, without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value. Notifies subscribers only when the new value
    /// differs from the current one.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate the value in place. Notifies subscribers when the closure
    /// actually changed it (compared against a pre-mutation snapshot).
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        {
            let mut inner = self.inner.borrow_mut();
            let before = inner.value.clone();
            f(&mut inner.value);
            if inner.value == before {
                return;
            }
            inner.version += 1;
        }
        self.notify();
    }

    /// Register a change callback. It fires on every subsequent
    /// value-changing mutation until the returned guard is dropped.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Callback<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription::hold(Box::new(strong))
    }

    /// Mutation counter, useful for dirty checking.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Number of registered subscribers, counting dead ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        // Upgrade outside the borrow so callbacks can re-enter this cell.
        let callbacks: Vec<Callback<T>> = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|weak| weak.strong_count() > 0);
            inner.subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        if callbacks.is_empty() {
            return;
        }
        trace!(subscribers = callbacks.len(), "observable change");
        // Re-read per iteration: an earlier subscriber may have re-entered
        // and changed the value, and later subscribers must see the latest.
        for callback in &callbacks {
            let value = self.inner.borrow().value.clone();
            callback(&value);
        }
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the guard drops the strong reference to the callback; the weak
/// entry in the subscriber list then fails to upgrade and is pruned on the
/// next notification.
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl Subscription {
    pub(crate) fn hold(guard: Box<dyn Any>) -> Self {
        Self { _guard: guard }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
