#![forbid(unsafe_code)]

//! Shared state store: a path-keyed publish/subscribe registry.
//!
//! A [`StateStore`] is one "provider" in the grid's component tree. It holds
//! a single [`Value`] root; components read and write dotted paths into it
//! and subscribe to the paths they care about. Writes are equality-gated,
//! which is what lets two stores (or a store and an observable) be linked
//! bidirectionally without ping-ponging forever.
//!
//! A subscriber registered at `current.filters` fires when that exact path,
//! an ancestor (`current`), or a descendant (`current.filters.status`) is
//! written; it always receives the value at its *registered* path.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use tracing::trace;

use crate::observable::Subscription;
use crate::value::Value;

type Handler = Rc<dyn Fn(&Value)>;

struct Inner {
    root: Value,
    subscribers: AHashMap<String, Vec<Weak<dyn Fn(&Value)>>>,
}

/// A cheaply-cloneable handle to a shared state tree.
///
/// All clones see the same root and the same subscriber registry.
pub struct StateStore {
    inner: Rc<RefCell<Inner>>,
}

impl Clone for StateStore {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("StateStore")
            .field("root", &inner.root)
            .finish_non_exhaustive()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create an empty store (root is an empty map).
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                root: Value::map(),
                subscribers: AHashMap::new(),
            })),
        }
    }

    /// Clone out the subtree at `path`, or `Value::Null` when absent.
    #[must_use]
    pub fn get(&self, path: &str) -> Value {
        self.inner
            .borrow()
            .root
            .at(path)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write `value` at `path` and notify overlapping subscribers.
    /// Writing a value equal to the current subtree is a no-op.
    pub fn set(&self, path: &str, value: Value) {
        if self.get(path) == value {
            return;
        }
        trace!(path, "state store write");
        let notify: Vec<(String, Handler)> = {
            let mut inner = self.inner.borrow_mut();
            inner.root.set_at(path, value);
            inner
                .subscribers
                .retain(|_, handlers| {
                    handlers.retain(|weak| weak.strong_count() > 0);
                    !handlers.is_empty()
                });
            inner
                .subscribers
                .iter()
                .filter(|(registered, _)| paths_overlap(registered.as_str(), path))
                .flat_map(|(registered, handlers)| {
                    handlers
                        .iter()
                        .filter_map(Weak::upgrade)
                        .map(|handler| (registered.clone(), handler))
                        .collect::<Vec<_>>()
                })
                .collect()
        };
        // Borrow released: handlers may re-enter the store.
        for (registered, handler) in notify {
            let current = self.get(&registered);
            handler(&current);
        }
    }

    /// Subscribe to writes overlapping `path`. The handler receives the
    /// value at `path` after each such write. Dropping the returned guard
    /// unsubscribes.
    pub fn subscribe(&self, path: &str, handler: impl Fn(&Value) + 'static) -> Subscription {
        let strong: Handler = Rc::new(handler);
        self.inner
            .borrow_mut()
            .subscribers
            .entry(path.to_owned())
            .or_default()
            .push(Rc::downgrade(&strong));
        Subscription::hold(Box::new(strong))
    }
}

/// True when one path is equal to, an ancestor of, or a descendant of the
/// other. The empty path is the root and overlaps everything.
fn paths_overlap(a: &str, b: &str) -> bool {
    a.is_empty()
        || b.is_empty()
        || a == b
        || a.strip_prefix(b).is_some_and(|rest| rest.starts_with('.'))
        || b.strip_prefix(a).is_some_and(|rest| rest.starts_with('.'))
}
