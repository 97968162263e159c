//! Synchronous observer registry.
//!
//! # Reentrancy contract
//!
//! [`EventBus::dispatch`] calls every matching observer in subscription
//! order, on the caller's thread, before returning. An observer may call
//! back into the store that owns the bus; that nested mutation runs its own
//! complete apply-then-dispatch cycle and returns before the outer dispatch
//! moves on to the next observer. The bus holds no borrow of its subscriber
//! list while a callback runs, so observers may also subscribe or
//! unsubscribe from inside a callback. Observers unsubscribed mid-dispatch
//! are not called for the remainder of that dispatch; observers subscribed
//! mid-dispatch first see the next event.
//!
//! [`EventBus::depth`] reports how many dispatches are currently on the
//! stack, so the owning store can cap runaway recursion.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::event::ChangeEvent;
use crate::filter::ObserveOptions;

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obs:{}", self.0)
    }
}

type Callback = Rc<dyn Fn(&ChangeEvent)>;

/// Internal subscriber: a filter paired with a callback.
struct Subscriber {
    id: ObserverId,
    options: ObserveOptions,
    callback: Callback,
}

/// Fan-out registry delivering change events to matching observers.
pub struct EventBus {
    subscribers: RefCell<Vec<Subscriber>>,
    next_id: Cell<u64>,
    depth: Cell<usize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
            depth: Cell::new(0),
        }
    }

    /// Register an observer with the given filter.
    pub fn subscribe<F>(&self, callback: F, options: ObserveOptions) -> ObserverId
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        let id = ObserverId(self.next_id.get());
        self.next_id.set(id.0 + 1);

        self.subscribers.borrow_mut().push(Subscriber {
            id,
            options,
            callback: Rc::new(callback),
        });
        debug!(observer = %id, "observer subscribed");
        id
    }

    /// Remove an observer. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        let mut subs = self.subscribers.borrow_mut();
        let before = subs.len();
        subs.retain(|s| s.id != id);
        let removed = subs.len() != before;
        if removed {
            debug!(observer = %id, "observer unsubscribed");
        }
        removed
    }

    pub fn is_subscribed(&self, id: ObserverId) -> bool {
        self.subscribers.borrow().iter().any(|s| s.id == id)
    }

    /// Number of registered observers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Number of dispatches currently in progress on the call stack.
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// Deliver `event` to every observer whose filter accepts it.
    ///
    /// Returns the number of observers called.
    pub fn dispatch(&self, event: &ChangeEvent) -> usize {
        let matching: Vec<(ObserverId, Callback)> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|s| s.options.matches(event))
            .map(|s| (s.id, Rc::clone(&s.callback)))
            .collect();

        let _guard = DepthGuard::enter(&self.depth);
        let mut notified = 0;
        for (id, callback) in matching {
            if !self.is_subscribed(id) {
                continue;
            }
            callback(event);
            notified += 1;
        }

        debug!(
            origin = %event.origin,
            changes = event.changes.len(),
            notified,
            depth = self.depth.get(),
            "change event dispatched"
        );
        notified
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("depth", &self.depth.get())
            .finish()
    }
}

/// Keeps the dispatch depth balanced even if a callback panics.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>) -> Self {
        depth.set(depth.get() + 1);
        Self { depth }
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
