//! Change notification
//!
//! Observers subscribe with a callback and get back a `Subscription`.
//! Dropping (or cancelling) the subscription unregisters the callback, so
//! an observer can never outlive its registration by accident.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type Callback<E> = Rc<dyn Fn(&E)>;
type ObserverList<E> = RefCell<Vec<(u64, Callback<E>)>>;

/// Broadcasts events of type `E` to every subscribed callback
pub struct Notifier<E> {
    observers: Rc<ObserverList<E>>,
    next_id: Cell<u64>,
}

impl<E: 'static> Notifier<E> {
    pub fn new() -> Self {
        Self {
            observers: Rc::new(RefCell::new(Vec::new())),
            next_id: Cell::new(0),
        }
    }

    /// Register a callback. It stays registered until the returned
    /// subscription is dropped or cancelled.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, callback: impl Fn(&E) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.observers.borrow_mut().push((id, Rc::new(callback)));

        let observers: Weak<ObserverList<E>> = Rc::downgrade(&self.observers);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(observers) = observers.upgrade() {
                    observers.borrow_mut().retain(|(other, _)| *other != id);
                }
            })),
        }
    }

    /// Call every registered callback with `event`.
    ///
    /// Callbacks may subscribe or unsubscribe while being notified; such
    /// changes take effect from the next notification.
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = self
            .observers
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }
}

impl<E: 'static> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Notifier<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.borrow().len())
            .finish()
    }
}

/// Registration handle returned by `Notifier::subscribe`
pub struct Subscription {
    remove: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Unsubscribe now (same as dropping)
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_reaches_subscribers() {
        let notifier: Notifier<u32> = Notifier::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let _sub = notifier.subscribe(move |e| sink.borrow_mut().push(*e));

        notifier.notify(&1);
        notifier.notify(&2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let notifier: Notifier<u32> = Notifier::new();
        let count = Rc::new(Cell::new(0));

        let counter = Rc::clone(&count);
        let sub = notifier.subscribe(move |_| counter.set(counter.get() + 1));
        let other = notifier.subscribe(|_| {});
        assert_eq!(notifier.observer_count(), 2);

        notifier.notify(&0);
        drop(sub);
        notifier.notify(&0);

        assert_eq!(count.get(), 1);
        assert_eq!(notifier.observer_count(), 1);
        other.cancel();
        assert_eq!(notifier.observer_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_notifier() {
        let notifier: Notifier<u32> = Notifier::new();
        let sub = notifier.subscribe(|_| {});
        drop(notifier);
        drop(sub);
    }
}
