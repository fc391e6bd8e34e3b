//! Minimal publish/subscribe registry shared by storage and session state.
//!
//! Listeners are snapshotted before dispatch so a callback may subscribe,
//! unsubscribe, or trigger another emit without deadlocking.

#[cfg(test)]
#[path = "listeners_test.rs"]
mod listeners_test;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

pub(crate) struct ListenerSet<E> {
    slots: Mutex<Slots<E>>,
}

struct Slots<E> {
    next_id: u64,
    entries: Vec<(u64, Listener<E>)>,
}

impl<E: 'static> ListenerSet<E> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self { slots: Mutex::new(Slots { next_id: 0, entries: Vec::new() }) })
    }

    pub(crate) fn add<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = {
            let mut slots = self.lock();
            let id = slots.next_id;
            slots.next_id += 1;
            slots.entries.push((id, Arc::new(listener)));
            id
        };
        let weak = Arc::downgrade(self);
        Subscription::new(move || {
            if let Some(set) = weak.upgrade() {
                set.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    pub(crate) fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self.lock().entries.iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in snapshot {
            listener(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> MutexGuard<'_, Slots<E>> {
        self.slots.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub(crate) fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + Sync + 'static,
    {
        Self { cancel: Some(Box::new(cancel)) }
    }

    /// A subscription with nothing to cancel.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    /// Keep the listener registered for the lifetime of its source.
    pub fn forget(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.cancel.is_some()).finish()
    }
}
