//! Observer registry for open/closed transitions

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, trace};

/// Callback invoked with the new open state
pub type Listener = Arc<dyn Fn(bool) + Send + Sync>;

/// Lock a mutex, recovering the guard if a previous holder panicked
///
/// Neither the session slot nor the listener map is left half-updated by a
/// panic, so the inner value is always safe to keep using.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Set of registered listeners keyed by subscription id
#[derive(Default)]
pub(crate) struct ListenerSet {
    next_id: u64,
    listeners: BTreeMap<u64, Listener>,
}

impl ListenerSet {
    /// Register a listener, returning its id
    ///
    /// Registering the same `Arc` twice yields the id it already has.
    pub(crate) fn insert(&mut self, listener: Listener) -> u64 {
        if let Some((&id, _)) = self.listeners.iter().find(|(_, l)| Arc::ptr_eq(l, &listener)) {
            debug!(id, "ListenerSet::insert: listener already registered");
            return id;
        }

        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, listener);
        debug!(id, count = self.listeners.len(), "ListenerSet::insert: registered");
        id
    }

    /// Remove a listener; returns false if it was not registered
    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let removed = self.listeners.remove(&id).is_some();
        debug!(id, removed, "ListenerSet::remove");
        removed
    }

    /// Clone out the current listeners so they can be called without the lock held
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        trace!(count = self.listeners.len(), "ListenerSet::snapshot");
        self.listeners.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.len()
    }
}

/// Handle returned by `ModalService::subscribe`
///
/// Dropping it leaves the listener registered; call [`Subscription::unsubscribe`]
/// to stop receiving notifications.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerSet>>,
}

impl Subscription {
    pub(crate) fn new(id: u64, registry: Weak<Mutex<ListenerSet>>) -> Self {
        Self { id, registry }
    }

    /// Remove this listener. Calling it again, or after the service is gone, does nothing.
    pub fn unsubscribe(&self) {
        debug!(id = self.id, "Subscription::unsubscribe: called");
        let Some(registry) = self.registry.upgrade() else {
            debug!(id = self.id, "Subscription::unsubscribe: service already dropped");
            return;
        };
        lock(&registry).remove(self.id);
    }
}
