//! Watcher registry connecting host events to subscribers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::EventKind;
use crate::host::HostEvent;

/// Callback invoked on the host thread for every matching event.
pub type EventHandler = Arc<dyn Fn(&HostEvent) + Send + Sync>;

/// Source of host events that subscribers can watch.
pub trait EventSource: Send + Sync {
    /// Registers `handler` for events of `kind` until the returned guard is
    /// dropped.
    fn watch(&self, kind: EventKind, handler: EventHandler) -> WatchGuard;
}

/// Registration token; dropping it unregisters the watcher.
#[must_use = "dropping the guard unregisters the watcher immediately"]
pub struct WatchGuard {
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchGuard {
    /// Guard that runs `unregister` when dropped.
    pub fn new(unregister: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unregister: Some(Box::new(unregister)),
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    watchers: Vec<Watcher>,
}

struct Watcher {
    id: u64,
    kind: EventKind,
    handler: EventHandler,
}

/// In-process [`EventSource`] fed by the host through [`EventHub::emit`].
#[derive(Clone, Default)]
pub struct EventHub {
    registry: Arc<Mutex<Registry>>,
}

impl EventHub {
    /// Creates a hub with no watchers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `event` to every watcher of its kind, in registration order.
    ///
    /// Handlers run outside the registry lock, so they may register or drop
    /// watchers themselves.
    pub fn emit(&self, event: &HostEvent) {
        let kind = EventKind::of(event);
        let handlers: Vec<EventHandler> = lock(&self.registry)
            .watchers
            .iter()
            .filter(|watcher| watcher.kind == kind)
            .map(|watcher| Arc::clone(&watcher.handler))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }

    /// Number of live watchers for `kind`.
    #[must_use]
    pub fn watcher_count(&self, kind: EventKind) -> usize {
        lock(&self.registry)
            .watchers
            .iter()
            .filter(|watcher| watcher.kind == kind)
            .count()
    }
}

impl EventSource for EventHub {
    fn watch(&self, kind: EventKind, handler: EventHandler) -> WatchGuard {
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.watchers.push(Watcher { id, kind, handler });
            id
        };
        let registry: Weak<Mutex<Registry>> = Arc::downgrade(&self.registry);
        WatchGuard::new(move || {
            if let Some(registry) = registry.upgrade() {
                lock(&registry).watchers.retain(|watcher| watcher.id != id);
            }
        })
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
