use crate::events::{EventKind, SessionEvent};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

pub type EventHandler = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

struct Slot {
    token: u64,
    handler: EventHandler,
}

#[derive(Default)]
struct EventMapInner {
    slots: DashMap<EventKind, Slot>,
    next_token: AtomicU64,
}

/// Single-slot event registry.
///
/// Each [`EventKind`] holds at most one handler: registering again replaces the
/// previous one. Events dispatched while no handler is registered are dropped.
#[derive(Clone, Default)]
pub struct EventMap {
    inner: Arc<EventMapInner>,
}

impl EventMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&self, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let token = self.inner.next_token.fetch_add(1, Ordering::Relaxed);
        self.inner.slots.insert(
            kind,
            Slot {
                token,
                handler: Arc::new(handler),
            },
        );

        Subscription {
            map: Arc::downgrade(&self.inner),
            kind,
            token,
        }
    }

    /// Invokes the current handler for the event's kind. Returns whether one ran.
    pub fn dispatch(&self, event: &SessionEvent) -> bool {
        // Clone the handler out so the shard lock is released before it runs.
        let handler = self
            .inner
            .slots
            .get(&event.kind())
            .map(|slot| Arc::clone(&slot.handler));

        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    pub fn is_registered(&self, kind: EventKind) -> bool {
        self.inner.slots.contains_key(&kind)
    }
}

/// Handle to one registration.
///
/// Dropping it keeps the handler registered; [`dispose`](Self::dispose)
/// removes it unless it was already replaced by a newer registration.
pub struct Subscription {
    map: Weak<EventMapInner>,
    kind: EventKind,
    token: u64,
}

impl Subscription {
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.map
            .upgrade()
            .and_then(|inner| inner.slots.get(&self.kind).map(|slot| slot.token == self.token))
            .unwrap_or(false)
    }

    pub fn dispose(self) -> bool {
        let Some(inner) = self.map.upgrade() else {
            return false;
        };
        inner
            .slots
            .remove_if(&self.kind, |_, slot| slot.token == self.token)
            .is_some()
    }
}
