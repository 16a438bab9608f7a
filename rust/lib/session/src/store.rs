use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::state::Session;

/// Callback type for session change notifications.
pub type ChangeHandler = Arc<dyn Fn(&Arc<Session>) + Send + Sync>;

/// Unique handle for a subscription, returned by `SessionStore::subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub(crate) u64);

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

/// Holds the current session snapshot and notifies subscribers on change.
///
/// - `get()` returns the current snapshot (Arc clone, cheap). Everything
///   evaluated against one snapshot sees the same state.
/// - `set(session)` replaces the snapshot, then calls every subscriber
///   synchronously, in subscription order.
pub struct SessionStore {
    current: RwLock<Arc<Session>>,
    handlers: RwLock<Vec<HandlerEntry>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new(initial: Session) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn get(&self) -> Arc<Session> {
        self.current.read().unwrap().clone()
    }

    pub fn set(&self, session: Session) {
        let snapshot = Arc::new(session);
        {
            let mut current = self.current.write().unwrap();
            *current = snapshot.clone();
        }
        // Handlers are cloned out so a handler may subscribe or read the
        // store without deadlocking.
        let handlers: Vec<HandlerEntry> = self.handlers.read().unwrap().clone();
        for entry in handlers {
            (entry.handler)(&snapshot);
        }
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Arc<Session>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().unwrap().push(HandlerEntry {
            id,
            handler: Arc::new(handler),
        });
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap();
        let before = handlers.len();
        handlers.retain(|entry| entry.id != id);
        handlers.len() < before
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Session::default())
    }
}
