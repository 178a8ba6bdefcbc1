//! Change notifications emitted by [`EntryStore`](super::store::EntryStore).
//!
//! Presentation code subscribes a callback instead of observing the object
//! graph. Events are delivered after the mutation has been committed.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A committed change to the entry collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum StoreEvent {
    Created { id: String },
    BookmarkToggled { id: String, is_bookmarked: bool },
    Deleted { id: String },
    Cleared { deleted_count: usize },
    Imported { count: usize },
}

/// Handle returned by [`EntryStore::subscribe`](super::store::EntryStore::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

/// Ordered set of listeners.
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl ListenerRegistry {
    pub(crate) fn add(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Calls every listener in subscription order.
    ///
    /// The list is snapshotted first so a listener may subscribe or
    /// unsubscribe without deadlocking.
    pub(crate) fn emit(&self, event: &StoreEvent) {
        let snapshot: Vec<Listener> = self.lock().iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in snapshot {
            listener(event);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Listener)>> {
        // A listener list has no invariants a panic could break.
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
