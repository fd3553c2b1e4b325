//! Typed storage events and listener registration.
//!
//! A closed enum (spec §4.7.7, §9 "tagged variants") rather than an open
//! class hierarchy, so a `match` over [`StorageEvent`] is exhaustively
//! checkable. Listener callbacks run synchronously on the thread that
//! calls [`EventEmitter::emit`] (always inside `crate::provider`'s serial
//! queue or its flush task); a panicking listener must not take the
//! engine down with it, so each call is wrapped in `catch_unwind`.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::provider::LoadSource;

/// One occurrence of a storage lifecycle event. Variant names match the
/// `storage:*` / `sync:*` event kinds of spec §4.7.7.
#[derive(Debug, Clone)]
pub enum StorageEvent {
    /// A `load()` has begun resolving/fetching.
    Loading,
    /// A `load()` (or `initialize()`'s persisted-state restore) completed.
    Loaded { source: LoadSource, version: u64 },
    /// A flush has begun its blocking save.
    Saving,
    /// A flush published successfully.
    Saved { cid: String, sequence: u64 },
    /// Any operation failed; carries a human-readable cause.
    Error { message: String },
    /// The push-subscription client (or its fallback poller) observed a
    /// remote pointer advance past what this provider knew about.
    RemoteUpdated { cid: String, sequence: u64 },
    /// `sync()` has begun.
    SyncStarted,
    /// `sync()` completed, successfully or not, with merge counters.
    SyncCompleted { added: u64, removed: u64, conflicts: u64 },
    /// `sync()` completed and the merge recorded at least one conflict.
    SyncConflict { conflicts: u64 },
    /// `sync()` failed.
    SyncError { message: String },
}

type Listener = Box<dyn Fn(&StorageEvent) + Send + Sync>;

/// Registry of event listeners. Registration returns an opaque
/// [`Unregister`] handle rather than requiring the caller to keep the
/// closure itself alive.
pub struct EventEmitter {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self { listeners: Mutex::new(Vec::new()), next_id: AtomicU64::new(0) }
    }

    /// Register a listener. Returns a handle whose [`Unregister::call`]
    /// (or `Drop`-free explicit invocation) removes it again.
    pub fn on(&self, listener: impl Fn(&StorageEvent) + Send + Sync + 'static) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().push((id, Box::new(listener)));
        id
    }

    /// Remove a previously registered listener by id. A no-op if it was
    /// already removed.
    pub fn off(&self, id: u64) {
        self.listeners.lock().unwrap().retain(|(lid, _)| *lid != id);
    }

    /// Notify every registered listener. A listener that panics is caught
    /// and logged; it never prevents the remaining listeners from running
    /// or propagates into the caller (spec §4.7.7: "Callback exceptions
    /// MUST be swallowed").
    pub fn emit(&self, event: StorageEvent) {
        let listeners = self.listeners.lock().unwrap();
        for (_, listener) in listeners.iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(&event))).is_err() {
                tracing::warn!("[statesync] event listener panicked; ignoring");
            }
        }
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn emits_to_all_registered_listeners() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));

        let c1 = count.clone();
        emitter.on(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        let c2 = count.clone();
        emitter.on(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit(StorageEvent::Saving);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn off_stops_future_emissions() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = count.clone();
        let id = emitter.on(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit(StorageEvent::Saving);
        emitter.off(id);
        emitter.emit(StorageEvent::Saving);

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_listener_does_not_break_remaining_listeners() {
        let emitter = EventEmitter::new();
        let count = Arc::new(AtomicUsize::new(0));

        emitter.on(|_| panic!("listener blew up"));
        let c1 = count.clone();
        emitter.on(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });

        emitter.emit(StorageEvent::Saving);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
