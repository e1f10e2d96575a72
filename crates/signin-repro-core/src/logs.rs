//! Diagnostic log store.
//!
//! An in-memory, size-bounded sequence of timestamped lines with
//! publish/subscribe fan-out. The store is constructed explicitly and shared
//! through an [`Arc`]; it is the on-screen log of a repro session.
//!
//! ```
//! use std::sync::Arc;
//! use signin_repro_core::logs::{LogObserver, LogStore};
//!
//! let store = LogStore::new();
//! let observer: Arc<dyn LogObserver> = Arc::new(|lines: Arc<[String]>| {
//!     println!("{} lines", lines.len());
//! });
//! let subscription = store.subscribe(observer);
//! store.append("[Repro] hello");
//! subscription.unsubscribe();
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::info;

/// Immutable snapshot handed to observers.
pub type LogSnapshot = Arc<[String]>;

/// Receives a snapshot of the full log each time it changes.
pub trait LogObserver: Send + Sync {
    /// Called with the current sequence of lines, oldest first.
    fn on_logs(&self, snapshot: LogSnapshot);
}

impl<F> LogObserver for F
where
    F: Fn(LogSnapshot) + Send + Sync,
{
    fn on_logs(&self, snapshot: LogSnapshot) {
        self(snapshot)
    }
}

/// Formats a log line the way it is stored: ISO-8601 UTC timestamp with
/// millisecond precision, a space, then the message.
pub fn format_line(at: DateTime<Utc>, message: &str) -> String {
    format!(
        "{} {}",
        at.to_rfc3339_opts(SecondsFormat::Millis, true),
        message
    )
}

#[derive(Default)]
struct State {
    lines: Vec<String>,
    observers: Vec<Arc<dyn LogObserver>>,
}

struct Inner {
    capacity: usize,
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        // A panicking observer runs outside the lock, so poisoning can only
        // come from a panic while formatting; the data is still consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bounded, append-only log with subscribers.
///
/// Mutation is atomic under an internal mutex. Observers are notified after
/// the mutex is released, in subscription order, so an observer may call back
/// into the store.
pub struct LogStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for LogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("LogStore")
            .field("capacity", &self.inner.capacity)
            .field("len", &state.lines.len())
            .field("observers", &state.observers.len())
            .finish()
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore {
    /// Default number of retained lines.
    pub const DEFAULT_CAPACITY: usize = 300;

    /// Creates a store retaining [`Self::DEFAULT_CAPACITY`] lines.
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Creates a store retaining at most `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity,
                state: Mutex::new(State::default()),
            }),
        }
    }

    /// Maximum number of retained lines.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Number of lines currently held.
    pub fn len(&self) -> usize {
        self.inner.lock().lines.len()
    }

    /// Returns true if the store holds no lines.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().lines.is_empty()
    }

    /// Appends `message` stamped with the current time.
    pub fn append(&self, message: impl AsRef<str>) {
        self.append_at(Utc::now(), message.as_ref());
    }

    /// Appends `message` stamped with `at`.
    pub fn append_at(&self, at: DateTime<Utc>, message: &str) {
        let line = format_line(at, message);
        info!(target: "signin_repro_core::logs", "{}", line);

        let (snapshot, observers) = {
            let mut state = self.inner.lock();
            state.lines.push(line);
            let len = state.lines.len();
            if len > self.inner.capacity {
                state.lines.drain(..len - self.inner.capacity);
            }
            (snapshot_of(&state.lines), state.observers.clone())
        };

        notify(&observers, snapshot);
    }

    /// Registers `observer` and immediately delivers the current snapshot.
    ///
    /// Registering an observer that is already subscribed (the same `Arc`)
    /// does not add a second registration, but the snapshot is still
    /// delivered.
    pub fn subscribe(&self, observer: Arc<dyn LogObserver>) -> Subscription {
        let snapshot = {
            let mut state = self.inner.lock();
            if !state.observers.iter().any(|o| same_observer(o, &observer)) {
                state.observers.push(Arc::clone(&observer));
            }
            snapshot_of(&state.lines)
        };

        observer.on_logs(snapshot);

        Subscription {
            store: Arc::downgrade(&self.inner),
            observer,
        }
    }

    /// Removes every line and notifies observers with an empty snapshot.
    pub fn clear(&self) {
        let observers = {
            let mut state = self.inner.lock();
            state.lines.clear();
            state.observers.clone()
        };

        notify(&observers, Arc::from(Vec::new()));
    }

    /// Returns an independent copy of the current lines.
    pub fn snapshot(&self) -> Vec<String> {
        self.inner.lock().lines.clone()
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.lock().observers.len()
    }
}

/// Handle returned by [`LogStore::subscribe`].
///
/// Dropping the handle keeps the observer registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    store: Weak<Inner>,
    observer: Arc<dyn LogObserver>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &(self.store.strong_count() > 0))
            .finish()
    }
}

impl Subscription {
    /// Removes the observer from the store. No-op if the store is gone or
    /// the observer was already removed through another handle.
    pub fn unsubscribe(self) {
        if let Some(inner) = self.store.upgrade() {
            inner
                .lock()
                .observers
                .retain(|o| !same_observer(o, &self.observer));
        }
    }
}

fn snapshot_of(lines: &[String]) -> LogSnapshot {
    Arc::from(lines.to_vec())
}

fn notify(observers: &[Arc<dyn LogObserver>], snapshot: LogSnapshot) {
    for observer in observers {
        observer.on_logs(Arc::clone(&snapshot));
    }
}

fn same_observer(a: &Arc<dyn LogObserver>, b: &Arc<dyn LogObserver>) -> bool {
    // Compare data pointers only; vtable pointers may differ across codegen units.
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Observer that records every snapshot it receives.
    #[derive(Default)]
    struct Recorder {
        history: Mutex<Vec<Vec<String>>>,
    }

    impl Recorder {
        fn history(&self) -> Vec<Vec<String>> {
            self.history.lock().unwrap().clone()
        }
    }

    impl LogObserver for Recorder {
        fn on_logs(&self, snapshot: LogSnapshot) {
            self.history.lock().unwrap().push(snapshot.to_vec());
        }
    }

    /// Strips the timestamp prefix from a stored line.
    fn message(line: &str) -> &str {
        line.split_once(' ').map(|(_, m)| m).unwrap()
    }

    fn messages(lines: &[String]) -> Vec<&str> {
        lines.iter().map(|l| message(l)).collect()
    }

    #[test]
    fn format_line_uses_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 9, 30, 5).unwrap();
        assert_eq!(
            format_line(at, "[Repro] hello"),
            "2024-03-15T09:30:05.000Z [Repro] hello"
        );
    }

    #[test]
    fn append_prefixes_timestamp() {
        let store = LogStore::new();
        store.append("first");

        let lines = store.snapshot();
        assert_eq!(lines.len(), 1);
        let (stamp, msg) = lines[0].split_once(' ').unwrap();
        assert_eq!(msg, "first");
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn keeps_only_most_recent_lines() {
        let store = LogStore::new();
        for i in 0..350 {
            store.append(format!("line {i}"));
        }

        let lines = store.snapshot();
        assert_eq!(lines.len(), LogStore::DEFAULT_CAPACITY);
        assert_eq!(message(&lines[0]), "line 50");
        assert_eq!(message(&lines[299]), "line 349");
        for (offset, line) in lines.iter().enumerate() {
            assert_eq!(message(line), format!("line {}", offset + 50));
        }
    }

    #[test]
    fn custom_capacity_is_respected() {
        let store = LogStore::with_capacity(2);
        store.append("a");
        store.append("b");
        store.append("c");
        assert_eq!(store.capacity(), 2);
        assert_eq!(messages(&store.snapshot()), vec!["b", "c"]);
    }

    #[test]
    fn subscribe_delivers_current_snapshot_immediately() {
        let store = LogStore::new();
        store.append("before");

        let recorder = Arc::new(Recorder::default());
        let _sub = store.subscribe(recorder.clone());

        let history = recorder.history();
        assert_eq!(history.len(), 1);
        assert_eq!(messages(&history[0]), vec!["before"]);
    }

    #[test]
    fn append_clear_append_history() {
        let store = LogStore::new();
        let recorder = Arc::new(Recorder::default());
        let _sub = store.subscribe(recorder.clone());

        store.append("A");
        store.append("B");
        store.clear();
        store.append("C");

        assert_eq!(messages(&store.snapshot()), vec!["C"]);

        let history = recorder.history();
        let history: Vec<Vec<&str>> = history.iter().map(|h| messages(h)).collect();
        assert_eq!(
            history,
            vec![vec![], vec!["A"], vec!["A", "B"], vec![], vec!["C"]]
        );
    }

    #[test]
    fn clear_notifies_every_subscriber() {
        let store = LogStore::new();
        store.append("x");
        let first = Arc::new(Recorder::default());
        let second = Arc::new(Recorder::default());
        let _a = store.subscribe(first.clone());
        let _b = store.subscribe(second.clone());

        store.clear();

        assert!(store.is_empty());
        assert_eq!(first.history().last().unwrap().len(), 0);
        assert_eq!(second.history().last().unwrap().len(), 0);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = LogStore::new();
        let recorder = Arc::new(Recorder::default());
        let sub = store.subscribe(recorder.clone());

        store.append("seen");
        sub.unsubscribe();
        store.append("unseen");

        assert_eq!(store.observer_count(), 0);
        let history = recorder.history();
        assert_eq!(history.len(), 2);
        assert_eq!(messages(history.last().unwrap()), vec!["seen"]);
    }

    #[test]
    fn subscribing_same_observer_twice_registers_once() {
        let store = LogStore::new();
        let recorder = Arc::new(Recorder::default());
        let observer: Arc<dyn LogObserver> = recorder.clone();

        let first = store.subscribe(Arc::clone(&observer));
        let _second = store.subscribe(Arc::clone(&observer));
        assert_eq!(store.observer_count(), 1);

        store.append("once");
        // two immediate deliveries plus a single append notification
        assert_eq!(recorder.history().len(), 3);

        first.unsubscribe();
        assert_eq!(store.observer_count(), 0);
    }

    #[test]
    fn observers_notified_in_subscription_order() {
        let store = LogStore::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let o1 = Arc::clone(&order);
        let _a = store.subscribe(Arc::new(move |_: LogSnapshot| {
            o1.lock().unwrap().push("first")
        }));
        let o2 = Arc::clone(&order);
        let _b = store.subscribe(Arc::new(move |_: LogSnapshot| {
            o2.lock().unwrap().push("second")
        }));

        order.lock().unwrap().clear();
        store.append("go");
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn snapshot_is_independent_copy() {
        let store = LogStore::new();
        store.append("kept");

        let mut copy = store.snapshot();
        copy.clear();
        copy.push("injected".to_string());

        assert_eq!(messages(&store.snapshot()), vec!["kept"]);
    }

    #[test]
    fn observer_may_append_reentrantly() {
        let store = Arc::new(LogStore::new());
        let weak = Arc::downgrade(&store);
        let _sub = store.subscribe(Arc::new(move |snapshot: LogSnapshot| {
            if snapshot.len() == 1 {
                if let Some(store) = weak.upgrade() {
                    store.append("echo");
                }
            }
        }));

        store.append("ping");
        assert_eq!(messages(&store.snapshot()), vec!["ping", "echo"]);
    }

    #[test]
    fn unsubscribe_after_store_dropped_is_noop() {
        let store = LogStore::new();
        let sub = store.subscribe(Arc::new(|_: LogSnapshot| {}));
        drop(store);
        sub.unsubscribe();
    }
}
