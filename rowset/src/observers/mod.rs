//! Observer registry and event fan-out.
//!
//! Observers are notified synchronously, in registration order, after a
//! load completes. An observer is either a callback taking the event name,
//! or a [`HandlerTable`] answering only the events it has a handler for.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::error::{ObserverResult, RowSetError, RowSetResult};
use crate::rowset::RowSet;

/// Event emitted once materialization of a dataset has finished.
pub const LOAD_EVENT: &str = "load";

type CallbackFn = dyn Fn(&str, &RowSet) -> ObserverResult + Send + Sync;
type HandlerFn = dyn Fn(&RowSet) -> ObserverResult + Send + Sync;

// =============================================================================
// Notify Policy
// =============================================================================

/// What happens when an observer fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifyPolicy {
    /// Stop at the first failure and return it.
    #[default]
    Halt,
    /// Notify every observer, then return all failures together.
    Continue,
}

// =============================================================================
// Handler Table
// =============================================================================

/// Observer answering named events, one handler per event name.
#[derive(Default)]
pub struct HandlerTable {
    handlers: HashMap<String, Box<HandlerFn>>,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`, replacing any previous one.
    pub fn on<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&RowSet) -> ObserverResult + Send + Sync + 'static,
    {
        self.handlers.insert(event.into(), Box::new(handler));
        self
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    fn call(&self, event: &str, subject: &RowSet) -> Option<ObserverResult> {
        self.handlers.get(event).map(|handler| handler(subject))
    }
}

impl fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut events: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        events.sort_unstable();
        f.debug_struct("HandlerTable").field("events", &events).finish()
    }
}

// =============================================================================
// Observer
// =============================================================================

/// A registered observer. Identity is the shared allocation, so clones of
/// one observer are the same observer.
#[derive(Clone)]
pub enum Observer {
    /// Called for every event as `(event, rowset)`.
    Callback(Arc<CallbackFn>),
    /// Called only for events present in the table.
    Handlers(Arc<HandlerTable>),
}

impl Observer {
    pub fn callback<F>(callback: F) -> Self
    where
        F: Fn(&str, &RowSet) -> ObserverResult + Send + Sync + 'static,
    {
        Observer::Callback(Arc::new(callback))
    }

    pub fn handlers(table: HandlerTable) -> Self {
        Observer::Handlers(Arc::new(table))
    }

    /// Identity comparison.
    pub fn same_as(&self, other: &Observer) -> bool {
        match (self, other) {
            (Observer::Callback(a), Observer::Callback(b)) => Arc::ptr_eq(a, b),
            (Observer::Handlers(a), Observer::Handlers(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `None` when the observer has nothing to call for `event`.
    fn dispatch(&self, event: &str, subject: &RowSet) -> Option<ObserverResult> {
        match self {
            Observer::Callback(callback) => Some(callback(event, subject)),
            Observer::Handlers(table) => table.call(event, subject),
        }
    }
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observer::Callback(_) => f.write_str("Observer::Callback(..)"),
            Observer::Handlers(table) => f.debug_tuple("Observer::Handlers").field(table).finish(),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Ordered, duplicate-free list of observers.
#[derive(Debug, Clone, Default)]
pub struct ObserverRegistry {
    observers: Vec<Observer>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observer` unless it is already registered. Returns whether it was added.
    pub fn add(&mut self, observer: Observer) -> bool {
        if self.observers.iter().any(|o| o.same_as(&observer)) {
            return false;
        }
        self.observers.push(observer);
        true
    }

    /// Remove the first registration of `observer`. Returns whether one was removed.
    pub fn remove(&mut self, observer: &Observer) -> bool {
        match self.observers.iter().position(|o| o.same_as(observer)) {
            Some(position) => {
                self.observers.remove(position);
                true
            }
            None => false,
        }
    }

    /// Replace all registrations, dropping duplicates.
    pub fn replace(&mut self, observers: Vec<Observer>) {
        self.observers.clear();
        for observer in observers {
            self.add(observer);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observer> {
        self.observers.iter()
    }

    /// Notify every observer of `event`, in registration order.
    ///
    /// Observers with no handler for `event` are skipped. Failures are
    /// handled according to `policy`.
    pub fn notify(&self, event: &str, subject: &RowSet, policy: NotifyPolicy) -> RowSetResult<()> {
        debug!("Notifying {} observer(s) of '{}'", self.observers.len(), event);

        let mut failures = Vec::new();

        for (position, observer) in self.observers.iter().enumerate() {
            let Some(result) = observer.dispatch(event, subject) else {
                trace!("Observer #{} has no '{}' handler", position, event);
                continue;
            };

            if let Err(source) = result {
                match policy {
                    NotifyPolicy::Halt => {
                        return Err(RowSetError::ObserverFailure {
                            event: event.to_string(),
                            position,
                            source,
                        })
                    }
                    NotifyPolicy::Continue => failures.push((position, source)),
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(RowSetError::ObserverFailures {
                event: event.to_string(),
                failures,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ObserverError;
    use std::sync::Mutex;

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Observer {
        let log = Arc::clone(log);
        Observer::callback(move |event, _| {
            log.lock().unwrap().push(format!("{tag}:{event}"));
            Ok(())
        })
    }

    #[test]
    fn test_notify_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.add(recorder(&log, "first"));
        registry.add(recorder(&log, "second"));

        registry.notify(LOAD_EVENT, &RowSet::new(), NotifyPolicy::Halt).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["first:load", "second:load"]);
    }

    #[test]
    fn test_duplicate_add_ignored() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let observer = recorder(&log, "once");
        let mut registry = ObserverRegistry::new();

        assert!(registry.add(observer.clone()));
        assert!(!registry.add(observer.clone()));
        assert_eq!(registry.len(), 1);

        registry.notify(LOAD_EVENT, &RowSet::new(), NotifyPolicy::Halt).unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_remove_excludes_observer() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let kept = recorder(&log, "kept");
        let removed = recorder(&log, "removed");
        let mut registry = ObserverRegistry::new();
        registry.add(kept);
        registry.add(removed.clone());

        assert!(registry.remove(&removed));
        assert!(!registry.remove(&removed));

        registry.notify(LOAD_EVENT, &RowSet::new(), NotifyPolicy::Halt).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["kept:load"]);
    }

    #[test]
    fn test_handler_table_skips_unknown_events() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        let table = HandlerTable::new().on(LOAD_EVENT, move |rs: &RowSet| {
            sink.lock().unwrap().push(format!("rows={}", rs.row_count()));
            Ok(())
        });
        assert!(table.handles(LOAD_EVENT));

        let mut registry = ObserverRegistry::new();
        registry.add(Observer::handlers(table));

        registry.notify("refresh", &RowSet::new(), NotifyPolicy::Halt).unwrap();
        assert!(log.lock().unwrap().is_empty());

        registry.notify(LOAD_EVENT, &RowSet::new(), NotifyPolicy::Halt).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["rows=0"]);
    }

    #[test]
    fn test_halt_policy_stops_at_first_failure() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.add(Observer::callback(|_, _| Err(ObserverError::new("boom"))));
        registry.add(recorder(&log, "after"));

        let err = registry.notify(LOAD_EVENT, &RowSet::new(), NotifyPolicy::Halt).unwrap_err();
        assert!(matches!(err, RowSetError::ObserverFailure { position: 0, .. }));
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_continue_policy_collects_failures() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ObserverRegistry::new();
        registry.add(Observer::callback(|_, _| Err(ObserverError::new("first"))));
        registry.add(recorder(&log, "middle"));
        registry.add(Observer::callback(|_, _| Err(ObserverError::new("last"))));

        let err = registry.notify(LOAD_EVENT, &RowSet::new(), NotifyPolicy::Continue).unwrap_err();
        match err {
            RowSetError::ObserverFailures { event, failures } => {
                assert_eq!(event, LOAD_EVENT);
                assert_eq!(failures.len(), 2);
                assert_eq!(failures[0].0, 0);
                assert_eq!(failures[1].1.message(), "last");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(*log.lock().unwrap(), vec!["middle:load"]);
    }

    #[test]
    fn test_replace_dedups() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let a = recorder(&log, "a");
        let mut registry = ObserverRegistry::new();
        registry.add(recorder(&log, "old"));

        registry.replace(vec![a.clone(), a.clone()]);
        assert_eq!(registry.len(), 1);
        assert!(registry.iter().next().unwrap().same_as(&a));
    }

    #[test]
    fn test_notify_policy_serde() {
        let policy: NotifyPolicy = serde_json::from_str("\"continue\"").unwrap();
        assert_eq!(policy, NotifyPolicy::Continue);
        assert_eq!(NotifyPolicy::default(), NotifyPolicy::Halt);
    }
}
