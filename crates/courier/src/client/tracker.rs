//! In-flight request tracking by caller-supplied id.

use crate::cancel::CancelableFuture;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

type TrackedFuture = Arc<dyn Any + Send + Sync>;

/// Maps request ids to the future of the request currently using that id.
///
/// The first request to claim an id keeps it until it settles. A second
/// request with the same id is logged and runs untracked.
#[derive(Default)]
pub struct RequestTracker {
    entries: Mutex<HashMap<String, TrackedFuture>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for `future`. Returns false if the id is already in flight.
    pub fn track<T>(&self, id: &str, future: &CancelableFuture<T>) -> bool
    where
        T: Send + Sync + 'static,
    {
        let mut entries = self.entries.lock();
        if entries.contains_key(id) {
            warn!(
                "Request id '{}' is already in flight; the new request will not be tracked",
                id
            );
            return false;
        }
        entries.insert(id.to_string(), Arc::new(future.clone()));
        debug!("Tracking request '{}' ({} in flight)", id, entries.len());
        true
    }

    /// The in-flight future for `id`, if it was created with response type `T`.
    pub fn lookup<T>(&self, id: &str) -> Option<CancelableFuture<T>>
    where
        T: Send + Sync + 'static,
    {
        let entries = self.entries.lock();
        let entry = entries.get(id)?;
        let future = (**entry).downcast_ref::<CancelableFuture<T>>();
        if future.is_none() {
            debug!("Request '{}' is tracked with a different response type", id);
        }
        future.cloned()
    }

    pub fn release(&self, id: &str) -> bool {
        self.entries.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::cancelable;
    use tracing_test::traced_test;

    #[test]
    fn test_track_and_release() {
        let tracker = RequestTracker::new();
        let (future, _settler) = cancelable::<u32>();

        assert!(tracker.track("load", &future));
        assert!(tracker.contains("load"));
        assert!(tracker.lookup::<u32>("load").is_some());

        assert!(tracker.release("load"));
        assert!(!tracker.release("load"));
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_collision_keeps_original() {
        let tracker = RequestTracker::new();
        let (first, first_settler) = cancelable::<u32>();
        let (second, _second_settler) = cancelable::<u32>();

        assert!(tracker.track("dup", &first));
        assert!(!tracker.track("dup", &second));
        assert_eq!(tracker.len(), 1);

        first_settler.resolve(1);
        let tracked = tracker.lookup::<u32>("dup").unwrap();
        assert!(matches!(tracked.peek(), crate::cancel::Settlement::Resolved(1)));
    }

    #[test]
    #[traced_test]
    fn test_collision_is_logged() {
        let tracker = RequestTracker::new();
        let (first, _first_settler) = cancelable::<u32>();
        let (second, _second_settler) = cancelable::<u32>();

        tracker.track("dup", &first);
        tracker.track("dup", &second);
        assert!(logs_contain("Request id 'dup' is already in flight"));
    }

    #[test]
    fn test_lookup_with_wrong_type() {
        let tracker = RequestTracker::new();
        let (future, _settler) = cancelable::<u32>();
        tracker.track("typed", &future);
        assert!(tracker.lookup::<String>("typed").is_none());
        assert!(tracker.lookup::<u32>("missing").is_none());
    }
}
