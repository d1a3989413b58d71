//! Generic filter → interceptor stack store.

use crate::filter::{Filter, RequestTarget};
use parking_lot::RwLock;

/// Interceptors grouped by filter.
///
/// Registering under an existing filter puts the new interceptor first.
/// Filters enumerate in the order they were first registered; only the
/// per-filter order is part of the contract.
pub struct InterceptorRegistry<I> {
    entries: RwLock<Vec<(Filter, Vec<I>)>>,
}

impl<I: Clone> InterceptorRegistry<I> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn register(&self, filter: Filter, interceptor: I) {
        let mut entries = self.entries.write();
        match entries.iter_mut().find(|(key, _)| *key == filter) {
            Some((_, stack)) => stack.insert(0, interceptor),
            None => entries.push((filter, vec![interceptor])),
        }
    }

    /// All interceptors whose filter matches `target`, in run order.
    pub fn matching(&self, target: &RequestTarget) -> Vec<I> {
        self.entries
            .read()
            .iter()
            .filter(|(filter, _)| filter.matches(target))
            .flat_map(|(_, stack)| stack.iter().cloned())
            .collect()
    }

    /// Number of distinct filters.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<I: Clone> Default for InterceptorRegistry<I> {
    fn default() -> Self {
        Self::new()
    }
}
