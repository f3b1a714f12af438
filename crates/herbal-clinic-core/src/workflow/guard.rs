//! Per-key in-flight tracking for one-shot backend mutations.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard};

/// Set of keys with a request currently running.
#[derive(Debug)]
pub struct InFlight<K: Eq + Hash + Clone> {
    keys: Mutex<HashSet<K>>,
}

impl<K: Eq + Hash + Clone> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            keys: Mutex::new(HashSet::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<K>> {
        // The set stays consistent even if a holder panicked.
        self.keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim `key`. `None` while another claim on it is alive.
    pub fn try_acquire(&self, key: K) -> Option<InFlightGuard<'_, K>> {
        if self.keys().insert(key.clone()) {
            Some(InFlightGuard { owner: self, key })
        } else {
            None
        }
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.keys().contains(key)
    }
}

/// Releases its key on drop.
#[derive(Debug)]
pub struct InFlightGuard<'a, K: Eq + Hash + Clone> {
    owner: &'a InFlight<K>,
    key: K,
}

impl<K: Eq + Hash + Clone> Drop for InFlightGuard<'_, K> {
    fn drop(&mut self) {
        self.owner.keys().remove(&self.key);
    }
}
