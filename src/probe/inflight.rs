//! Set of provider ids currently being probed.
//!
//! Every mutation publishes a fresh immutable `HashSet` through `ArcSwap`, so
//! readers always see a complete snapshot and never a half-applied update.

use arc_swap::ArcSwap;
use std::collections::HashSet;
use std::sync::Arc;

pub struct InFlightSet {
    ids: ArcSwap<HashSet<String>>,
}

impl InFlightSet {
    pub fn new() -> Self {
        Self {
            ids: ArcSwap::from_pointee(HashSet::new()),
        }
    }

    pub fn insert(&self, provider_id: &str) {
        self.ids.rcu(|current| {
            let mut next = (**current).clone();
            next.insert(provider_id.to_string());
            next
        });
    }

    /// Idempotent: removing an absent id publishes nothing.
    pub fn remove(&self, provider_id: &str) {
        if !self.contains(provider_id) {
            return;
        }
        self.ids.rcu(|current| {
            let mut next = (**current).clone();
            next.remove(provider_id);
            next
        });
    }

    pub fn contains(&self, provider_id: &str) -> bool {
        self.ids.load().contains(provider_id)
    }

    /// Current immutable snapshot.
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        self.ids.load_full()
    }

    pub fn len(&self) -> usize {
        self.ids.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `provider_id` and remove it again when the guard drops.
    pub fn enter(&self, provider_id: &str) -> InFlightGuard<'_> {
        self.insert(provider_id);
        InFlightGuard {
            set: self,
            provider_id: provider_id.to_string(),
        }
    }
}

impl Default for InFlightSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Clears its in-flight mark on drop, including on early return, panic, or
/// when the owning future is dropped mid-await.
#[must_use = "the in-flight mark is cleared as soon as the guard is dropped"]
pub struct InFlightGuard<'a> {
    set: &'a InFlightSet,
    provider_id: String,
}

impl InFlightGuard<'_> {
    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.set.remove(&self.provider_id);
    }
}
