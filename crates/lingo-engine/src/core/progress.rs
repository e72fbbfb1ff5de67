use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::api::types::Category;
use crate::error::ProgressError;

/// Found/total pair for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub found: usize,
    pub total: usize,
}

/// Snapshot of every category plus the aggregate across all of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressCounts {
    pub categories: BTreeMap<Category, CategoryCount>,
    pub total: CategoryCount,
}

impl ProgressCounts {
    pub fn get(&self, category: Category) -> CategoryCount {
        self.categories.get(&category).copied().unwrap_or_default()
    }
}

/// Handle returned by [`ProgressTracker::on_change`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

impl ListenerId {
    /// Numeric form, for handing across the wasm boundary.
    pub fn raw(self) -> u32 {
        self.0
    }

    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }
}

type Listener = Box<dyn FnMut(&ProgressCounts)>;

#[derive(Default)]
struct Bucket {
    registered: HashSet<String>,
    discovered: HashSet<String>,
}

/// Tracks how many unique ids have been discovered across all scenes.
///
/// Scenes register their ids so totals stay correct, then call
/// [`mark_found`](Self::mark_found) when the player discovers one. Ids are
/// deduplicated per category and subscribed listeners are notified
/// synchronously, in subscription order, whenever counts change.
pub struct ProgressTracker {
    buckets: BTreeMap<Category, Bucket>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u32,
}

impl ProgressTracker {
    pub fn new() -> Self {
        let buckets = Category::ALL
            .into_iter()
            .map(|c| (c, Bucket::default()))
            .collect();
        Self {
            buckets,
            listeners: Vec::new(),
            next_listener: 1,
        }
    }

    fn bucket(&self, category: Category) -> &Bucket {
        &self.buckets[&category]
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Bucket {
        self.buckets.entry(category).or_default()
    }

    /// Add ids to a category's registered set. Always notifies listeners.
    pub fn register_items<I, S>(&mut self, ids: I, category: Category)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bucket = self.bucket_mut(category);
        for id in ids {
            bucket.registered.insert(id.into());
        }
        self.emit();
    }

    /// Mark an id as discovered. Returns `Ok(true)` if it was new.
    ///
    /// Ids never registered in `category` are rejected and leave the
    /// tracker untouched.
    pub fn mark_found(&mut self, id: &str, category: Category) -> Result<bool, ProgressError> {
        let bucket = self.bucket_mut(category);
        if !bucket.registered.contains(id) {
            return Err(ProgressError::Unregistered {
                id: id.to_string(),
                category,
            });
        }
        let is_new = bucket.discovered.insert(id.to_string());
        if is_new {
            log::debug!("progress: found {} in {}", id, category);
            self.emit();
        }
        Ok(is_new)
    }

    /// Whether `id` has been discovered in `category`.
    pub fn is_found(&self, id: &str, category: Category) -> bool {
        self.bucket(category).discovered.contains(id)
    }

    /// Whether `id` is registered in `category`.
    pub fn is_registered(&self, id: &str, category: Category) -> bool {
        self.bucket(category).registered.contains(id)
    }

    /// Forget every discovered id in a category. Registered ids are kept.
    pub fn reset_category(&mut self, category: Category) {
        self.bucket_mut(category).discovered.clear();
        self.emit();
    }

    /// Forget only the discovered ids matching `predicate`, so one scene can
    /// reset without losing progress made elsewhere.
    pub fn reset_category_matching(&mut self, category: Category, predicate: impl Fn(&str) -> bool) {
        self.bucket_mut(category)
            .discovered
            .retain(|id| !predicate(id));
        self.emit();
    }

    /// Forget discovered ids in every category.
    pub fn reset_all(&mut self) {
        for bucket in self.buckets.values_mut() {
            bucket.discovered.clear();
        }
        self.emit();
    }

    pub fn counts(&self) -> ProgressCounts {
        let mut counts = ProgressCounts::default();
        for (&category, bucket) in &self.buckets {
            let count = CategoryCount {
                found: bucket.discovered.len(),
                total: bucket.registered.len(),
            };
            counts.total.found += count.found;
            counts.total.total += count.total;
            counts.categories.insert(category, count);
        }
        counts
    }

    /// Subscribe to count changes. The listener is called immediately with
    /// the current counts so new views sync up.
    pub fn on_change(&mut self, mut listener: impl FnMut(&ProgressCounts) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        listener(&self.counts());
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&mut self) {
        let counts = self.counts();
        for (_, listener) in self.listeners.iter_mut() {
            listener(&counts);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
