//! Hover synchronization channel
//!
//! Holds the set of currently hovered keys and pushes the full snapshot to every
//! observer after each change. Observers never see a diff or a history, only the
//! latest state. Mutation and publication happen inside the same call, so the last
//! `enter`/`leave` invoked is always the state observers end up with.

use std::fmt;

/// Observer callback, receives the full hovered sequence
pub type HoverObserver<K> = Box<dyn FnMut(&[K])>;

/// Handle returned by [`HoverChannel::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Publish/subscribe channel for the hovered set of one tree instance
pub struct HoverChannel<K> {
    /// Hovered keys in the order they were entered
    hovered: Vec<K>,
    observers: Vec<(SubscriptionId, HoverObserver<K>)>,
    next_subscription: u64,
    publications: u64,
}

impl<K: Clone + PartialEq> HoverChannel<K> {
    pub fn new() -> Self {
        Self {
            hovered: Vec::new(),
            observers: Vec::new(),
            next_subscription: 0,
            publications: 0,
        }
    }

    /// Register an observer; it is not called until the next change
    pub fn subscribe(&mut self, observer: impl FnMut(&[K]) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove an observer; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Add `key` to the hovered set and publish
    ///
    /// A key that is already hovered keeps its position; the snapshot is still published.
    pub fn enter(&mut self, key: K) {
        if !self.hovered.contains(&key) {
            self.hovered.push(key);
        }
        self.publish();
    }

    /// Remove `key` from the hovered set and publish
    pub fn leave(&mut self, key: &K) {
        self.hovered.retain(|hovered| hovered != key);
        self.publish();
    }

    /// Empty the hovered set and publish once
    pub fn clear(&mut self) {
        self.hovered.clear();
        self.publish();
    }

    pub fn snapshot(&self) -> &[K] {
        &self.hovered
    }

    pub fn is_hovered(&self, key: &K) -> bool {
        self.hovered.contains(key)
    }

    /// Number of snapshots published so far
    pub fn publications(&self) -> u64 {
        self.publications
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn publish(&mut self) {
        self.publications += 1;
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.hovered);
        }
    }
}

impl<K: Clone + PartialEq> Default for HoverChannel<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for HoverChannel<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoverChannel")
            .field("hovered", &self.hovered)
            .field("observers", &self.observers.len())
            .field("publications", &self.publications)
            .finish()
    }
}
