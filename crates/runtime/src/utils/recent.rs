use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

/// Set that remembers only the most recent `capacity` insertions.
#[derive(Debug)]
pub(crate) struct RecentSet<T> {
    order: VecDeque<T>,
    members: HashSet<T>,
    capacity: usize,
}

impl<T: Copy + Eq + Hash> RecentSet<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns `false` if `value` was already remembered.
    pub fn insert(&mut self, value: T) -> bool {
        if !self.members.insert(value) {
            return false;
        }

        self.order.push_back(value);
        if self.order.len() > self.capacity
            && let Some(oldest) = self.order.pop_front()
        {
            self.members.remove(&oldest);
        }
        true
    }

    pub fn contains(&self, value: &T) -> bool {
        self.members.contains(value)
    }
}
