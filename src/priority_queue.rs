//! ## Priority queue
//!
//! A binary heap keyed by `f32` priority holding an `i32` payload, with a
//! configurable sort order. Built the same way the teacher builds its
//! kNN candidate heaps (`rtree_common::KnnCandidate`): a small wrapper struct
//! implementing `Ord` by delegating to `partial_cmp`/`unwrap_or(Ordering::Equal)`
//! on the f32 priority, flipped by the configured [`SortOrder`].
//!
//! Used by [`crate::traversal::nearest_n`] to hold up to `count` worst-first
//! candidates, and flipped to ascending order before draining into the
//! caller's callback for the sorted variant.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Whether the queue's top entry is the smallest or largest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    priority: f32,
    value: i32,
    order: SortOrder,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap: for Ascending order we want the smallest
        // priority at the top, so the comparison is reversed.
        let natural = self
            .priority
            .partial_cmp(&other.priority)
            .unwrap_or(Ordering::Equal);
        match self.order {
            SortOrder::Descending => natural,
            SortOrder::Ascending => natural.reverse(),
        }
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A binary heap of `(priority, value)` pairs with a configurable sort order.
#[derive(Debug, Clone)]
pub struct PriorityQueue {
    heap: BinaryHeap<Entry>,
    order: SortOrder,
}

impl PriorityQueue {
    pub fn new(order: SortOrder) -> Self {
        PriorityQueue {
            heap: BinaryHeap::new(),
            order,
        }
    }

    pub fn size(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn insert(&mut self, value: i32, priority: f32) {
        self.heap.push(Entry {
            priority,
            value,
            order: self.order,
        });
    }

    /// The payload of the top entry (smallest priority if `Ascending`,
    /// largest if `Descending`).
    pub fn get_value(&self) -> Option<i32> {
        self.heap.peek().map(|e| e.value)
    }

    /// The priority of the top entry.
    pub fn get_priority(&self) -> Option<f32> {
        self.heap.peek().map(|e| e.priority)
    }

    pub fn pop(&mut self) -> Option<(i32, f32)> {
        self.heap.pop().map(|e| (e.value, e.priority))
    }

    /// Rebuilds the heap in place under a new sort order.
    pub fn set_sort_order(&mut self, order: SortOrder) {
        if order == self.order {
            return;
        }
        self.order = order;
        let drained: Vec<Entry> = self.heap.drain().collect();
        self.heap = drained
            .into_iter()
            .map(|mut e| {
                e.order = order;
                e
            })
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descending_pops_largest_first() {
        let mut q = PriorityQueue::new(SortOrder::Descending);
        q.insert(1, 3.0);
        q.insert(2, 9.0);
        q.insert(3, 1.0);
        assert_eq!(q.get_priority(), Some(9.0));
        assert_eq!(q.pop(), Some((2, 9.0)));
        assert_eq!(q.pop(), Some((1, 3.0)));
        assert_eq!(q.pop(), Some((3, 1.0)));
    }

    #[test]
    fn ascending_pops_smallest_first() {
        let mut q = PriorityQueue::new(SortOrder::Ascending);
        q.insert(1, 3.0);
        q.insert(2, 9.0);
        q.insert(3, 1.0);
        assert_eq!(q.pop(), Some((3, 1.0)));
        assert_eq!(q.pop(), Some((1, 3.0)));
        assert_eq!(q.pop(), Some((2, 9.0)));
    }

    #[test]
    fn set_sort_order_flips_pop_direction() {
        let mut q = PriorityQueue::new(SortOrder::Descending);
        q.insert(1, 3.0);
        q.insert(2, 9.0);
        q.insert(3, 1.0);
        q.set_sort_order(SortOrder::Ascending);
        assert_eq!(q.pop(), Some((3, 1.0)));
        assert_eq!(q.pop(), Some((1, 3.0)));
        assert_eq!(q.pop(), Some((2, 9.0)));
    }
}
