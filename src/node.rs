//! ## Node
//!
//! The tree's per-node record: fixed-capacity parallel coordinate arrays, an
//! id array, an entry count, a level, and a cached minimum bounding
//! rectangle. Kept as flat primitive arrays rather than a `Vec` of small
//! entry records — the cache-density argument from the reference pack's
//! arena-style examples (fewer, denser allocations than one per entry)
//! applies here even though Rust has no per-element boxing to avoid.

use crate::geometry::{self, Rect};

/// A node in the R-tree's arena, addressed externally by its `node_id`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    /// 1 for leaves, >1 for internal nodes; the root's level equals the tree height.
    pub(crate) level: i32,
    /// Number of occupied slots in `[0, max_node_entries]`. During a split in
    /// progress this may count slots whose `ids` entry is `-1` (vacated but
    /// not yet compacted away) — see [`Node::compact`].
    pub(crate) entry_count: usize,
    min_x: Vec<f32>,
    min_y: Vec<f32>,
    max_x: Vec<f32>,
    max_y: Vec<f32>,
    /// Leaf slot: payload id (`>= 0`). Internal slot: child node id. `-1`
    /// marks a slot vacated during split.
    pub(crate) ids: Vec<i32>,
    /// Tight bounding rectangle of all occupied entries.
    pub(crate) mbr: Rect,
}

impl Node {
    pub fn new(level: i32, max_node_entries: usize) -> Self {
        Node {
            level,
            entry_count: 0,
            min_x: vec![0.0; max_node_entries],
            min_y: vec![0.0; max_node_entries],
            max_x: vec![0.0; max_node_entries],
            max_y: vec![0.0; max_node_entries],
            ids: vec![-1; max_node_entries],
            mbr: Rect::empty(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.ids.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.level == 1
    }

    pub fn is_full(&self) -> bool {
        self.entry_count >= self.capacity()
    }

    pub fn entry_rect(&self, i: usize) -> Rect {
        Rect::new(self.min_x[i], self.min_y[i], self.max_x[i], self.max_y[i])
    }

    pub fn entry_id(&self, i: usize) -> i32 {
        self.ids[i]
    }

    pub fn set_entry(&mut self, i: usize, rect: Rect, id: i32) {
        self.min_x[i] = rect.min_x;
        self.min_y[i] = rect.min_y;
        self.max_x[i] = rect.max_x;
        self.max_y[i] = rect.max_y;
        self.ids[i] = id;
    }

    /// Appends an entry at the next free slot. Panics if the node is already
    /// full — callers must split before appending, per the crate's
    /// out-of-bounds-is-a-programmer-error contract.
    pub fn add_entry(&mut self, rect: Rect, id: i32) -> usize {
        assert!(!self.is_full(), "add_entry called on a full node");
        let i = self.entry_count;
        self.set_entry(i, rect, id);
        self.entry_count += 1;
        i
    }

    /// Marks slot `i` vacated (used mid-split); does not shrink `entry_count`.
    pub fn vacate(&mut self, i: usize) {
        self.ids[i] = -1;
    }

    pub fn is_vacated(&self, i: usize) -> bool {
        self.ids[i] == -1
    }

    /// Removes vacated slots, shifting remaining entries down and shrinking
    /// `entry_count` to the number of slots actually occupied. Used after a
    /// split has routed some of `n`'s former entries to the sibling.
    pub fn compact(&mut self) {
        let mut write = 0;
        for read in 0..self.entry_count {
            if self.ids[read] == -1 {
                continue;
            }
            if write != read {
                self.min_x[write] = self.min_x[read];
                self.min_y[write] = self.min_y[read];
                self.max_x[write] = self.max_x[read];
                self.max_y[write] = self.max_y[read];
                self.ids[write] = self.ids[read];
            }
            write += 1;
        }
        for slot in self.ids.iter_mut().take(self.entry_count).skip(write) {
            *slot = -1;
        }
        self.entry_count = write;
    }

    /// Removes the entry at `i` by swapping in the last occupied entry,
    /// shrinking `entry_count` by one. Used by ordinary deletion (not split).
    pub fn delete_entry(&mut self, i: usize) {
        let last = self.entry_count - 1;
        if i != last {
            self.min_x[i] = self.min_x[last];
            self.min_y[i] = self.min_y[last];
            self.max_x[i] = self.max_x[last];
            self.max_y[i] = self.max_y[last];
            self.ids[i] = self.ids[last];
        }
        self.ids[last] = -1;
        self.entry_count -= 1;
    }

    /// Recomputes the cached MBR as the tight union of all occupied entries.
    pub fn recalculate_mbr(&mut self) {
        let mut mbr = Rect::empty();
        for i in 0..self.entry_count {
            if self.ids[i] == -1 {
                continue;
            }
            mbr = geometry::union(&mbr, &self.entry_rect(i));
        }
        self.mbr = mbr;
    }

    pub fn entries(&self) -> impl Iterator<Item = (Rect, i32)> + '_ {
        (0..self.entry_count)
            .filter(|&i| self.ids[i] != -1)
            .map(move |i| (self.entry_rect(i), self.ids[i]))
    }

    /// Column-major view of the raw coordinate/id arrays, for [`crate::wire`]
    /// to serialize in the same struct-of-arrays layout they're held in.
    pub(crate) fn raw_arrays(&self) -> (&[f32], &[f32], &[f32], &[f32], &[i32]) {
        (&self.min_x, &self.min_y, &self.max_x, &self.max_y, &self.ids)
    }

    /// Rebuilds a node directly from the column-major arrays written by
    /// [`Node::raw_arrays`]. All arrays must have the same length
    /// (`max_node_entries`).
    pub(crate) fn from_raw_arrays(
        level: i32,
        entry_count: usize,
        min_x: Vec<f32>,
        min_y: Vec<f32>,
        max_x: Vec<f32>,
        max_y: Vec<f32>,
        ids: Vec<i32>,
        mbr: Rect,
    ) -> Self {
        Node {
            level,
            entry_count,
            min_x,
            min_y,
            max_x,
            max_y,
            ids,
            mbr,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_entry_updates_count_but_not_mbr_automatically() {
        let mut n = Node::new(1, 4);
        n.add_entry(Rect::new(0.0, 0.0, 1.0, 1.0), 7);
        assert_eq!(n.entry_count, 1);
        assert_eq!(n.entry_id(0), 7);
        assert_eq!(n.mbr, Rect::empty());
        n.recalculate_mbr();
        assert_eq!(n.mbr, Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    #[should_panic(expected = "full")]
    fn add_entry_panics_when_full() {
        let mut n = Node::new(1, 1);
        n.add_entry(Rect::new(0.0, 0.0, 1.0, 1.0), 1);
        n.add_entry(Rect::new(0.0, 0.0, 1.0, 1.0), 2);
    }

    #[test]
    fn compact_removes_vacated_slots_and_preserves_order() {
        let mut n = Node::new(1, 4);
        n.add_entry(Rect::new(0.0, 0.0, 1.0, 1.0), 1);
        n.add_entry(Rect::new(1.0, 1.0, 2.0, 2.0), 2);
        n.add_entry(Rect::new(2.0, 2.0, 3.0, 3.0), 3);
        n.vacate(1);
        n.compact();
        assert_eq!(n.entry_count, 2);
        assert_eq!(n.entry_id(0), 1);
        assert_eq!(n.entry_id(1), 3);
    }

    #[test]
    fn delete_entry_swaps_with_last() {
        let mut n = Node::new(1, 4);
        n.add_entry(Rect::new(0.0, 0.0, 1.0, 1.0), 1);
        n.add_entry(Rect::new(1.0, 1.0, 2.0, 2.0), 2);
        n.add_entry(Rect::new(2.0, 2.0, 3.0, 3.0), 3);
        n.delete_entry(0);
        assert_eq!(n.entry_count, 2);
        assert_eq!(n.entry_id(0), 3);
        assert_eq!(n.entry_id(1), 2);
    }
}
