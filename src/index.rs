//! ## Frozen index
//!
//! An immutable snapshot of an [`crate::rtree::RTree`], produced by
//! [`crate::rtree::RTree::to_index`]. Always compacts away any arena holes
//! left by deletions and remaps every node id to a dense `0..n` range — the
//! open question of whether freezing should support an uncompacted variant
//! is resolved in favor of always compacting (see `DESIGN.md`), since an
//! index that outlives its mutable twin has no further use for holes kept
//! only to cushion future inserts.
//!
//! Being immutable, a `FrozenIndex` supports concurrent reads: its query
//! methods take `&self` and allocate their own traversal scratch per call,
//! unlike [`crate::rtree::RTree`]'s queries, which reuse instance-level
//! scratch under a non-reentrancy contract.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::geometry::{Point, Rect};
use crate::node::Node;
use crate::traversal::{self, NodeSource};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable, compacted R-tree snapshot.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FrozenIndex {
    nodes: Vec<Node>,
    root_id: u32,
    size: i32,
}

impl NodeSource for FrozenIndex {
    fn node(&self, id: u32) -> &Node {
        &self.nodes[id as usize]
    }
    fn root_id(&self) -> u32 {
        self.root_id
    }
}

impl FrozenIndex {
    /// Builds a dense, id-remapped snapshot from a (possibly sparse) arena.
    /// Visits live nodes breadth-first from `old_root`, assigning each a new
    /// id in discovery order, then rewrites every internal node's child ids
    /// through the resulting map. Leaf entry ids (payload ids, not node ids)
    /// are left untouched.
    pub(crate) fn from_arena(arena: Vec<Option<Node>>, old_root: u32, size: i32) -> Self {
        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut order: Vec<u32> = vec![old_root];
        remap.insert(old_root, 0);

        let mut queue: VecDeque<u32> = VecDeque::new();
        queue.push_back(old_root);
        while let Some(old_id) = queue.pop_front() {
            let node = arena[old_id as usize]
                .as_ref()
                .expect("arena entry for a live node must be present");
            if !node.is_leaf() {
                for (_, child_id) in node.entries() {
                    let child_id = child_id as u32;
                    if let std::collections::hash_map::Entry::Vacant(e) = remap.entry(child_id) {
                        e.insert(order.len() as u32);
                        order.push(child_id);
                        queue.push_back(child_id);
                    }
                }
            }
        }

        let mut dense: Vec<Node> = Vec::with_capacity(order.len());
        for &old_id in &order {
            let mut node = arena[old_id as usize]
                .clone()
                .expect("arena entry for a live node must be present");
            if !node.is_leaf() {
                for i in 0..node.entry_count {
                    let old_child = node.entry_id(i);
                    if old_child != -1 {
                        let new_child = remap[&(old_child as u32)];
                        node.ids[i] = new_child as i32;
                    }
                }
            }
            dense.push(node);
        }

        debug!(nodes = dense.len(), size, "compacted arena into FrozenIndex");
        FrozenIndex {
            nodes: dense,
            root_id: 0,
            size,
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn bounds(&self) -> Option<Rect> {
        if self.size == 0 {
            None
        } else {
            Some(self.nodes[self.root_id as usize].mbr)
        }
    }

    pub fn intersects(&self, query: &Rect, mut cb: impl FnMut(i32) -> bool) {
        traversal::intersects(self, query, &mut cb);
    }

    pub fn contains(&self, query: &Rect, mut cb: impl FnMut(i32) -> bool) {
        let mut parents = Vec::new();
        let mut parents_entry = Vec::new();
        traversal::contains(self, query, &mut parents, &mut parents_entry, &mut cb);
    }

    pub fn nearest(&self, point: &Point, furthest_distance: f32, mut cb: impl FnMut(i32) -> bool) {
        let mut scratch = Vec::new();
        traversal::nearest(self, point, furthest_distance, &mut scratch, &mut cb);
    }

    pub fn nearest_n(
        &self,
        point: &Point,
        count: usize,
        furthest_distance: f32,
        mut cb: impl FnMut(i32) -> bool,
    ) {
        let mut parents = Vec::new();
        let mut parents_entry = Vec::new();
        traversal::nearest_n(
            self,
            point,
            count,
            furthest_distance,
            true,
            &mut parents,
            &mut parents_entry,
            &mut cb,
        );
    }

    pub fn nearest_n_unsorted(
        &self,
        point: &Point,
        count: usize,
        furthest_distance: f32,
        mut cb: impl FnMut(i32) -> bool,
    ) {
        let mut parents = Vec::new();
        let mut parents_entry = Vec::new();
        traversal::nearest_n(
            self,
            point,
            count,
            furthest_distance,
            false,
            &mut parents,
            &mut parents_entry,
            &mut cb,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtree::RTree;

    #[test]
    fn freezing_preserves_query_results() {
        let mut tree = RTree::new();
        for i in 0..20 {
            tree.add(Rect::new(i as f32, i as f32, i as f32, i as f32), i);
        }
        let index = tree.to_index();
        assert_eq!(index.size(), 20);

        let mut seen = Vec::new();
        index.contains(&Rect::new(0.0, 0.0, 19.0, 19.0), |id| {
            seen.push(id);
            true
        });
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn freezing_an_empty_tree_has_no_bounds() {
        let tree = RTree::new();
        let index = tree.to_index();
        assert_eq!(index.size(), 0);
        assert!(index.bounds().is_none());
    }

    #[test]
    fn frozen_nearest_matches_sorted_order() {
        let mut tree = RTree::with_config(crate::rtree::RTreeConfig::from_pairs(4, 2));
        for i in 0..30 {
            tree.add(Rect::new(i as f32, 0.0, i as f32, 0.0), i);
        }
        let index = tree.to_index();
        let mut hits = Vec::new();
        index.nearest_n(&Point::new(0.0, 0.0), 3, f32::INFINITY, |id| {
            hits.push(id);
            true
        });
        assert_eq!(hits, vec![0, 1, 2]);
    }
}
