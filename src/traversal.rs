//! ## Shared traversal base
//!
//! The five query algorithms (`intersects`, `contains`, `nearest`, `nearest_n`,
//! `nearest_n_unsorted`), written once against the [`NodeSource`] capability
//! rather than against the mutable tree directly, so [`crate::rtree::RTree`]
//! and [`crate::index::FrozenIndex`] share one implementation. This mirrors
//! the teacher's `rtree_common` module, which abstracts a shared
//! `EntryAccess`/`NodeAccess` capability out of the R-tree and R*-tree so
//! both can reuse `search_node`/`delete_entry` — generalized here from "a
//! trait over a boxed node" to "a trait over fetch-by-id into an arena",
//! since this crate's nodes are held in a flat arena rather than linked by
//! `Box`.
//!
//! `contains` and `nearest_n`/`nearest_n_unsorted` are non-recursive: they
//! walk the tree with two parallel stacks, `parents` (node ids visited) and
//! `parents_entry` (the index of the child last descended into, `-1` means
//! "just arrived, start scanning from 0"). Callers own these buffers so a
//! non-reentrant caller can reuse the same allocation across calls (see
//! [`crate::rtree::RTree`]'s own `parents`/`parents_entry` fields).

use crate::geometry::{self, Point, Rect};
use crate::node::Node;
use crate::priority_queue::{PriorityQueue, SortOrder};

/// Capability a traversal needs: fetch a node by id, and know the root.
pub trait NodeSource {
    fn node(&self, id: u32) -> &Node;
    fn root_id(&self) -> u32;
}

fn sq(x: f32) -> f32 {
    x * x
}

/// Recursive descent guarded by `rect ∩ child.mbr ≠ ∅`.
pub fn intersects<S: NodeSource>(src: &S, query: &Rect, cb: &mut dyn FnMut(i32) -> bool) {
    intersects_rec(src, src.root_id(), query, cb);
}

fn intersects_rec<S: NodeSource>(
    src: &S,
    node_id: u32,
    query: &Rect,
    cb: &mut dyn FnMut(i32) -> bool,
) -> bool {
    let node = src.node(node_id);
    if node.is_leaf() {
        for i in 0..node.entry_count {
            let rect = node.entry_rect(i);
            if geometry::intersects(query, &rect) && !cb(node.entry_id(i)) {
                return false;
            }
        }
    } else {
        for i in 0..node.entry_count {
            let rect = node.entry_rect(i);
            if geometry::intersects(query, &rect)
                && !intersects_rec(src, node.entry_id(i) as u32, query, cb)
            {
                return false;
            }
        }
    }
    true
}

/// Non-recursive two-stack descent. At internal nodes, descends into
/// children whose MBR intersects `query`; at leaves, emits entries whose MBR
/// is contained by `query`.
pub fn contains<S: NodeSource>(
    src: &S,
    query: &Rect,
    parents: &mut Vec<u32>,
    parents_entry: &mut Vec<i32>,
    cb: &mut dyn FnMut(i32) -> bool,
) {
    parents.clear();
    parents.push(src.root_id());
    parents_entry.clear();
    parents_entry.push(-1);

    while let Some(&node_id) = parents.last() {
        let node = src.node(node_id);
        let start_index = (*parents_entry.last().unwrap() + 1) as usize;

        if !node.is_leaf() {
            let mut descended = false;
            for i in start_index..node.entry_count {
                let rect = node.entry_rect(i);
                if geometry::intersects(query, &rect) {
                    *parents_entry.last_mut().unwrap() = i as i32;
                    parents.push(node.entry_id(i) as u32);
                    parents_entry.push(-1);
                    descended = true;
                    break;
                }
            }
            if !descended {
                parents.pop();
                parents_entry.pop();
            }
        } else {
            for i in 0..node.entry_count {
                let rect = node.entry_rect(i);
                if geometry::contains(query, &rect) && !cb(node.entry_id(i)) {
                    return;
                }
            }
            parents.pop();
            parents_entry.pop();
        }
    }
}

/// Recursive descent tracking the currently known nearest squared distance
/// and the set of leaf ids sharing it; internal children are pruned once
/// their rectangle's distance to `point` exceeds the current best.
pub fn nearest<S: NodeSource>(
    src: &S,
    point: &Point,
    furthest_distance: f32,
    ids_scratch: &mut Vec<i32>,
    cb: &mut dyn FnMut(i32) -> bool,
) {
    let mut best = sq(furthest_distance);
    ids_scratch.clear();
    nearest_rec(src, src.root_id(), point, &mut best, ids_scratch);
    for &id in ids_scratch.iter() {
        if !cb(id) {
            return;
        }
    }
}

fn nearest_rec<S: NodeSource>(
    src: &S,
    node_id: u32,
    point: &Point,
    best: &mut f32,
    ids: &mut Vec<i32>,
) {
    let node = src.node(node_id);
    if node.is_leaf() {
        for i in 0..node.entry_count {
            let rect = node.entry_rect(i);
            let d = geometry::distance_sq(&rect, point);
            if d < *best {
                ids.clear();
                ids.push(node.entry_id(i));
                *best = d;
            } else if d == *best {
                ids.push(node.entry_id(i));
            }
        }
    } else {
        for i in 0..node.entry_count {
            let rect = node.entry_rect(i);
            if geometry::distance_sq(&rect, point) <= *best {
                nearest_rec(src, node.entry_id(i) as u32, point, best, ids);
            }
        }
    }
}

/// Shared non-recursive body for `nearest_n`/`nearest_n_unsorted`: gathers
/// candidates into a descending (worst-first) heap sized to `count`,
/// preserving ties at the cutoff distance via a side buffer, then either
/// flips the heap to ascending order (`sorted`) or drains it as-is.
pub fn nearest_n<S: NodeSource>(
    src: &S,
    point: &Point,
    count: usize,
    furthest_distance: f32,
    sorted: bool,
    parents: &mut Vec<u32>,
    parents_entry: &mut Vec<i32>,
    cb: &mut dyn FnMut(i32) -> bool,
) {
    if count == 0 {
        return;
    }

    let mut furthest_distance_sq = sq(furthest_distance);
    let mut heap = PriorityQueue::new(SortOrder::Descending);
    let mut saved_values: Vec<i32> = Vec::new();
    let mut saved_priority = 0.0f32;
    let mut has_saved = false;

    parents.clear();
    parents.push(src.root_id());
    parents_entry.clear();
    parents_entry.push(-1);

    while let Some(&node_id) = parents.last() {
        let node = src.node(node_id);
        let start_index = (*parents_entry.last().unwrap() + 1) as usize;

        if !node.is_leaf() {
            let mut descended = false;
            for i in start_index..node.entry_count {
                let rect = node.entry_rect(i);
                if geometry::distance_sq(&rect, point) <= furthest_distance_sq {
                    *parents_entry.last_mut().unwrap() = i as i32;
                    parents.push(node.entry_id(i) as u32);
                    parents_entry.push(-1);
                    descended = true;
                    break;
                }
            }
            if !descended {
                parents.pop();
                parents_entry.pop();
            }
        } else {
            for i in 0..node.entry_count {
                let rect = node.entry_rect(i);
                let d = geometry::distance_sq(&rect, point);
                if d <= furthest_distance_sq {
                    heap.insert(node.entry_id(i), d);
                }
            }

            while heap.size() > count {
                let (value, priority) = heap.pop().expect("size > count implies non-empty");
                if has_saved && priority == saved_priority {
                    saved_values.push(value);
                } else {
                    saved_values.clear();
                    saved_values.push(value);
                    saved_priority = priority;
                    has_saved = true;
                }
            }
            if heap.size() >= count {
                furthest_distance_sq = heap.get_priority().unwrap_or(furthest_distance_sq);
            }

            parents.pop();
            parents_entry.pop();
        }
    }

    // Only the saved buffer tied with the heap's current cutoff distance
    // belongs back in the result set; a saved priority strictly worse than
    // the cutoff was correctly trimmed away and must stay dropped.
    if has_saved && heap.get_priority() == Some(saved_priority) {
        for value in saved_values.drain(..) {
            heap.insert(value, saved_priority);
        }
    }

    if sorted {
        heap.set_sort_order(SortOrder::Ascending);
    }
    while let Some((value, _priority)) = heap.pop() {
        if !cb(value) {
            return;
        }
    }
}

/// Collects a query's results and sorts them by id — the orthogonal
/// decorator spec'd alongside the five query operations.
pub fn sorted_by_id(query: impl FnOnce(&mut dyn FnMut(i32) -> bool)) -> Vec<i32> {
    let mut ids = Vec::new();
    query(&mut |id| {
        ids.push(id);
        true
    });
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    struct FakeTree {
        nodes: Vec<Node>,
        root: u32,
    }
    impl NodeSource for FakeTree {
        fn node(&self, id: u32) -> &Node {
            &self.nodes[id as usize]
        }
        fn root_id(&self) -> u32 {
            self.root
        }
    }

    fn single_leaf_tree(entries: &[(Rect, i32)]) -> FakeTree {
        let mut leaf = Node::new(1, entries.len().max(1));
        for (rect, id) in entries {
            leaf.add_entry(*rect, *id);
        }
        leaf.recalculate_mbr();
        FakeTree {
            nodes: vec![leaf],
            root: 0,
        }
    }

    #[test]
    fn intersects_emits_overlapping_entries() {
        let tree = single_leaf_tree(&[
            (Rect::new(0.0, 0.0, 1.0, 1.0), 1),
            (Rect::new(5.0, 5.0, 6.0, 6.0), 2),
        ]);
        let mut hits = Vec::new();
        intersects(&tree, &Rect::new(-1.0, -1.0, 1.0, 1.0), &mut |id| {
            hits.push(id);
            true
        });
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn contains_emits_fully_enclosed_entries() {
        let tree = single_leaf_tree(&[
            (Rect::new(1.0, 1.0, 2.0, 2.0), 1),
            (Rect::new(0.0, 0.0, 100.0, 100.0), 2),
        ]);
        let mut parents = Vec::new();
        let mut parents_entry = Vec::new();
        let mut hits = Vec::new();
        contains(
            &tree,
            &Rect::new(0.0, 0.0, 10.0, 10.0),
            &mut parents,
            &mut parents_entry,
            &mut |id| {
                hits.push(id);
                true
            },
        );
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn nearest_returns_all_equidistant_entries() {
        let tree = single_leaf_tree(&[
            (Rect::new(0.0, 0.0, 0.0, 0.0), 1),
            (Rect::new(2.0, 0.0, 2.0, 0.0), 2),
            (Rect::new(0.0, 2.0, 0.0, 2.0), 3),
        ]);
        let mut scratch = Vec::new();
        let mut hits = Vec::new();
        nearest(&tree, &Point::new(1.0, 1.0), f32::INFINITY, &mut scratch, &mut |id| {
            hits.push(id);
            true
        });
        hits.sort_unstable();
        assert_eq!(hits, vec![1, 2, 3]);
    }

    #[test]
    fn nearest_n_sorted_is_non_decreasing() {
        let tree = single_leaf_tree(&[
            (Rect::new(5.0, 0.0, 5.0, 0.0), 1),
            (Rect::new(1.0, 0.0, 1.0, 0.0), 2),
            (Rect::new(3.0, 0.0, 3.0, 0.0), 3),
        ]);
        let mut parents = Vec::new();
        let mut parents_entry = Vec::new();
        let mut hits = Vec::new();
        nearest_n(
            &tree,
            &Point::new(0.0, 0.0),
            2,
            f32::INFINITY,
            true,
            &mut parents,
            &mut parents_entry,
            &mut |id| {
                hits.push(id);
                true
            },
        );
        assert_eq!(hits, vec![2, 3]);
    }
}
