//! ## The R-tree core
//!
//! A Guttman R-tree over a flat [`Node`] arena addressed by small integer
//! ids, rather than the teacher's tree of boxed nodes. `add`/`delete` are
//! the only mutating operations; everything else (`intersects`, `contains`,
//! `nearest`, `nearest_n`, `nearest_n_unsorted`) is delegated to
//! [`crate::traversal`] through the [`crate::traversal::NodeSource`] impl
//! below.
//!
//! Per the non-reentrancy contract: `parents`, `parents_entry` and
//! `entry_status` are scratch fields reused across calls rather than
//! allocated fresh each time, the same hoist-to-instance-fields shape the
//! teacher's own search helpers use for their candidate buffers. No
//! mutating method may be invoked reentrantly from within a query callback
//! on the same tree.

use tracing::{debug, info, warn};

use crate::exceptions::RtreeError;
use crate::geometry::{self, Point, Rect};
use crate::index::FrozenIndex;
use crate::node::Node;
use crate::traversal::{self, NodeSource};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning knobs for node fan-out. `max_node_entries` must be at least 2;
/// `min_node_entries` must be in `[1, max_node_entries / 2]`. Out-of-range
/// values are never fatal — see [`RTree::with_config`] and
/// [`RTree::try_with_config`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RTreeConfig {
    pub max_node_entries: usize,
    pub min_node_entries: usize,
}

impl Default for RTreeConfig {
    fn default() -> Self {
        RTreeConfig {
            max_node_entries: 50,
            min_node_entries: 20,
        }
    }
}

impl RTreeConfig {
    pub fn from_pairs(max_node_entries: usize, min_node_entries: usize) -> Self {
        RTreeConfig {
            max_node_entries,
            min_node_entries,
        }
    }
}

fn clamp_config(config: RTreeConfig) -> (RTreeConfig, Vec<RtreeError>) {
    let default = RTreeConfig::default();
    let mut errors = Vec::new();

    let max_node_entries = if config.max_node_entries < 2 {
        errors.push(RtreeError::InvalidConfiguration {
            field: "max_node_entries",
            value: config.max_node_entries as i32,
            default: default.max_node_entries as i32,
        });
        default.max_node_entries
    } else {
        config.max_node_entries
    };

    let upper_bound = max_node_entries / 2;
    let min_node_entries = if config.min_node_entries < 1 || config.min_node_entries > upper_bound
    {
        let clamped_default = default.min_node_entries.min(upper_bound).max(1);
        errors.push(RtreeError::InvalidConfiguration {
            field: "min_node_entries",
            value: config.min_node_entries as i32,
            default: clamped_default as i32,
        });
        clamped_default
    } else {
        config.min_node_entries
    };

    (
        RTreeConfig {
            max_node_entries,
            min_node_entries,
        },
        errors,
    )
}

/// Owns every [`Node`] in the tree behind a small integer id, with a free
/// list so ids released by deletion/compaction get reused before the arena
/// grows further.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) struct NodeArena {
    pub(crate) nodes: Vec<Option<Node>>,
    free: Vec<u32>,
}

impl NodeArena {
    fn alloc(&mut self, node: Node) -> u32 {
        if let Some(id) = self.free.pop() {
            self.nodes[id as usize] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            (self.nodes.len() - 1) as u32
        }
    }

    fn get(&self, id: u32) -> &Node {
        self.nodes[id as usize]
            .as_ref()
            .expect("node id refers to a released node")
    }

    fn get_mut(&mut self, id: u32) -> &mut Node {
        self.nodes[id as usize]
            .as_mut()
            .expect("node id refers to a released node")
    }

    fn release(&mut self, id: u32) {
        self.nodes[id as usize] = None;
        self.free.push(id);
    }

    /// Rebuilds an arena from its raw parts, as read back by [`crate::wire`].
    pub(crate) fn from_parts(nodes: Vec<Option<Node>>, free: Vec<u32>) -> Self {
        NodeArena { nodes, free }
    }
}

/// An in-memory, dynamically-updatable 2D R-tree indexing integer ids by
/// axis-aligned bounding rectangle.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RTree {
    pub(crate) config: RTreeConfig,
    pub(crate) arena: NodeArena,
    pub(crate) root_id: u32,
    pub(crate) height: i32,
    pub(crate) size: i32,
    #[cfg_attr(feature = "serde", serde(skip))]
    parents: Vec<u32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    parents_entry: Vec<i32>,
    #[cfg_attr(feature = "serde", serde(skip))]
    entry_status: Vec<u8>,
}

impl NodeSource for RTree {
    fn node(&self, id: u32) -> &Node {
        self.arena.get(id)
    }
    fn root_id(&self) -> u32 {
        self.root_id
    }
}

impl Default for RTree {
    fn default() -> Self {
        Self::new()
    }
}

impl RTree {
    pub fn new() -> Self {
        Self::with_config(RTreeConfig::default())
    }

    /// Builds a tree from `config`, clamping any out-of-range field to its
    /// default and logging a warning — never fatal.
    pub fn with_config(config: RTreeConfig) -> Self {
        let (clamped, errors) = clamp_config(config);
        for e in &errors {
            warn!("{e}");
        }
        Self::from_clamped(clamped)
    }

    /// Like [`RTree::with_config`], but also returns the diagnostics for any
    /// field that had to be substituted.
    pub fn try_with_config(config: RTreeConfig) -> (Self, Vec<RtreeError>) {
        let (clamped, errors) = clamp_config(config);
        (Self::from_clamped(clamped), errors)
    }

    fn from_clamped(config: RTreeConfig) -> Self {
        let mut arena = NodeArena::default();
        let root_id = arena.alloc(Node::new(1, config.max_node_entries));
        info!(?config, "created new RTree");
        RTree {
            config,
            arena,
            root_id,
            height: 1,
            size: 0,
            parents: Vec::new(),
            parents_entry: Vec::new(),
            entry_status: Vec::new(),
        }
    }

    /// Reassembles a tree from its raw parts, as read back by [`crate::wire`].
    pub(crate) fn from_parts(
        config: RTreeConfig,
        arena: NodeArena,
        root_id: u32,
        height: i32,
        size: i32,
    ) -> Self {
        RTree {
            config,
            arena,
            root_id,
            height,
            size,
            parents: Vec::new(),
            parents_entry: Vec::new(),
            entry_status: Vec::new(),
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn config(&self) -> RTreeConfig {
        self.config
    }

    /// The tree's overall bounding rectangle, or `None` if empty.
    pub fn bounds(&self) -> Option<Rect> {
        if self.size == 0 {
            None
        } else {
            Some(self.arena.get(self.root_id).mbr)
        }
    }

    /// Resets the tree to a single empty leaf root, keeping the same config.
    pub fn clear(&mut self) {
        *self = Self::with_config(self.config);
    }

    // ---- queries (shared traversal base) -------------------------------

    pub fn intersects(&self, query: &Rect, mut cb: impl FnMut(i32) -> bool) {
        traversal::intersects(self, query, &mut cb);
    }

    pub fn contains(&mut self, query: &Rect, mut cb: impl FnMut(i32) -> bool) {
        let mut local_parents = std::mem::take(&mut self.parents);
        let mut local_entry = std::mem::take(&mut self.parents_entry);
        traversal::contains(&*self, query, &mut local_parents, &mut local_entry, &mut cb);
        self.parents = local_parents;
        self.parents_entry = local_entry;
    }

    pub fn nearest(&mut self, point: &Point, furthest_distance: f32, mut cb: impl FnMut(i32) -> bool) {
        let mut scratch: Vec<i32> = Vec::new();
        traversal::nearest(self, point, furthest_distance, &mut scratch, &mut cb);
    }

    pub fn nearest_n(
        &mut self,
        point: &Point,
        count: usize,
        furthest_distance: f32,
        mut cb: impl FnMut(i32) -> bool,
    ) {
        let mut local_parents = std::mem::take(&mut self.parents);
        let mut local_entry = std::mem::take(&mut self.parents_entry);
        traversal::nearest_n(
            &*self,
            point,
            count,
            furthest_distance,
            true,
            &mut local_parents,
            &mut local_entry,
            &mut cb,
        );
        self.parents = local_parents;
        self.parents_entry = local_entry;
    }

    pub fn nearest_n_unsorted(
        &mut self,
        point: &Point,
        count: usize,
        furthest_distance: f32,
        mut cb: impl FnMut(i32) -> bool,
    ) {
        let mut local_parents = std::mem::take(&mut self.parents);
        let mut local_entry = std::mem::take(&mut self.parents_entry);
        traversal::nearest_n(
            &*self,
            point,
            count,
            furthest_distance,
            false,
            &mut local_parents,
            &mut local_entry,
            &mut cb,
        );
        self.parents = local_parents;
        self.parents_entry = local_entry;
    }

    // ---- mutation --------------------------------------------------------

    /// Inserts `rect` under `id` as a new leaf entry.
    pub fn add(&mut self, rect: Rect, id: i32) {
        debug!(id, ?rect, "add");
        self.insert_entry(rect, id, 1);
        self.size += 1;
    }

    /// Deletes the leaf entry matching both `rect` exactly and `id`. Returns
    /// `true` if an entry was removed. If more than one entry matches, an
    /// unspecified one of them is removed (duplicate (rect, id) pairs are a
    /// non-goal — see the crate's top-level docs).
    pub fn delete(&mut self, rect: Rect, id: i32) -> bool {
        debug!(id, ?rect, "delete");
        match self.find_leaf(rect, id) {
            None => false,
            Some((leaf, slot)) => {
                {
                    let node = self.arena.get_mut(leaf);
                    node.delete_entry(slot);
                    node.recalculate_mbr();
                }
                self.condense_tree(leaf);
                self.size -= 1;

                while !self.arena.get(self.root_id).is_leaf()
                    && self.arena.get(self.root_id).entry_count == 1
                {
                    let old_root = self.root_id;
                    let only_child = self.arena.get(old_root).entry_id(0) as u32;
                    self.root_id = only_child;
                    self.height -= 1;
                    self.arena.release(old_root);
                }
                if self.size == 0 {
                    self.arena.get_mut(self.root_id).mbr = Rect::empty();
                }
                true
            }
        }
    }

    /// Consumes the tree and returns an immutable, compacted, id-remapped
    /// [`FrozenIndex`] snapshot sharing the same query logic.
    pub fn to_index(self) -> FrozenIndex {
        info!(size = self.size, "freezing RTree into a FrozenIndex");
        FrozenIndex::from_arena(self.arena.nodes, self.root_id, self.size)
    }

    // ---- insertion internals ---------------------------------------------

    /// Inserts `(rect, id)` as an entry of a node at the given `level`
    /// (`1` for ordinary leaf entries; higher for entries reinserted during
    /// condensation). Does not touch `size` — only [`RTree::add`] does.
    fn insert_entry(&mut self, rect: Rect, id: i32, level: i32) {
        let chosen = self.choose_node(rect, level);
        let is_full = self.arena.get(chosen).is_full();
        let sibling = if is_full {
            Some(self.split_node(chosen, rect, id))
        } else {
            let node = self.arena.get_mut(chosen);
            node.add_entry(rect, id);
            node.recalculate_mbr();
            None
        };
        self.adjust_tree(chosen, sibling);
    }

    /// Descends from the root to the node at `level`, at each step choosing
    /// the child requiring least enlargement to cover `rect` (ties broken by
    /// smaller area). Records the descent path into `self.parents` /
    /// `self.parents_entry` for [`RTree::adjust_tree`] to walk back up.
    fn choose_node(&mut self, rect: Rect, level: i32) -> u32 {
        self.parents.clear();
        self.parents_entry.clear();

        let mut node_id = self.root_id;
        loop {
            let node = self.arena.get(node_id);
            if node.level == level {
                return node_id;
            }

            let mut best_i = 0usize;
            let mut best_enlargement = f32::INFINITY;
            let mut best_area = f32::INFINITY;
            for i in 0..node.entry_count {
                let child_rect = node.entry_rect(i);
                let enlargement = geometry::enlargement(&child_rect, &rect);
                let area = geometry::area(&child_rect);
                if enlargement < best_enlargement
                    || (enlargement == best_enlargement && area < best_area)
                {
                    best_enlargement = enlargement;
                    best_area = area;
                    best_i = i;
                }
            }

            self.parents.push(node_id);
            self.parents_entry.push(best_i as i32);
            node_id = node.entry_id(best_i) as u32;
        }
    }

    /// Walks back up the path recorded by `choose_node`/`find_leaf`, fixing
    /// each ancestor's entry for `node_id` and, if a split produced a
    /// sibling, either appending it to the parent or splitting the parent in
    /// turn. Grows a new root if the split propagates past the old one.
    fn adjust_tree(&mut self, mut node_id: u32, mut sibling_id: Option<u32>) {
        loop {
            let parent_id = match self.parents.pop() {
                None => break,
                Some(p) => p,
            };
            let entry_index = self.parents_entry.pop().unwrap() as usize;

            let child_rect = self.arena.get(node_id).mbr;
            self.arena
                .get_mut(parent_id)
                .set_entry(entry_index, child_rect, node_id as i32);

            if let Some(sib) = sibling_id {
                let sib_rect = self.arena.get(sib).mbr;
                if !self.arena.get(parent_id).is_full() {
                    let parent = self.arena.get_mut(parent_id);
                    parent.add_entry(sib_rect, sib as i32);
                    parent.recalculate_mbr();
                    sibling_id = None;
                } else {
                    let new_sib = self.split_node(parent_id, sib_rect, sib as i32);
                    sibling_id = Some(new_sib);
                }
            } else {
                self.arena.get_mut(parent_id).recalculate_mbr();
            }

            node_id = parent_id;
        }

        if let Some(sib) = sibling_id {
            let old_root = self.root_id;
            let new_level = self.arena.get(old_root).level + 1;
            let mut new_root = Node::new(new_level, self.config.max_node_entries);
            let old_root_rect = self.arena.get(old_root).mbr;
            let sib_rect = self.arena.get(sib).mbr;
            new_root.add_entry(old_root_rect, old_root as i32);
            new_root.add_entry(sib_rect, sib as i32);
            new_root.recalculate_mbr();
            self.root_id = self.arena.alloc(new_root);
            self.height += 1;
            debug!(height = self.height, "root split, tree grew a level");
        }
    }

    /// Quadratic-cost split of the full node `n_id`, plus the floating new
    /// entry `(new_rect, new_id)` that triggered it. Returns the id of the
    /// newly allocated sibling node; `n_id` keeps its own identity and ends
    /// up holding the other half.
    ///
    /// `n_id`'s original slots stay resident in place until routed away
    /// (vacated, tracked in `n_free_slots`, then compacted at the end); the
    /// floating new entry occupies whichever slot vacating the seed that
    /// went to the sibling freed up first.
    fn split_node(&mut self, n_id: u32, new_rect: Rect, new_id: i32) -> u32 {
        debug!(n_id, "splitting full node");
        let max_entries = self.config.max_node_entries;
        let min_entries = self.config.min_node_entries;
        let level = self.arena.get(n_id).level;
        let new_candidate = max_entries;

        let mut cand_rects: Vec<Rect> = Vec::with_capacity(max_entries + 1);
        {
            let n = self.arena.get(n_id);
            for i in 0..max_entries {
                cand_rects.push(n.entry_rect(i));
            }
        }
        cand_rects.push(new_rect);

        let fetch = |arena: &NodeArena, i: usize| -> (Rect, i32) {
            if i == new_candidate {
                (new_rect, new_id)
            } else {
                let n = arena.get(n_id);
                (n.entry_rect(i), n.entry_id(i))
            }
        };

        let (hl_idx, lh_idx) = pick_seeds(&cand_rects);

        self.entry_status.clear();
        self.entry_status.resize(max_entries + 1, 0u8);

        let new_node_id = self.arena.alloc(Node::new(level, max_entries));
        let mut n_free_slots: Vec<usize> = Vec::new();

        // Track each group's MBR as the union of only the entries actually
        // routed to it so far, rather than recomputing from the physical
        // node contents — `n_id`'s slots still hold every not-yet-routed
        // entry until the loop below reassigns or vacates them, so its raw
        // `recalculate_mbr()` would cover the whole candidate set instead of
        // the group-under-construction the quadratic split is supposed to
        // grow one entry at a time.
        let mut n_mbr;
        let mut new_mbr;

        // Seed 1: highestLow always goes to the new sibling.
        {
            let (r, id) = fetch(&self.arena, hl_idx);
            let sibling = self.arena.get_mut(new_node_id);
            sibling.add_entry(r, id);
            new_mbr = r;
        }
        if hl_idx < max_entries {
            self.arena.get_mut(n_id).vacate(hl_idx);
            n_free_slots.push(hl_idx);
        }
        self.entry_status[hl_idx] = 2;

        // Seed 2: lowestHigh stays with (or is moved into) n.
        {
            let (r, id) = fetch(&self.arena, lh_idx);
            if lh_idx == new_candidate {
                let slot = n_free_slots.pop().expect(
                    "the highestLow seed always frees a slot before lowestHigh needs one",
                );
                self.arena.get_mut(n_id).set_entry(slot, r, id);
            }
            n_mbr = r;
        }
        self.entry_status[lh_idx] = 1;

        let mut remaining: Vec<usize> = (0..=max_entries)
            .filter(|&i| self.entry_status[i] == 0)
            .collect();

        while !remaining.is_empty() {
            let n_count = self.arena.get(n_id).entry_count - n_free_slots.len();
            let new_count = self.arena.get(new_node_id).entry_count;

            if n_count + remaining.len() == min_entries {
                for &i in &remaining {
                    let (r, id) = fetch(&self.arena, i);
                    if i == new_candidate {
                        let slot = n_free_slots
                            .pop()
                            .expect("a free slot must exist for the new entry");
                        self.arena.get_mut(n_id).set_entry(slot, r, id);
                    }
                    n_mbr = geometry::union(&n_mbr, &r);
                }
                break;
            }
            if new_count + remaining.len() == min_entries {
                for &i in &remaining {
                    let (r, id) = fetch(&self.arena, i);
                    if i != new_candidate {
                        self.arena.get_mut(n_id).vacate(i);
                    }
                    self.arena.get_mut(new_node_id).add_entry(r, id);
                    new_mbr = geometry::union(&new_mbr, &r);
                }
                break;
            }

            let mut best_pos = 0usize;
            let mut best_diff = f32::NEG_INFINITY;
            let mut route_a = 0.0f32;
            let mut route_b = 0.0f32;
            for (pos, &i) in remaining.iter().enumerate() {
                let (r, _) = fetch(&self.arena, i);
                let enlarge_a = geometry::enlargement(&n_mbr, &r);
                let enlarge_b = geometry::enlargement(&new_mbr, &r);
                let diff = (enlarge_a - enlarge_b).abs();
                if diff > best_diff {
                    best_diff = diff;
                    best_pos = pos;
                    route_a = enlarge_a;
                    route_b = enlarge_b;
                }
            }
            let i = remaining.remove(best_pos);
            let (r, id) = fetch(&self.arena, i);

            let goes_to_n = if route_a != route_b {
                route_a < route_b
            } else {
                let area_a = geometry::area(&n_mbr);
                let area_b = geometry::area(&new_mbr);
                if area_a != area_b {
                    area_a < area_b
                } else {
                    let n_count2 = self.arena.get(n_id).entry_count - n_free_slots.len();
                    let new_count2 = self.arena.get(new_node_id).entry_count;
                    n_count2 < new_count2
                }
            };

            if goes_to_n {
                if i == new_candidate {
                    let slot = n_free_slots
                        .pop()
                        .expect("a free slot must exist for the new entry");
                    self.arena.get_mut(n_id).set_entry(slot, r, id);
                }
                n_mbr = geometry::union(&n_mbr, &r);
                self.entry_status[i] = 1;
            } else {
                if i != new_candidate {
                    self.arena.get_mut(n_id).vacate(i);
                    n_free_slots.push(i);
                }
                let sibling = self.arena.get_mut(new_node_id);
                sibling.add_entry(r, id);
                new_mbr = geometry::union(&new_mbr, &r);
                self.entry_status[i] = 2;
            }
        }

        self.arena.get_mut(n_id).compact();
        self.arena.get_mut(n_id).mbr = n_mbr;
        self.arena.get_mut(new_node_id).mbr = new_mbr;
        new_node_id
    }

    // ---- deletion internals -----------------------------------------------

    /// Non-recursive contains-guided descent to the leaf entry matching both
    /// `rect` exactly and `id`. Leaves `self.parents`/`self.parents_entry`
    /// holding the path from the leaf's parent up to the root, for
    /// `condense_tree` to walk.
    fn find_leaf(&mut self, rect: Rect, id: i32) -> Option<(u32, usize)> {
        self.parents.clear();
        self.parents.push(self.root_id);
        self.parents_entry.clear();
        self.parents_entry.push(-1);

        loop {
            let node_id = match self.parents.last() {
                Some(&id) => id,
                None => return None,
            };
            let node = self.arena.get(node_id);
            let start = (*self.parents_entry.last().unwrap() + 1) as usize;

            if !node.is_leaf() {
                let mut descended = false;
                for i in start..node.entry_count {
                    let child_rect = node.entry_rect(i);
                    if geometry::contains(&child_rect, &rect) {
                        *self.parents_entry.last_mut().unwrap() = i as i32;
                        self.parents.push(node.entry_id(i) as u32);
                        self.parents_entry.push(-1);
                        descended = true;
                        break;
                    }
                }
                if !descended {
                    self.parents.pop();
                    self.parents_entry.pop();
                }
            } else {
                let mut found = None;
                for i in 0..node.entry_count {
                    if node.entry_id(i) == id && node.entry_rect(i) == rect {
                        found = Some(i);
                        break;
                    }
                }
                self.parents.pop();
                self.parents_entry.pop();
                if let Some(slot) = found {
                    return Some((node_id, slot));
                }
            }
        }
    }

    /// Walks from `node_id` up to the root (using the path left by
    /// `find_leaf`), removing and queuing for reinsertion any non-root node
    /// that fell under `min_node_entries`, and tightening ancestor MBRs
    /// otherwise.
    fn condense_tree(&mut self, mut node_id: u32) {
        let min_entries = self.config.min_node_entries;
        let mut eliminated: Vec<u32> = Vec::new();

        loop {
            let parent_id = match self.parents.pop() {
                None => break,
                Some(p) => p,
            };
            let entry_index = self.parents_entry.pop().unwrap() as usize;
            let entry_count = self.arena.get(node_id).entry_count;

            if entry_count < min_entries {
                let parent = self.arena.get_mut(parent_id);
                parent.delete_entry(entry_index);
                parent.recalculate_mbr();
                eliminated.push(node_id);
            } else {
                let rect = self.arena.get(node_id).mbr;
                let parent = self.arena.get_mut(parent_id);
                parent.set_entry(entry_index, rect, node_id as i32);
                parent.recalculate_mbr();
            }

            node_id = parent_id;
        }

        // the root is exempt from the min-entries invariant; just keep its
        // cached MBR current.
        self.arena.get_mut(self.root_id).recalculate_mbr();

        for elim in eliminated {
            let level = self.arena.get(elim).level;
            let entries: Vec<(Rect, i32)> = self.arena.get(elim).entries().collect();
            debug!(
                node = elim,
                level,
                count = entries.len(),
                "reinserting orphaned entries"
            );
            for (rect, id) in entries {
                self.insert_entry(rect, id, level);
            }
            self.arena.release(elim);
        }
    }
}

/// Chooses the pair of candidates with the greatest normalized separation in
/// either dimension (the one going on to become `highestLow`, routed to the
/// new sibling, and `lowestHigh`, staying with `n`). Falls back to a
/// min-y/max-x tie-break when both indices coincide in a dimension (e.g. all
/// candidates share the same coordinate on that axis), and treats a
/// zero-span dimension as separation `1.0` so it never dominates a
/// non-degenerate one.
fn pick_seeds(cand_rects: &[Rect]) -> (usize, usize) {
    let mut mbr = Rect::empty();
    for r in cand_rects {
        mbr = geometry::union(&mbr, r);
    }

    let mut best_separation = f32::NEG_INFINITY;
    let mut best_pair = (0usize, if cand_rects.len() > 1 { 1 } else { 0 });

    for dim in 0..2 {
        let span = if dim == 0 {
            mbr.max_x - mbr.min_x
        } else {
            mbr.max_y - mbr.min_y
        };

        let mut highest_low_idx = 0usize;
        let mut highest_low_val = f32::NEG_INFINITY;
        let mut lowest_high_idx = 0usize;
        let mut lowest_high_val = f32::INFINITY;

        for (i, r) in cand_rects.iter().enumerate() {
            let (low, high) = if dim == 0 {
                (r.min_x, r.max_x)
            } else {
                (r.min_y, r.max_y)
            };
            if low > highest_low_val {
                highest_low_val = low;
                highest_low_idx = i;
            }
            if high < lowest_high_val {
                lowest_high_val = high;
                lowest_high_idx = i;
            }
        }

        let (mut hl_idx, mut lh_idx) = (highest_low_idx, lowest_high_idx);
        if hl_idx == lh_idx {
            let mut min_y_idx = 0usize;
            let mut min_y_val = cand_rects[0].min_y;
            let mut max_x_idx = 0usize;
            let mut max_x_val = cand_rects[0].max_x;
            for (i, r) in cand_rects.iter().enumerate().skip(1) {
                if r.min_y < min_y_val {
                    min_y_val = r.min_y;
                    min_y_idx = i;
                }
                if r.max_x > max_x_val {
                    max_x_val = r.max_x;
                    max_x_idx = i;
                }
            }
            hl_idx = min_y_idx;
            lh_idx = max_x_idx;
            if hl_idx == lh_idx {
                lh_idx = if hl_idx == 0 { 1 } else { 0 };
            }
        }

        let separation = if span == 0.0 {
            1.0
        } else {
            (highest_low_val - lowest_high_val) / span
        };

        if separation > best_separation {
            best_separation = separation;
            best_pair = (hl_idx, lh_idx);
        }
    }

    best_pair
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32) -> Rect {
        Rect::new(x, y, x, y)
    }

    #[test]
    fn new_tree_is_empty() {
        let tree = RTree::new();
        assert_eq!(tree.size(), 0);
        assert_eq!(tree.height(), 1);
        assert!(tree.bounds().is_none());
    }

    #[test]
    fn add_then_intersects_finds_entry() {
        let mut tree = RTree::new();
        tree.add(Rect::new(0.0, 0.0, 2.0, 2.0), 1);
        let mut hits = Vec::new();
        tree.intersects(&Rect::new(1.0, 1.0, 3.0, 3.0), |id| {
            hits.push(id);
            true
        });
        assert_eq!(hits, vec![1]);
        assert_eq!(tree.size(), 1);
    }

    #[test]
    fn invalid_config_clamps_with_diagnostics() {
        let (tree, errors) = RTree::try_with_config(RTreeConfig::from_pairs(1, 1));
        assert_eq!(errors.len(), 1);
        assert_eq!(tree.config().max_node_entries, 50);
    }

    #[test]
    fn splitting_keeps_every_entry_reachable() {
        let mut tree = RTree::with_config(RTreeConfig::from_pairs(4, 2));
        for i in 0..50 {
            let x = i as f32;
            tree.add(rect(x, x), i);
        }
        assert_eq!(tree.size(), 50);
        assert!(tree.height() > 1);

        let mut seen = Vec::new();
        tree.contains(&Rect::new(0.0, 0.0, 49.0, 49.0), |id| {
            seen.push(id);
            true
        });
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn delete_removes_entry_and_shrinks_size() {
        let mut tree = RTree::with_config(RTreeConfig::from_pairs(4, 2));
        for i in 0..30 {
            tree.add(rect(i as f32, i as f32), i);
        }
        assert!(tree.delete(rect(10.0, 10.0), 10));
        assert_eq!(tree.size(), 29);
        assert!(!tree.delete(rect(10.0, 10.0), 10));

        let mut seen = Vec::new();
        tree.contains(&Rect::new(0.0, 0.0, 29.0, 29.0), |id| {
            seen.push(id);
            true
        });
        assert!(!seen.contains(&10));
        assert_eq!(seen.len(), 29);
    }

    #[test]
    fn insert_delete_sweep_keeps_size_consistent() {
        let mut tree = RTree::with_config(RTreeConfig::from_pairs(6, 3));
        for i in 0..1000 {
            tree.add(rect(i as f32, (i * 7 % 101) as f32), i);
        }
        assert_eq!(tree.size(), 1000);

        for i in (0..1000).step_by(2) {
            assert!(tree.delete(rect(i as f32, (i * 7 % 101) as f32), i));
        }
        assert_eq!(tree.size(), 500);

        let mut seen = Vec::new();
        tree.contains(&Rect::new(0.0, 0.0, 999.0, 100.0), |id| {
            seen.push(id);
            true
        });
        seen.sort_unstable();
        let expected: Vec<i32> = (0..1000).filter(|i| i % 2 == 1).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn clear_resets_to_empty_tree() {
        let mut tree = RTree::new();
        tree.add(rect(1.0, 1.0), 1);
        tree.clear();
        assert_eq!(tree.size(), 0);
        assert!(tree.bounds().is_none());
    }
}
