//! ## Persisted state layout
//!
//! A bespoke fixed little-endian record format for saving and restoring a
//! [`crate::rtree::RTree`] to a byte stream — distinct from (and coexisting
//! with) the generic `serde`/`bincode` derive behind the `serde` feature.
//! Where `serde` gives an opaque, format-version-coupled encoding, this
//! module commits to one exact on-disk shape so it can be read back by any
//! conforming implementation, not just this crate's own (de)serializer.
//!
//! Layout, matching the column-major struct-of-arrays shape nodes are
//! already held in:
//!
//! - primitive-int array: `len: u32` then `len` little-endian `i32`s.
//! - primitive-float array: `len: u32` then `len` little-endian `f32`s.
//! - node record: `level: i32`, `entry_count: u32`, four float-arrays
//!   (`min_x`, `min_y`, `max_x`, `max_y`) of length `max_node_entries`, one
//!   int-array (`ids`) of length `max_node_entries`, four `f32`s for the
//!   cached MBR. An arena slot freed by deletion is written as a sentinel
//!   record with `level == -1` and empty arrays, and read back as a hole in
//!   the free list rather than a live node.
//! - tree header: `max_node_entries: u32`, `min_node_entries: u32`,
//!   `height: i32`, `root_node_id: u32`, `size: i32`, `node_count: u32`,
//!   followed by `node_count` packed node records.

use std::io::{self, Read, Write};

use crate::geometry::Rect;
use crate::node::Node;
use crate::rtree::{NodeArena, RTree, RTreeConfig};

fn write_i32_array(w: &mut impl Write, values: &[i32]) -> io::Result<()> {
    w.write_all(&(values.len() as u32).to_le_bytes())?;
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_i32_array(r: &mut impl Read) -> io::Result<Vec<i32>> {
    let len = read_u32(r)? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(read_i32(r)?);
    }
    Ok(out)
}

fn write_f32_array(w: &mut impl Write, values: &[f32]) -> io::Result<()> {
    w.write_all(&(values.len() as u32).to_le_bytes())?;
    for v in values {
        w.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn read_f32_array(r: &mut impl Read) -> io::Result<Vec<f32>> {
    let len = read_u32(r)? as usize;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(read_f32(r)?);
    }
    Ok(out)
}

fn write_u32(w: &mut impl Write, v: u32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_i32(w: &mut impl Write, v: i32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}
fn write_f32(w: &mut impl Write, v: f32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn read_u32(r: &mut impl Read) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
fn read_i32(r: &mut impl Read) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}
fn read_f32(r: &mut impl Read) -> io::Result<f32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

const VACANT_SENTINEL_LEVEL: i32 = -1;

fn write_node(w: &mut impl Write, node: Option<&Node>) -> io::Result<()> {
    match node {
        None => {
            write_i32(w, VACANT_SENTINEL_LEVEL)?;
            write_u32(w, 0)?;
            for _ in 0..4 {
                write_f32_array(w, &[])?;
            }
            write_i32_array(w, &[])?;
            for _ in 0..4 {
                write_f32(w, 0.0)?;
            }
        }
        Some(node) => {
            write_i32(w, node.level)?;
            write_u32(w, node.entry_count as u32)?;
            let (min_x, min_y, max_x, max_y, ids) = node.raw_arrays();
            write_f32_array(w, min_x)?;
            write_f32_array(w, min_y)?;
            write_f32_array(w, max_x)?;
            write_f32_array(w, max_y)?;
            write_i32_array(w, ids)?;
            write_f32(w, node.mbr.min_x)?;
            write_f32(w, node.mbr.min_y)?;
            write_f32(w, node.mbr.max_x)?;
            write_f32(w, node.mbr.max_y)?;
        }
    }
    Ok(())
}

fn read_node(r: &mut impl Read) -> io::Result<Option<Node>> {
    let level = read_i32(r)?;
    let entry_count = read_u32(r)? as usize;
    let min_x = read_f32_array(r)?;
    let min_y = read_f32_array(r)?;
    let max_x = read_f32_array(r)?;
    let max_y = read_f32_array(r)?;
    let ids = read_i32_array(r)?;
    let mbr = Rect::new(read_f32(r)?, read_f32(r)?, read_f32(r)?, read_f32(r)?);

    if level == VACANT_SENTINEL_LEVEL {
        return Ok(None);
    }
    Ok(Some(Node::from_raw_arrays(
        level,
        entry_count,
        min_x,
        min_y,
        max_x,
        max_y,
        ids,
        mbr,
    )))
}

/// Writes `tree`'s full state to `w` in the fixed little-endian layout
/// documented on this module.
pub fn write_tree(w: &mut impl Write, tree: &RTree) -> io::Result<()> {
    write_u32(w, tree.config.max_node_entries as u32)?;
    write_u32(w, tree.config.min_node_entries as u32)?;
    write_i32(w, tree.height)?;
    write_u32(w, tree.root_id)?;
    write_i32(w, tree.size)?;
    write_u32(w, tree.arena.nodes.len() as u32)?;
    for slot in &tree.arena.nodes {
        write_node(w, slot.as_ref())?;
    }
    Ok(())
}

/// Reads back a tree written by [`write_tree`]. Arena slots read as the
/// vacant sentinel are restored as holes and added to the free list, in
/// ascending index order.
pub fn read_tree(r: &mut impl Read) -> io::Result<RTree> {
    let max_node_entries = read_u32(r)? as usize;
    let min_node_entries = read_u32(r)? as usize;
    let height = read_i32(r)?;
    let root_id = read_u32(r)?;
    let size = read_i32(r)?;
    let node_count = read_u32(r)? as usize;

    let mut nodes = Vec::with_capacity(node_count);
    let mut free = Vec::new();
    for i in 0..node_count {
        let node = read_node(r)?;
        if node.is_none() {
            free.push(i as u32);
        }
        nodes.push(node);
    }

    let arena = NodeArena::from_parts(nodes, free);
    let config = RTreeConfig::from_pairs(max_node_entries, min_node_entries);
    Ok(RTree::from_parts(config, arena, root_id, height, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_populated_tree() {
        let mut tree = RTree::with_config(RTreeConfig::from_pairs(4, 2));
        for i in 0..40 {
            tree.add(Rect::new(i as f32, i as f32, i as f32 + 1.0, i as f32 + 1.0), i);
        }
        tree.delete(Rect::new(5.0, 5.0, 6.0, 6.0), 5);

        let mut buf = Vec::new();
        write_tree(&mut buf, &tree).unwrap();

        let mut restored = read_tree(&mut &buf[..]).unwrap();
        assert_eq!(restored.size(), tree.size());
        assert_eq!(restored.height(), tree.height());

        let mut hits = Vec::new();
        restored.contains(&Rect::new(0.0, 0.0, 40.0, 40.0), |id| {
            hits.push(id);
            true
        });
        assert!(!hits.contains(&5));
        assert_eq!(hits.len(), tree.size() as usize);
    }

    #[test]
    fn round_trips_an_empty_tree() {
        let tree = RTree::new();
        let mut buf = Vec::new();
        write_tree(&mut buf, &tree).unwrap();
        let restored = read_tree(&mut &buf[..]).unwrap();
        assert_eq!(restored.size(), 0);
        assert!(restored.bounds().is_none());
    }
}
