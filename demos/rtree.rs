use rstree_core::geometry::{Point, Rect};
use rstree_core::rtree::RTree;

fn main() {
    println!("--- RTree demo ---");
    let mut tree = RTree::new();

    tree.add(Rect::new(10.0, 20.0, 10.0, 20.0), 1);
    tree.add(Rect::new(80.0, 30.0, 80.0, 30.0), 2);
    tree.add(Rect::new(45.0, 70.0, 45.0, 70.0), 3);

    let query_point = Point::new(12.0, 22.0);
    let mut nearest = Vec::new();
    tree.nearest_n(&query_point, 2, f32::INFINITY, |id| {
        nearest.push(id);
        true
    });
    println!("2 nearest neighbors to {query_point:?}: {nearest:?}");

    let query_rect = Rect::new(0.0, 0.0, 50.0, 50.0);
    let mut contained = Vec::new();
    tree.intersects(&query_rect, |id| {
        contained.push(id);
        true
    });
    println!("entries intersecting {query_rect:?}: {contained:?}");

    let index = tree.to_index();
    println!("frozen index size: {}", index.size());
}
