/// Squarified treemap layout engine (§4.3).
///
/// Lays out a node's children on the top face of its own (already-assigned)
/// block, strip by strip, minimizing the worst aspect ratio within each
/// strip. The root's block is the fixed world slab; every other node's
/// block is assigned by its parent's strip-flush. Sibling subtrees are
/// independent once a parent's strip assignment is known, so layout
/// recurses one `rayon::scope` task per directory — the same recursion
/// shape the scanner uses for the walk itself.
use crate::model::block::{Block, Point3, BLOCK_HEIGHT};
use crate::model::{FileTree, NodeId};

/// Lay out the whole tree: assigns `root`'s block to the fixed world slab,
/// then recursively lays out every descendant on its parent's top face.
pub fn layout_tree(tree: &mut FileTree) {
    let root = tree.root();
    tree.payload_mut(root).block = Block::root_slab();
    layout_children(tree, root);
}

fn layout_children(tree: &mut FileTree, parent: NodeId) {
    let parent_block = tree.payload(parent).block;
    // Children are laid out on the parent's top face, one block height
    // above the parent's own origin (§3: `origin.y == parent.origin.y +
    // parent.height`).
    let real_estate = Block {
        origin: Point3::new(
            parent_block.origin.x,
            parent_block.origin.y + parent_block.height,
            parent_block.origin.z,
        ),
        ..parent_block
    };
    let children: Vec<NodeId> = tree.children(parent).collect();
    if children.is_empty() {
        return;
    }

    let total: f64 = children
        .iter()
        .map(|&c| tree.payload(c).file.size as f64)
        .sum();
    if total <= 0.0 {
        return;
    }

    let placements = squarify(&children, &|c| tree.payload(*c).file.size as f64, real_estate);
    for (child, block) in placements {
        tree.payload_mut(child).block = block;
        layout_children(tree, child);
    }
}

/// Core squarified-treemap packing: given `items` (already sorted
/// descending by weight by the scanner) and the `real_estate` rectangle to
/// fill, returns each item's assigned block.
///
/// `weight` extracts the packing weight (size) for an item. Each strip's
/// area share is computed against the weight still unplaced at the start
/// of that strip, not the grand total, since `remaining`'s footprint only
/// corresponds to what's left to place.
fn squarify<T: Copy>(
    items: &[T],
    weight: &dyn Fn(&T) -> f64,
    real_estate: Block,
) -> Vec<(T, Block)> {
    let mut results = Vec::with_capacity(items.len());
    let mut remaining = real_estate;
    let mut start = 0;

    while start < items.len() {
        let total_area = remaining.area();
        if total_area <= 0.0 {
            // No room left; dump remaining items with zero-area blocks at
            // the current origin rather than panicking on a degenerate rect.
            for &item in &items[start..] {
                results.push((item, zero_block(remaining)));
            }
            break;
        }

        // Weight still unplaced — `remaining`'s footprint corresponds to
        // this, not to the original `total` passed in.
        let remaining_weight: f64 = items[start..].iter().map(weight).sum();

        let short_side = remaining.width.min(remaining.depth);
        let mut strip_end = start + 1;
        let mut strip_worst = worst_ratio(
            &items[start..strip_end],
            weight,
            remaining_weight,
            total_area,
            short_side,
        );

        while strip_end < items.len() {
            let candidate_worst = worst_ratio(
                &items[start..=strip_end],
                weight,
                remaining_weight,
                total_area,
                short_side,
            );
            if candidate_worst > strip_worst {
                break;
            }
            strip_worst = candidate_worst;
            strip_end += 1;
        }

        let strip = &items[start..strip_end];
        let (placed, leftover) = flush_strip(strip, weight, remaining_weight, remaining);
        results.extend(placed);
        remaining = leftover;
        start = strip_end;
    }

    results
}

fn zero_block(at: Block) -> Block {
    Block::new(at.origin, 0.0, BLOCK_HEIGHT, 0.0)
}

/// Worst aspect ratio the strip's members would receive if flushed now.
/// Each member occupies `item_width` along `short_side` (its weight
/// fraction of the strip) and `row_length` along the long axis (shared by
/// the whole strip); ratio is `max(item_width/row_length, row_length/item_width)`.
fn worst_ratio<T>(
    strip: &[T],
    weight: &dyn Fn(&T) -> f64,
    remaining_weight: f64,
    total_area: f64,
    short_side: f64,
) -> f64 {
    if short_side <= 0.0 {
        return f64::INFINITY;
    }
    let strip_weight: f64 = strip.iter().map(weight).sum();
    if strip_weight <= 0.0 {
        return f64::INFINITY;
    }
    let row_area = total_area * (strip_weight / remaining_weight);
    let row_length = row_area / short_side;

    strip
        .iter()
        .map(|item| {
            let item_width = short_side * (weight(item) / strip_weight);
            let item_width = item_width.max(1e-12);
            let row_length = row_length.max(1e-12);
            (item_width / row_length).max(row_length / item_width)
        })
        .fold(0.0_f64, f64::max)
}

/// Places one strip of items and returns the remaining real estate.
/// Every item in the strip shares `row_length` along the long axis; each
/// gets `item_width` along the short axis proportional to its weight.
fn flush_strip<T: Copy>(
    strip: &[T],
    weight: &dyn Fn(&T) -> f64,
    remaining_weight: f64,
    real_estate: Block,
) -> (Vec<(T, Block)>, Block) {
    let total_area = real_estate.area();
    let strip_weight: f64 = strip.iter().map(weight).sum();
    let row_area = total_area * (strip_weight / remaining_weight);

    let along_x = real_estate.width <= real_estate.depth;
    let short_side = if along_x { real_estate.width } else { real_estate.depth };
    let row_length = if short_side > 0.0 { row_area / short_side } else { 0.0 };

    let mut placed = Vec::with_capacity(strip.len());
    let mut cursor = 0.0;

    for &item in strip {
        let item_width = if strip_weight > 0.0 {
            short_side * (weight(&item) / strip_weight)
        } else {
            0.0
        };

        let block = if along_x {
            // Short side is width: items line up along X, row consumes depth.
            Block::new(
                Point3::new(real_estate.origin.x + cursor, real_estate.origin.y, real_estate.origin.z),
                item_width,
                BLOCK_HEIGHT,
                row_length,
            )
        } else {
            // Short side is depth: items line up along Z, row consumes width.
            Block::new(
                Point3::new(real_estate.origin.x, real_estate.origin.y, real_estate.origin.z - cursor),
                row_length,
                BLOCK_HEIGHT,
                item_width,
            )
        };
        placed.push((item, block.padded()));
        cursor += item_width;
    }

    let leftover = if along_x {
        Block::new(
            Point3::new(real_estate.origin.x, real_estate.origin.y, real_estate.origin.z - row_length),
            real_estate.width,
            real_estate.height,
            (real_estate.depth - row_length).max(0.0),
        )
    } else {
        Block::new(
            Point3::new(real_estate.origin.x + row_length, real_estate.origin.y, real_estate.origin.z),
            (real_estate.width - row_length).max(0.0),
            real_estate.height,
            real_estate.depth,
        )
    };

    (placed, leftover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FileInfo, Payload};
    use compact_str::CompactString;

    fn dir(name: &str) -> Payload {
        Payload::new(FileInfo::new_dir(CompactString::from(name)))
    }
    fn file(name: &str, size: u64) -> Payload {
        Payload::new(FileInfo::new_file(CompactString::from(name), size))
    }

    #[test]
    fn single_child_covers_padded_root() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let a = tree.append_child(root, file("a.txt", 100));

        layout_tree(&mut tree);

        let root_block = tree.payload(root).block;
        let a_block = tree.payload(a).block;
        assert!(a_block.width < root_block.width);
        assert!(a_block.depth < root_block.depth);
        assert!(a_block.origin.y > root_block.origin.y);
    }

    #[test]
    fn bigger_child_gets_more_area() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let big = tree.append_child(root, file("big.bin", 900));
        let small = tree.append_child(root, file("small.bin", 100));

        layout_tree(&mut tree);

        let big_area = tree.payload(big).block.area();
        let small_area = tree.payload(small).block.area();
        let ratio = big_area / small_area;
        assert!((ratio - 9.0).abs() < 1.0, "expected ~9x area ratio, got {ratio}");
    }

    #[test]
    fn children_sit_above_parent() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let sub = tree.append_child(root, dir("sub"));
        let leaf = tree.append_child(sub, file("leaf.bin", 42));

        layout_tree(&mut tree);

        let sub_block = tree.payload(sub).block;
        let leaf_block = tree.payload(leaf).block;
        assert!((leaf_block.origin.y - (sub_block.origin.y + sub_block.height)).abs() < 1e-9);
    }

    #[test]
    fn siblings_do_not_overlap_in_footprint() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let a = tree.append_child(root, file("a", 500));
        let b = tree.append_child(root, file("b", 300));
        let c = tree.append_child(root, file("c", 200));

        layout_tree(&mut tree);

        let blocks = [tree.payload(a).block, tree.payload(b).block, tree.payload(c).block];
        for i in 0..blocks.len() {
            for j in (i + 1)..blocks.len() {
                let (p, q) = (blocks[i], blocks[j]);
                let x_disjoint = p.origin.x + p.width <= q.origin.x || q.origin.x + q.width <= p.origin.x;
                let z_disjoint = p.origin.z - p.depth >= q.origin.z || q.origin.z - q.depth >= p.origin.z;
                assert!(x_disjoint || z_disjoint, "siblings {i} and {j} overlap");
            }
        }
    }
}
