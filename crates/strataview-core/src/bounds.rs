/// Bounding-volume pass (§4.4), run after layout.
///
/// A single post-order walk assigns each node a `bounding_box`: the
/// smallest axis-aligned block enclosing the node's own block and every
/// descendant's bounding box. A leaf's bounding box is its own block; an
/// internal node's shares its block's origin/width/depth (children never
/// extend past the parent's footprint) and has height equal to its own
/// block's height plus the tallest child bounding box.
use crate::model::block::Block;
use crate::model::FileTree;

pub fn compute_bounding_boxes(tree: &mut FileTree) {
    for id in tree.subtree_postorder(tree.root()) {
        let own_block = tree.payload(id).block;
        let max_child_height = tree
            .children(id)
            .map(|c| tree.payload(c).bounding_box.height)
            .fold(0.0_f64, f64::max);

        let bbox = Block {
            origin: own_block.origin,
            width: own_block.width,
            depth: own_block.depth,
            height: own_block.height + max_child_height,
            percent_covered: 0.0,
        };
        tree.payload_mut(id).bounding_box = bbox;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_tree;
    use crate::model::{FileInfo, Payload};
    use compact_str::CompactString;

    fn dir(name: &str) -> Payload {
        Payload::new(FileInfo::new_dir(CompactString::from(name)))
    }
    fn file(name: &str, size: u64) -> Payload {
        Payload::new(FileInfo::new_file(CompactString::from(name), size))
    }

    #[test]
    fn leaf_bounding_box_equals_its_block() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let a = tree.append_child(root, file("a.txt", 100));
        layout_tree(&mut tree);
        compute_bounding_boxes(&mut tree);

        assert_eq!(tree.payload(a).bounding_box, tree.payload(a).block);
    }

    #[test]
    fn internal_bounding_box_encloses_descendants() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let sub = tree.append_child(root, dir("sub"));
        let _leaf = tree.append_child(sub, file("leaf.bin", 50));
        layout_tree(&mut tree);
        compute_bounding_boxes(&mut tree);

        let root_bb = tree.payload(root).bounding_box;
        let sub_bb = tree.payload(sub).bounding_box;
        assert!(root_bb.height >= sub_bb.height + tree.payload(root).block.height - 1e-9);
    }
}
