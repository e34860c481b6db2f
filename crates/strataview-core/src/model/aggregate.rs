/// Post-scan passes over a populated [`FileTree`]: rolling directory sizes
/// up from their descendants, pruning entries that end up empty, and
/// ordering siblings so the layout engine sees biggest-first.
use crate::model::file_info::FileKind;
use crate::model::node::NodeId;
use crate::model::FileTree;

/// Sum child sizes into every directory, bottom-up. One post-order pass.
pub fn rollup_sizes(tree: &mut FileTree) {
    for id in tree.subtree_postorder(tree.root()) {
        if tree.payload(id).file.kind != FileKind::Directory {
            continue;
        }
        let total: u64 = tree
            .children(id)
            .map(|c| tree.payload(c).file.size)
            .sum();
        tree.payload_mut(id).file.size = total;
    }
}

/// Remove every node whose size is zero, repeating until a full sweep finds
/// nothing left to remove. Catches directories that are only empty because
/// their (now-removed) children were themselves empty directories. The
/// root is never pruned, even if empty.
pub fn prune_zero_size(tree: &mut FileTree) {
    loop {
        let doomed: std::collections::HashSet<NodeId> = tree
            .descendants_preorder(tree.root())
            .filter(|id| tree.payload(*id).file.size == 0)
            .collect();
        if doomed.is_empty() {
            return;
        }
        // A zero-size directory's children always sum to zero too, so every
        // doomed node's whole subtree is already in `doomed`. Detach only
        // the top of each doomed subtree — detaching its descendants too
        // would touch an already-tombstoned handle.
        for &id in &doomed {
            match tree.parent(id) {
                Some(p) if !doomed.contains(&p) => tree.detach(id),
                _ => {}
            }
        }
    }
}

/// Re-sum `node` (if it's a directory) from its direct children, then
/// repeat for every ancestor up to the root. Used by the reconciler
/// (§4.7) after a single tree mutation, instead of re-running a full
/// [`rollup_sizes`] pass over the whole tree: every node other than the
/// affected ancestor chain is already correct, so only that chain needs
/// recomputing. This is the "(a) re-roll affected ancestors" resolution
/// to the staleness open question.
pub fn reaggregate_upward(tree: &mut FileTree, node: NodeId) {
    let mut cur = Some(node);
    while let Some(id) = cur {
        if tree.payload(id).file.kind == FileKind::Directory {
            let total: u64 = tree.children(id).map(|c| tree.payload(c).file.size).sum();
            tree.payload_mut(id).file.size = total;
        }
        cur = tree.parent(id);
    }
}

/// Reorder every directory's direct children descending by size.
pub fn sort_children_by_size_desc(tree: &mut FileTree) {
    let dirs: Vec<NodeId> = tree
        .descendants_preorder(tree.root())
        .filter(|id| tree.payload(*id).file.kind == FileKind::Directory)
        .collect();
    for dir in dirs.into_iter().chain(std::iter::once(tree.root())) {
        tree.sort_children(dir, |a, b| b.file.size.cmp(&a.file.size));
    }
}
