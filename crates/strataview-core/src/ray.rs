//! Ray-picking engine (§4.5): resolves a screen-space ray into the
//! nearest visible block.
//!
//! `Camera` is a one-method trait rather than a concrete type so this
//! module has no dependency on whatever windowing/GPU crate the UI
//! eventually picks for its real camera.
use std::time::Instant;

use tracing::debug;

use crate::model::file_info::FileKind;
use crate::model::{Block, FileTree, NodeId, Point3};

/// Intersection-test tolerance, shared with the denominator and `t` checks
/// below (§6 world-constants table).
pub const EPSILON: f64 = 1e-4;

/// A ray in world space. `direction` should be normalized; callers that
/// pass a non-unit vector just get `t` in units of that vector's length.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Point3,
}

/// The one fact the picker needs from the real camera: whether a
/// candidate hit point is on the visible side of the near plane.
pub trait Camera {
    fn is_in_front_of_near_plane(&self, point: Point3) -> bool;
}

/// Minimum-size / kind gate applied before a node is even bounding-box
/// tested. A node that fails this is skipped along with its whole subtree.
#[derive(Clone, Copy, Debug)]
pub struct VisibilityFilter {
    pub min_size: u64,
    pub only_directories: bool,
}

impl VisibilityFilter {
    pub const SHOW_ALL: VisibilityFilter = VisibilityFilter {
        min_size: 0,
        only_directories: false,
    };

    fn admits(&self, kind: FileKind, size: u64) -> bool {
        if size < self.min_size {
            return false;
        }
        if self.only_directories && kind != FileKind::Directory {
            return false;
        }
        true
    }
}

/// One of the five upward-facing rectangular faces of a [`Block`]
/// (the bottom face is never visible and is deliberately omitted).
enum Face {
    Top,
    Front,
    Back,
    Left,
    Right,
}

const FACES: [Face; 5] = [Face::Top, Face::Front, Face::Back, Face::Left, Face::Right];

fn sub(a: Point3, b: Point3) -> Point3 {
    Point3::new(a.x - b.x, a.y - b.y, a.z - b.z)
}

fn dot(a: Point3, b: Point3) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z
}

/// A point on `face` together with its outward normal, used only to build
/// the plane equation — not a full vertex.
fn face_plane(block: &Block, face: &Face) -> (Point3, Point3) {
    let o = block.origin;
    match face {
        Face::Top => (
            Point3::new(o.x, o.y + block.height, o.z),
            Point3::new(0.0, 1.0, 0.0),
        ),
        Face::Front => (o, Point3::new(0.0, 0.0, 1.0)),
        Face::Back => (
            Point3::new(o.x, o.y, o.z - block.depth),
            Point3::new(0.0, 0.0, -1.0),
        ),
        Face::Left => (o, Point3::new(-1.0, 0.0, 0.0)),
        Face::Right => (
            Point3::new(o.x + block.width, o.y, o.z),
            Point3::new(1.0, 0.0, 0.0),
        ),
    }
}

/// `true` if `point` lies within `face`'s rectangular bounds (the two axes
/// the face doesn't already pin down by its plane).
fn within_face_bounds(block: &Block, face: &Face, point: Point3) -> bool {
    let o = block.origin;
    let in_x = point.x >= o.x && point.x <= o.x + block.width;
    let in_y = point.y >= o.y && point.y <= o.y + block.height;
    let in_z = point.z <= o.z && point.z >= o.z - block.depth;
    match face {
        Face::Top => in_x && in_z,
        Face::Front | Face::Back => in_x && in_y,
        Face::Left | Face::Right => in_z && in_y,
    }
}

/// Ray/plane intersection for one face, returning `(t, point)` when the
/// ray crosses the face's plane within its rectangular bounds, strictly in
/// front of the ray origin.
fn intersect_face(ray: &Ray, block: &Block, face: &Face) -> Option<(f64, Point3)> {
    let (point_on_plane, normal) = face_plane(block, face);
    let denom = dot(ray.direction, normal);
    if denom.abs() < EPSILON {
        return None;
    }
    let t = dot(sub(point_on_plane, ray.origin), normal) / denom;
    if t <= EPSILON {
        return None;
    }
    let hit = Point3::new(
        ray.origin.x + t * ray.direction.x,
        ray.origin.y + t * ray.direction.y,
        ray.origin.z + t * ray.direction.z,
    );
    if !within_face_bounds(block, face, hit) {
        return None;
    }
    Some((t, hit))
}

/// Nearest intersection (by `t`) of `ray` with any of `block`'s five
/// upward-facing faces.
pub fn intersect_block(ray: &Ray, block: &Block) -> Option<(f64, Point3)> {
    FACES
        .iter()
        .filter_map(|f| intersect_face(ray, block, f))
        .min_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
}

/// Cast `ray` against `tree`, returning the nearest node whose own block
/// is struck (subject to `filter` and being in front of `camera`'s near
/// plane), using each node's bounding box as a broad-phase reject.
///
/// A bounding-box miss prunes that node's entire subtree, since bounding
/// boxes enclose all descendants. A node failing `filter` is skipped the
/// same way. Otherwise its block is tested directly and its children are
/// still walked, since a descendant can be hit even when the node's own
/// block was not.
pub fn pick(
    tree: &FileTree,
    ray: &Ray,
    camera: &dyn Camera,
    filter: &VisibilityFilter,
) -> Option<NodeId> {
    let start = Instant::now();
    let mut best: Option<(f64, NodeId)> = None;
    let mut visited = 0usize;
    let mut stack = vec![tree.root()];

    while let Some(id) = stack.pop() {
        visited += 1;
        let payload = tree.payload(id);
        if !filter.admits(payload.file.kind, payload.file.size) {
            continue;
        }
        if intersect_block(ray, &payload.bounding_box).is_none() {
            continue;
        }
        if let Some((t, point)) = intersect_block(ray, &payload.block) {
            if camera.is_in_front_of_near_plane(point) {
                if best.map(|(bt, _)| t < bt).unwrap_or(true) {
                    best = Some((t, id));
                }
            }
        }
        stack.extend(tree.children(id));
    }

    debug!(
        elapsed = ?start.elapsed(),
        visited,
        hit = best.is_some(),
        "ray-pick complete"
    );
    best.map(|(_, id)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::compute_bounding_boxes;
    use crate::layout::layout_tree;
    use crate::model::{FileInfo, Payload};
    use compact_str::CompactString;

    struct AlwaysInFront;
    impl Camera for AlwaysInFront {
        fn is_in_front_of_near_plane(&self, _point: Point3) -> bool {
            true
        }
    }

    fn dir(name: &str) -> Payload {
        Payload::new(FileInfo::new_dir(CompactString::from(name)))
    }
    fn file(name: &str, size: u64) -> Payload {
        Payload::new(FileInfo::new_file(CompactString::from(name), size))
    }

    fn downward_ray(x: f64, z: f64) -> Ray {
        Ray {
            origin: Point3::new(x, 1000.0, z),
            direction: Point3::new(0.0, -1.0, 0.0),
        }
    }

    #[test]
    fn straight_down_ray_hits_single_child_block() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let a = tree.append_child(root, file("a.txt", 100));
        layout_tree(&mut tree);
        compute_bounding_boxes(&mut tree);

        let block = tree.payload(a).block;
        let cx = block.origin.x + block.width / 2.0;
        let cz = block.origin.z - block.depth / 2.0;
        let ray = downward_ray(cx, cz);

        let hit = pick(&tree, &ray, &AlwaysInFront, &VisibilityFilter::SHOW_ALL);
        assert_eq!(hit, Some(a));
    }

    #[test]
    fn ray_picks_deepest_stacked_hit() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let mid = tree.append_child(root, dir("mid"));
        let inner = tree.append_child(mid, file("inner.bin", 50));
        layout_tree(&mut tree);
        compute_bounding_boxes(&mut tree);

        let block = tree.payload(inner).block;
        let cx = block.origin.x + block.width / 2.0;
        let cz = block.origin.z - block.depth / 2.0;
        let ray = downward_ray(cx, cz);

        let hit = pick(&tree, &ray, &AlwaysInFront, &VisibilityFilter::SHOW_ALL);
        assert_eq!(hit, Some(inner));
    }

    #[test]
    fn ray_missing_every_block_returns_none() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        tree.append_child(root, file("a.txt", 100));
        layout_tree(&mut tree);
        compute_bounding_boxes(&mut tree);

        let ray = downward_ray(-500.0, 500.0);
        assert_eq!(pick(&tree, &ray, &AlwaysInFront, &VisibilityFilter::SHOW_ALL), None);
    }

    #[test]
    fn only_directories_filter_skips_files() {
        let mut tree = FileTree::new(dir("root"));
        let root = tree.root();
        let a = tree.append_child(root, file("a.txt", 100));
        layout_tree(&mut tree);
        compute_bounding_boxes(&mut tree);

        let block = tree.payload(a).block;
        let cx = block.origin.x + block.width / 2.0;
        let cz = block.origin.z - block.depth / 2.0;
        let ray = downward_ray(cx, cz);
        let filter = VisibilityFilter {
            min_size: 0,
            only_directories: true,
        };
        assert_eq!(pick(&tree, &ray, &AlwaysInFront, &filter), None);
    }
}
