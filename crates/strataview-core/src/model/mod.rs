/// Data model: the generic arena tree, world-space geometry, and the
/// per-node payload the scanner, layout engine, and picker all share.
pub mod aggregate;
pub mod block;
pub mod file_info;
pub mod node;
pub mod payload;
pub mod size;

pub use block::{Block, Point3, BLOCK_HEIGHT, MAX_PADDING, PADDING_RATIO, ROOT_BLOCK_DEPTH, ROOT_BLOCK_WIDTH};
pub use file_info::{FileInfo, FileKind};
pub use node::{NodeId, Tree};
pub use payload::Payload;

/// The tree type used throughout strataview: an arena tree of [`Payload`].
pub type FileTree = Tree<Payload>;
