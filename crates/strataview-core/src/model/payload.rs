use crate::model::block::Block;
use crate::model::file_info::FileInfo;

/// Sentinel stored in `Payload::vbo_offset` meaning "not currently placed in
/// the renderer's instance buffer".
pub const INVALID_VBO_OFFSET: u32 = u32::MAX;

/// Everything a single tree node carries. `file` and `block` are owned by
/// the core (scanner and layout engine); `vbo_offset` is owned by the
/// renderer and is otherwise opaque here.
#[derive(Clone, Debug)]
pub struct Payload {
    pub file: FileInfo,
    pub block: Block,
    pub bounding_box: Block,
    pub vbo_offset: u32,
}

impl Payload {
    pub fn new(file: FileInfo) -> Self {
        Self {
            file,
            block: Block::root_slab(),
            bounding_box: Block::root_slab(),
            vbo_offset: INVALID_VBO_OFFSET,
        }
    }

    pub fn has_vbo_offset(&self) -> bool {
        self.vbo_offset != INVALID_VBO_OFFSET
    }
}
