//! Common: chunk coordinates, grid constants and the block table shared by the
//! world kernel and the renderer.

pub mod block;
pub mod types;

pub use block::{BlockId, BlockKind, block_kind, blocks_light, texture_index};
pub use types::{
    CELL_BOUNDING_RADIUS, CHUNK_MASK, CHUNK_SHIFT, CHUNK_SIZE, ChunkCoord, distance_squared,
    next_multiple_of_chunk, viewer_chunk_center,
};
