use chunkview_common::{CHUNK_SHIFT, CHUNK_SIZE, ChunkCoord, next_multiple_of_chunk};
use glam::IVec3;

use crate::device::GraphicsDevice;
use crate::error::RenderError;
use crate::mesh::{ChunkDrawInfo, MeshBuilder};

/// Per-chunk record: where it is, whether it passed culling this frame and
/// its cached geometry, if built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInfo {
    pub location: ChunkCoord,
    pub visible: bool,
    pub draw_info: Option<ChunkDrawInfo>,
}

impl ChunkInfo {
    pub fn new(location: ChunkCoord) -> Self {
        Self {
            location,
            visible: false,
            draw_info: None,
        }
    }

    pub fn is_built(&self) -> bool {
        self.draw_info.is_some()
    }
}

/// Fixed partition of a loaded map into 16³ chunks.
///
/// Records are stored flat with x varying fastest, then y, then z, and never
/// move: a record's index is stable for the lifetime of the grid and can key
/// side arrays such as sort distances.
#[derive(Debug)]
pub struct ChunkGrid {
    chunks: Vec<ChunkInfo>,
    counts: IVec3,
}

impl ChunkGrid {
    /// Partition a `width` × `height` × `length` map. Each dimension is
    /// rounded up to a multiple of the chunk size.
    ///
    /// Rejects zero dimensions, and dimensions whose rounded size does not
    /// fit in `i32` block coordinates.
    pub fn build(width: u32, height: u32, length: u32) -> Result<Self, RenderError> {
        let invalid = || RenderError::InvalidDimensions {
            width,
            height,
            length,
        };
        if width == 0 || height == 0 || length == 0 {
            return Err(invalid());
        }
        let (Some(cx), Some(cy), Some(cz)) =
            (chunks_along(width), chunks_along(height), chunks_along(length))
        else {
            return Err(invalid());
        };
        let total = (cx as usize)
            .checked_mul(cy as usize)
            .and_then(|n| n.checked_mul(cz as usize))
            .ok_or_else(invalid)?;
        let counts = IVec3::new(cx, cy, cz);
        let mut chunks = Vec::with_capacity(total);
        for cz in 0..counts.z {
            for cy in 0..counts.y {
                for cx in 0..counts.x {
                    chunks.push(ChunkInfo::new(ChunkCoord::from_index(cx, cy, cz)));
                }
            }
        }
        tracing::debug!(
            chunks = chunks.len(),
            x = counts.x,
            y = counts.y,
            z = counts.z,
            "chunk grid built"
        );
        Ok(Self { chunks, counts })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks along each axis.
    pub fn counts(&self) -> IVec3 {
        self.counts
    }

    /// Rounded world size covered by the grid, in blocks.
    pub fn size_in_blocks(&self) -> IVec3 {
        self.counts * CHUNK_SIZE
    }

    /// Stable index of the chunk at chunk-index position `(cx, cy, cz)`.
    pub fn index_of(&self, cx: i32, cy: i32, cz: i32) -> Option<usize> {
        let c = self.counts;
        if cx < 0 || cy < 0 || cz < 0 || cx >= c.x || cy >= c.y || cz >= c.z {
            return None;
        }
        let (x, y, z) = (cx as usize, cy as usize, cz as usize);
        Some((z * c.y as usize + y) * c.x as usize + x)
    }

    /// Stable index of the chunk at `coord`, which must be chunk aligned.
    pub fn index_of_coord(&self, coord: ChunkCoord) -> Option<usize> {
        if ChunkCoord::containing(coord.origin()) != coord {
            return None;
        }
        let i = coord.index();
        self.index_of(i.x, i.y, i.z)
    }

    pub fn get(&self, index: usize) -> Option<&ChunkInfo> {
        self.chunks.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ChunkInfo> {
        self.chunks.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChunkInfo> {
        self.chunks.iter()
    }

    /// Drop the cached geometry of one chunk, freeing its buffers.
    /// Returns whether the chunk had geometry.
    pub fn release<B: MeshBuilder + ?Sized>(
        &mut self,
        index: usize,
        builder: &mut B,
        device: &mut dyn GraphicsDevice,
    ) -> bool {
        let Some(info) = self.chunks.get_mut(index).and_then(|c| c.draw_info.take()) else {
            return false;
        };
        builder.release(device, info);
        true
    }

    /// Drop the cached geometry of every chunk. Returns how many had any.
    pub fn release_all<B: MeshBuilder + ?Sized>(
        &mut self,
        builder: &mut B,
        device: &mut dyn GraphicsDevice,
    ) -> usize {
        let mut released = 0;
        for chunk in &mut self.chunks {
            if let Some(info) = chunk.draw_info.take() {
                builder.release(device, info);
                released += 1;
            }
        }
        released
    }

    /// Release all geometry and consume the grid.
    pub fn teardown<B: MeshBuilder + ?Sized>(mut self, builder: &mut B, device: &mut dyn GraphicsDevice) {
        let released = self.release_all(builder, device);
        tracing::debug!(released, "chunk grid torn down");
    }

    /// Chunks with cached geometry.
    pub fn built_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_built()).count()
    }

    pub fn visible_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.visible).count()
    }
}

/// Chunks needed along one axis of `blocks` blocks.
fn chunks_along(blocks: u32) -> Option<i32> {
    let rounded = i32::try_from(next_multiple_of_chunk(blocks)?).ok()?;
    Some(rounded >> CHUNK_SHIFT)
}
