//! Chunk geometry: the per-chunk draw description and the builder trait that
//! produces it.

mod faces;

pub use faces::FaceMeshBuilder;

use chunkview_common::ChunkCoord;
use chunkview_kernel::BlockMap;

use crate::atlas::TerrainAtlas;
use crate::device::{BufferId, GraphicsDevice};
use crate::error::DeviceError;

/// The three geometry buckets a chunk is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Solid,
    Sprite,
    Translucent,
}

impl GeometryKind {
    pub const ALL: [Self; 3] = [Self::Solid, Self::Sprite, Self::Translucent];
}

/// Geometry of one kind in one atlas batch of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkPart {
    pub buffer: Option<BufferId>,
    pub vertex_count: u32,
}

impl ChunkPart {
    pub const EMPTY: Self = Self {
        buffer: None,
        vertex_count: 0,
    };

    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0 || self.buffer.is_none()
    }
}

/// Cached geometry of a chunk: one part per kind per atlas batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDrawInfo {
    solid: Vec<ChunkPart>,
    sprite: Vec<ChunkPart>,
    translucent: Vec<ChunkPart>,
}

impl ChunkDrawInfo {
    /// Draw info with `batches` empty parts per kind.
    pub fn empty(batches: usize) -> Self {
        Self {
            solid: vec![ChunkPart::EMPTY; batches],
            sprite: vec![ChunkPart::EMPTY; batches],
            translucent: vec![ChunkPart::EMPTY; batches],
        }
    }

    pub fn batch_count(&self) -> usize {
        self.solid.len()
    }

    pub fn parts(&self, kind: GeometryKind) -> &[ChunkPart] {
        match kind {
            GeometryKind::Solid => &self.solid,
            GeometryKind::Sprite => &self.sprite,
            GeometryKind::Translucent => &self.translucent,
        }
    }

    pub fn parts_mut(&mut self, kind: GeometryKind) -> &mut [ChunkPart] {
        match kind {
            GeometryKind::Solid => &mut self.solid,
            GeometryKind::Sprite => &mut self.sprite,
            GeometryKind::Translucent => &mut self.translucent,
        }
    }

    /// Part of `kind` in `batch`, `None` when the chunk was built with fewer
    /// batches than are bound now.
    pub fn part(&self, kind: GeometryKind, batch: usize) -> Option<&ChunkPart> {
        self.parts(kind).get(batch)
    }

    pub fn total_vertices(&self) -> u64 {
        GeometryKind::ALL
            .iter()
            .flat_map(|&kind| self.parts(kind))
            .map(|part| part.vertex_count as u64)
            .sum()
    }

    /// Every device buffer owned by this chunk.
    pub fn buffers(&self) -> impl Iterator<Item = BufferId> + '_ {
        GeometryKind::ALL
            .into_iter()
            .flat_map(|kind| self.parts(kind))
            .filter_map(|part| part.buffer)
    }
}

/// World state a builder reads while generating a chunk.
#[derive(Debug, Clone, Copy)]
pub struct BuildContext<'a> {
    pub map: &'a BlockMap,
    pub atlas: &'a TerrainAtlas,
}

/// Strategy that turns block data into chunk geometry.
///
/// The renderer picks one implementation at construction and only relies on
/// the kind × batch layout of [`ChunkDrawInfo`].
pub trait MeshBuilder {
    /// Whether built geometry bakes in column sunlight, which widens the set
    /// of chunks a block edit invalidates.
    fn uses_lighting(&self) -> bool;

    fn on_new_map(&mut self) {}

    fn on_new_map_loaded(&mut self) {}

    /// Build the geometry of the chunk whose minimum corner is `origin`.
    ///
    /// On error every buffer created for this chunk must already be released.
    fn build(
        &mut self,
        ctx: &BuildContext<'_>,
        device: &mut dyn GraphicsDevice,
        origin: ChunkCoord,
    ) -> Result<ChunkDrawInfo, DeviceError>;

    /// Free the device buffers of a chunk's geometry.
    fn release(&mut self, device: &mut dyn GraphicsDevice, info: ChunkDrawInfo) {
        for buffer in info.buffers() {
            device.delete_vertex_buffer(buffer);
        }
    }

    fn begin_render(&mut self, _device: &mut dyn GraphicsDevice) {}

    fn end_render(&mut self, _device: &mut dyn GraphicsDevice) {}

    fn draw(&mut self, device: &mut dyn GraphicsDevice, part: &ChunkPart) -> Result<(), DeviceError> {
        match part.buffer {
            Some(buffer) => device.draw_quads(buffer, part.vertex_count),
            None => Ok(()),
        }
    }
}
