//! Chunked voxel map renderer.
//!
//! The map is split into 16³ chunks. Each chunk lazily owns GPU geometry
//! built by a [`MeshBuilder`]; world edits only drop the geometry of the
//! chunks they can affect, and each frame rebuilds a bounded number of the
//! nearest dirty chunks before drawing.
//!
//! # Invariants
//! - Chunk records are created once per map and keep their index.
//! - The draw order is a permutation of the grid, nearest first.
//! - A chunk outside the view distance is never visible and never built.
//! - No more than the configured number of chunks are built per frame.
//! - Every buffer created for a chunk is released exactly once.

pub mod atlas;
pub mod budget;
pub mod config;
pub mod cull;
pub mod device;
pub mod error;
pub mod grid;
pub mod mesh;
pub mod pipeline;
pub mod renderer;
pub mod sort;

#[cfg(test)]
mod testing;

pub use atlas::TerrainAtlas;
pub use budget::{BuildBudget, build_dirty_chunks};
pub use config::RendererConfig;
pub use cull::{Culling, Frustum, NoCulling, VisibilityStats, range_limit_squared, update_visibility};
pub use device::{
    BufferId, ColorMask, CompareFunc, DeviceCommand, DeviceState, GraphicsDevice, RecordingDevice,
    TextureId, Vertex,
};
pub use error::{DeviceError, RenderError};
pub use grid::{ChunkGrid, ChunkInfo};
pub use mesh::{
    BuildContext, ChunkDrawInfo, ChunkPart, FaceMeshBuilder, GeometryKind, MeshBuilder,
};
pub use pipeline::{DrawTargets, EnvironmentRenderer, NoEnvironment, draw_frame};
pub use renderer::{FrameContext, MapRenderer, RenderStats};
pub use sort::{DistanceSorter, SortEntry};

pub fn crate_info() -> &'static str {
    "chunkview-render v0.1.0"
}
