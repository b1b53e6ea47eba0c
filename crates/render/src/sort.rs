use chunkview_common::{distance_squared, viewer_chunk_center};
use glam::{IVec3, Vec3};

use crate::grid::ChunkGrid;

/// Squared distance of one chunk to the viewer, keyed by the chunk's stable
/// grid index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortEntry {
    pub distance: i64,
    pub index: usize,
}

/// Keeps the chunks ordered nearest first relative to the viewer's chunk.
///
/// Opaque drawing and rebuilding walk the order forwards; the translucent
/// colour pass walks it backwards, so one sort serves both.
#[derive(Debug, Default)]
pub struct DistanceSorter {
    order: Vec<SortEntry>,
    viewer_center: Option<IVec3>,
    resorts: u64,
}

impl DistanceSorter {
    /// Sorter over `grid` in grid order. The first update always sorts.
    pub fn new(grid: &ChunkGrid) -> Self {
        Self {
            order: (0..grid.len())
                .map(|index| SortEntry { distance: 0, index })
                .collect(),
            viewer_center: None,
            resorts: 0,
        }
    }

    /// Forget the last viewer position so the next update sorts again.
    pub fn reset_viewer(&mut self) {
        self.viewer_center = None;
    }

    /// Re-sort if the viewer moved into another chunk. Returns whether a sort
    /// happened.
    pub fn update(&mut self, grid: &ChunkGrid, camera_position: Vec3) -> bool {
        let center = viewer_chunk_center(camera_position);
        if self.viewer_center == Some(center) {
            return false;
        }
        self.viewer_center = Some(center);

        for entry in &mut self.order {
            if let Some(chunk) = grid.get(entry.index) {
                entry.distance = distance_squared(chunk.location.center(), center);
            }
        }
        // Stable: equal distances keep their previous relative order.
        self.order.sort_by_key(|entry| entry.distance);
        self.resorts += 1;
        tracing::trace!(?center, chunks = self.order.len(), "chunks re-sorted");
        true
    }

    /// Chunks nearest first.
    pub fn order(&self) -> &[SortEntry] {
        &self.order
    }

    pub fn viewer_center(&self) -> Option<IVec3> {
        self.viewer_center
    }

    /// Number of sorts performed since construction.
    pub fn resort_count(&self) -> u64 {
        self.resorts
    }
}
