use chunkview_common::ChunkCoord;

use crate::device::GraphicsDevice;
use crate::error::DeviceError;
use crate::grid::ChunkGrid;
use crate::mesh::{BuildContext, MeshBuilder};
use crate::sort::SortEntry;

/// Per-frame cap on chunk geometry builds.
#[derive(Debug, Clone)]
pub struct BuildBudget {
    per_frame: usize,
    built_this_frame: usize,
}

impl BuildBudget {
    pub fn new(per_frame: usize) -> Self {
        Self {
            per_frame,
            built_this_frame: 0,
        }
    }

    pub fn per_frame(&self) -> usize {
        self.per_frame
    }

    pub fn begin_frame(&mut self) {
        self.built_this_frame = 0;
    }

    pub fn built_this_frame(&self) -> usize {
        self.built_this_frame
    }

    pub fn remaining(&self) -> usize {
        self.per_frame.saturating_sub(self.built_this_frame)
    }

    /// Claim one build. Returns false once the frame's budget is spent.
    pub fn try_take(&mut self) -> bool {
        if self.built_this_frame >= self.per_frame {
            return false;
        }
        self.built_this_frame += 1;
        true
    }
}

/// Build missing geometry for in-range chunks, nearest first, until the
/// budget runs out. Returns the chunks built.
///
/// A failed build leaves its chunk without geometry and aborts the pass.
pub fn build_dirty_chunks<B: MeshBuilder + ?Sized>(
    grid: &mut ChunkGrid,
    order: &[SortEntry],
    limit_squared: i64,
    budget: &mut BuildBudget,
    builder: &mut B,
    ctx: &BuildContext<'_>,
    device: &mut dyn GraphicsDevice,
) -> Result<Vec<ChunkCoord>, DeviceError> {
    let mut built = Vec::new();
    for entry in order {
        if budget.remaining() == 0 {
            break;
        }
        if entry.distance > limit_squared {
            continue;
        }
        let Some(chunk) = grid.get_mut(entry.index) else {
            continue;
        };
        if chunk.draw_info.is_some() || !budget.try_take() {
            continue;
        }
        let location = chunk.location;
        chunk.draw_info = Some(builder.build(ctx, device, location)?);
        built.push(location);
    }
    if !built.is_empty() {
        tracing::debug!(built = built.len(), "chunk geometry built");
    }
    Ok(built)
}
