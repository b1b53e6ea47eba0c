use chunkview_common::{CHUNK_MASK, CHUNK_SHIFT};
use chunkview_kernel::{BlockChange, BlockMap, EnvVariable, MapEvent};
use glam::{IVec3, Vec3};

use crate::atlas::TerrainAtlas;
use crate::budget::{BuildBudget, build_dirty_chunks};
use crate::config::RendererConfig;
use crate::cull::{Culling, range_limit_squared, update_visibility};
use crate::device::GraphicsDevice;
use crate::error::RenderError;
use crate::grid::ChunkGrid;
use crate::mesh::{BuildContext, MeshBuilder};
use crate::pipeline::{DrawTargets, EnvironmentRenderer, draw_frame};
use crate::sort::DistanceSorter;

/// Viewer state for one frame.
pub struct FrameContext<'a> {
    pub camera_position: Vec3,
    pub view_distance: f32,
    pub culling: &'a dyn Culling,
    /// Seconds since the previous frame.
    pub delta: f64,
}

/// Counters exposed for on-screen diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Vertices drawn by the last frame.
    pub vertices: u64,
    /// Chunks built since the counter was last reset.
    pub chunk_updates: u64,
    pub built_last_frame: usize,
    pub in_range_chunks: usize,
    pub visible_chunks: usize,
    /// Whether the last frame re-sorted the chunks.
    pub resorted: bool,
}

/// Renders a loaded block map as a grid of lazily built chunk meshes.
///
/// World-state changes are pushed in through the `on_*` methods; each frame
/// [`MapRenderer::render`] re-sorts, rebuilds a bounded number of dirty
/// chunks, culls and draws.
pub struct MapRenderer<B: MeshBuilder> {
    builder: B,
    config: RendererConfig,
    atlas: TerrainAtlas,
    grid: Option<ChunkGrid>,
    sorter: DistanceSorter,
    budget: BuildBudget,
    stats: RenderStats,
}

impl<B: MeshBuilder> MapRenderer<B> {
    pub fn new(builder: B, atlas: TerrainAtlas, config: RendererConfig) -> Self {
        let budget = BuildBudget::new(config.chunk_updates_per_frame);
        Self {
            builder,
            config,
            atlas,
            grid: None,
            sorter: DistanceSorter::default(),
            budget,
            stats: RenderStats::default(),
        }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut B {
        &mut self.builder
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn atlas(&self) -> &TerrainAtlas {
        &self.atlas
    }

    /// The chunk grid, if a map is loaded.
    pub fn grid(&self) -> Option<&ChunkGrid> {
        self.grid.as_ref()
    }

    pub fn sorter(&self) -> &DistanceSorter {
        &self.sorter
    }

    pub fn is_loaded(&self) -> bool {
        self.grid.is_some()
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn reset_chunk_updates(&mut self) {
        self.stats.chunk_updates = 0;
    }

    /// A new map is about to be loaded: drop everything of the old one.
    pub fn on_new_map(&mut self, device: &mut dyn GraphicsDevice) {
        self.stats.chunk_updates = 0;
        if let Some(grid) = self.grid.take() {
            grid.teardown(&mut self.builder, device);
        }
        self.sorter = DistanceSorter::default();
        self.builder.on_new_map();
        tracing::debug!("map renderer reset for new map");
    }

    /// The new map finished loading with the given dimensions.
    pub fn on_new_map_loaded(
        &mut self,
        width: u32,
        height: u32,
        length: u32,
        device: &mut dyn GraphicsDevice,
    ) -> Result<(), RenderError> {
        let _span = tracing::info_span!("map_loaded", width, height, length).entered();
        let grid = ChunkGrid::build(width, height, length)?;
        if let Some(old) = self.grid.take() {
            old.teardown(&mut self.builder, device);
        }
        self.sorter = DistanceSorter::new(&grid);
        self.grid = Some(grid);
        self.builder.on_new_map_loaded();
        Ok(())
    }

    /// Forward a map event to the matching notification.
    pub fn apply_event(&mut self, event: &MapEvent, device: &mut dyn GraphicsDevice) {
        match event {
            MapEvent::BlockChanged(change) => {
                self.on_block_changed(change, device);
            }
            MapEvent::EnvChanged { variable, .. } => {
                self.on_env_changed(*variable, device);
            }
        }
    }

    pub fn on_block_changed(&mut self, change: &BlockChange, device: &mut dyn GraphicsDevice) -> usize {
        let p = change.position;
        self.redraw_block(p.x, p.y, p.z, change.new_top, change.old_top, device)
    }

    /// Invalidate every chunk whose geometry may depend on the block at
    /// `(x, y, z)`: its own chunk, face neighbours when the block is on that
    /// face, and with lighting the column span between the old and new light
    /// tops. Returns the number of distinct chunks invalidated.
    pub fn redraw_block(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        new_top: Option<i32>,
        old_top: Option<i32>,
        device: &mut dyn GraphicsDevice,
    ) -> usize {
        let Some(grid) = self.grid.as_mut() else {
            return 0;
        };
        let lighting = self.builder.uses_lighting();
        let new_light_cy = new_top.map_or(0, |top| top >> CHUNK_SHIFT);
        let old_light_cy = old_top.map_or(0, |top| top >> CHUNK_SHIFT);
        let collect = |c: IVec3, out: &mut Vec<usize>| {
            out.extend(grid.index_of(c.x, c.y, c.z));
            if lighting && new_light_cy != old_light_cy {
                let lo = new_light_cy.min(old_light_cy);
                let hi = new_light_cy.max(old_light_cy);
                out.extend((lo..=hi).rev().filter_map(|cy| grid.index_of(c.x, cy, c.z)));
            }
        };

        let chunk = IVec3::new(x, y, z) >> CHUNK_SHIFT as i32;
        let local = IVec3::new(x, y, z) & IVec3::splat(CHUNK_MASK);
        let mut targets = Vec::new();
        collect(chunk, &mut targets);
        for axis in 0..3 {
            if local[axis] == 0 {
                let mut n = chunk;
                n[axis] -= 1;
                collect(n, &mut targets);
            }
            if local[axis] == CHUNK_MASK {
                let mut n = chunk;
                n[axis] += 1;
                collect(n, &mut targets);
            }
        }
        targets.sort_unstable();
        targets.dedup();

        for &index in &targets {
            grid.release(index, &mut self.builder, device);
        }
        tracing::debug!(x, y, z, invalidated = targets.len(), "block change invalidated chunks");
        targets.len()
    }

    /// Drop all cached geometry so every chunk rebuilds. No-op without a map.
    pub fn refresh(&mut self, device: &mut dyn GraphicsDevice) -> bool {
        let Some(grid) = self.grid.as_mut() else {
            return false;
        };
        let released = grid.release_all(&mut self.builder, device);
        tracing::debug!(released, "map renderer refreshed");
        true
    }

    /// Environment change; rebuilds everything when baked lighting depends
    /// on it. Returns whether a refresh happened.
    pub fn on_env_changed(&mut self, variable: EnvVariable, device: &mut dyn GraphicsDevice) -> bool {
        if variable.affects_lighting() && self.builder.uses_lighting() {
            return self.refresh(device);
        }
        false
    }

    /// A new terrain atlas was bound. Geometry is rebuilt only if textures
    /// moved between pages. Returns whether a refresh happened.
    pub fn on_atlas_changed(&mut self, atlas: TerrainAtlas, device: &mut dyn GraphicsDevice) -> bool {
        let full_reset = atlas.elements_per_page() != self.atlas.elements_per_page();
        self.atlas = atlas;
        full_reset && self.refresh(device)
    }

    /// Release all geometry and unload the grid.
    pub fn dispose(&mut self, device: &mut dyn GraphicsDevice) {
        if let Some(grid) = self.grid.take() {
            grid.teardown(&mut self.builder, device);
        }
        self.sorter = DistanceSorter::default();
    }

    /// Render one frame of the loaded map.
    pub fn render(
        &mut self,
        ctx: &FrameContext<'_>,
        map: &BlockMap,
        device: &mut dyn GraphicsDevice,
        env: &mut dyn EnvironmentRenderer,
    ) -> Result<(), RenderError> {
        let Some(grid) = self.grid.as_mut() else {
            return Ok(());
        };
        let _span = tracing::info_span!("map_render").entered();
        self.stats.vertices = 0;
        self.stats.resorted = self.sorter.update(grid, ctx.camera_position);

        let limit = range_limit_squared(ctx.view_distance);
        self.budget.begin_frame();
        let build_ctx = BuildContext {
            map,
            atlas: &self.atlas,
        };
        let built = build_dirty_chunks(
            grid,
            self.sorter.order(),
            limit,
            &mut self.budget,
            &mut self.builder,
            &build_ctx,
            device,
        );

        // Visibility is refreshed even when a build failed.
        let visibility = update_visibility(grid, self.sorter.order(), limit, ctx.culling);
        self.stats.in_range_chunks = visibility.in_range;
        self.stats.visible_chunks = visibility.visible;

        let built = built?;
        self.stats.built_last_frame = built.len();
        self.stats.chunk_updates += built.len() as u64;

        let mut targets = DrawTargets {
            grid: &*grid,
            order: self.sorter.order(),
            atlas: &self.atlas,
            builder: &mut self.builder,
            device: &mut *device,
        };
        self.stats.vertices = draw_frame(&mut targets, env, ctx.delta)?;

        tracing::trace!(
            built = self.stats.built_last_frame,
            visible = self.stats.visible_chunks,
            vertices = self.stats.vertices,
            "frame rendered"
        );
        Ok(())
    }
}
