use chunkview_render::{MapRenderer, MeshBuilder};

/// One reporting interval's worth of frame statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsReport {
    pub fps: u32,
    /// Rate implied by the slowest frame of the interval.
    pub min_fps: u32,
    pub chunk_updates: u64,
    pub vertices: u64,
}

impl std::fmt::Display for FpsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FPS: {} (min {}), chunks/s: {}, vertices: {}",
            self.fps, self.min_fps, self.chunk_updates, self.vertices
        )
    }
}

/// Accumulates frame deltas and reports once per second.
#[derive(Debug, Default)]
pub struct FpsCounter {
    frames: u32,
    accumulator: f64,
    max_delta: f64,
    last: Option<FpsReport>,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame. Returns a report when a full second has accumulated,
    /// after which the counter starts a new interval.
    pub fn tick(&mut self, delta: f64, chunk_updates: u64, vertices: u64) -> Option<FpsReport> {
        self.frames += 1;
        self.max_delta = self.max_delta.max(delta);
        self.accumulator += delta;
        if self.accumulator < 1.0 {
            return None;
        }

        let min_fps = if self.max_delta > 0.0 {
            (1.0 / self.max_delta) as u32
        } else {
            0
        };
        let report = FpsReport {
            fps: (self.frames as f64 / self.accumulator) as u32,
            min_fps,
            chunk_updates,
            vertices,
        };
        self.frames = 0;
        self.accumulator = 0.0;
        self.max_delta = 0.0;
        self.last = Some(report);
        tracing::debug!(%report, "fps interval");
        Some(report)
    }

    /// [`FpsCounter::tick`] fed from a renderer; resets its chunk-update
    /// counter whenever a report is produced.
    pub fn tick_renderer<B: MeshBuilder>(
        &mut self,
        delta: f64,
        renderer: &mut MapRenderer<B>,
    ) -> Option<FpsReport> {
        let stats = *renderer.stats();
        let report = self.tick(delta, stats.chunk_updates, stats.vertices)?;
        renderer.reset_chunk_updates();
        Some(report)
    }

    /// The most recent report, if a full interval has passed.
    pub fn last_report(&self) -> Option<FpsReport> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkview_kernel::BlockMap;
    use chunkview_render::{
        FaceMeshBuilder, FrameContext, NoCulling, NoEnvironment, RecordingDevice, RendererConfig,
        TerrainAtlas,
    };
    use glam::Vec3;

    #[test]
    fn reports_after_one_second() {
        let mut fps = FpsCounter::new();
        for _ in 0..3 {
            assert!(fps.tick(0.25, 7, 100).is_none());
        }
        let report = fps.tick(0.5, 7, 100).unwrap();
        // 4 frames in 1.25s, slowest frame 0.5s.
        assert_eq!(report.fps, 3);
        assert_eq!(report.min_fps, 2);
        assert_eq!(report.chunk_updates, 7);
        assert_eq!(fps.last_report(), Some(report));

        // New interval starts from scratch.
        assert!(fps.tick(0.1, 0, 0).is_none());
    }

    #[test]
    fn display_format() {
        let report = FpsReport {
            fps: 60,
            min_fps: 45,
            chunk_updates: 12,
            vertices: 34_000,
        };
        assert_eq!(
            report.to_string(),
            "FPS: 60 (min 45), chunks/s: 12, vertices: 34000"
        );
    }

    #[test]
    fn renderer_chunk_updates_reset_on_report() {
        let map = BlockMap::flatgrass(32, 32, 32, 8).unwrap();
        let mut device = RecordingDevice::new();
        let mut renderer = MapRenderer::new(
            FaceMeshBuilder::new(),
            TerrainAtlas::default(),
            RendererConfig::default(),
        );
        renderer.on_new_map_loaded(32, 32, 32, &mut device).unwrap();
        let ctx = FrameContext {
            camera_position: Vec3::new(16.0, 12.0, 16.0),
            view_distance: 64.0,
            culling: &NoCulling,
            delta: 0.6,
        };
        let mut fps = FpsCounter::new();

        renderer.render(&ctx, &map, &mut device, &mut NoEnvironment).unwrap();
        assert!(fps.tick_renderer(0.6, &mut renderer).is_none());
        assert_eq!(renderer.stats().chunk_updates, 4);

        renderer.render(&ctx, &map, &mut device, &mut NoEnvironment).unwrap();
        let report = fps.tick_renderer(0.6, &mut renderer).unwrap();
        assert_eq!(report.chunk_updates, 8);
        assert!(report.vertices > 0);
        assert_eq!(renderer.stats().chunk_updates, 0);
    }
}
