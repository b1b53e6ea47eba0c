use chunkview_render::{MapRenderer, MeshBuilder};

/// Read-only view over a map renderer for debugging output.
pub struct RendererInspector;

impl RendererInspector {
    pub fn summary<B: MeshBuilder>(renderer: &MapRenderer<B>) -> RendererSummary {
        let stats = renderer.stats();
        let (chunks, layout, built, visible) = renderer.grid().map_or((0, [0; 3], 0, 0), |grid| {
            (
                grid.len(),
                grid.counts().to_array(),
                grid.built_count(),
                grid.visible_count(),
            )
        });
        RendererSummary {
            loaded: renderer.is_loaded(),
            chunks,
            layout,
            built,
            visible,
            vertices: stats.vertices,
            resorts: renderer.sorter().resort_count(),
        }
    }
}

/// Snapshot of renderer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererSummary {
    pub loaded: bool,
    pub chunks: usize,
    /// Chunks along x, y and z.
    pub layout: [i32; 3],
    pub built: usize,
    pub visible: usize,
    pub vertices: u64,
    pub resorts: u64,
}

impl std::fmt::Display for RendererSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.loaded {
            return write!(f, "Renderer: no map loaded");
        }
        write!(
            f,
            "Renderer: chunks={} built={} visible={} vertices={} resorts={} layout={}x{}x{}",
            self.chunks,
            self.built,
            self.visible,
            self.vertices,
            self.resorts,
            self.layout[0],
            self.layout[1],
            self.layout[2]
        )
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

    fn renderer() -> MapRenderer<FaceMeshBuilder> {
        MapRenderer::new(FaceMeshBuilder::new(), TerrainAtlas::default(), RendererConfig::default())
    }

    #[test]
    fn summary_without_map() {
        let summary = RendererInspector::summary(&renderer());
        assert!(!summary.loaded);
        assert_eq!(summary.chunks, 0);
        assert_eq!(summary.layout, [0; 3]);
        assert_eq!(summary.to_string(), "Renderer: no map loaded");
    }

    #[test]
    fn summary_after_frame() {
        let map = BlockMap::flatgrass(32, 16, 32, 4).unwrap();
        let mut device = RecordingDevice::new();
        let mut renderer = renderer();
        renderer.on_new_map_loaded(32, 16, 32, &mut device).unwrap();
        let ctx = FrameContext {
            camera_position: Vec3::new(16.0, 10.0, 16.0),
            view_distance: 64.0,
            culling: &NoCulling,
            delta: 0.016,
        };
        renderer.render(&ctx, &map, &mut device, &mut NoEnvironment).unwrap();

        let summary = RendererInspector::summary(&renderer);
        assert!(summary.loaded);
        assert_eq!(summary.chunks, 4);
        assert_eq!(summary.layout, [2, 1, 2]);
        assert_eq!(summary.built, 4);
        assert_eq!(summary.visible, 4);
        assert_eq!(summary.resorts, 1);
        assert!(summary.vertices > 0);
        let text = summary.to_string();
        assert!(text.starts_with("Renderer: chunks=4 built=4"));
        assert!(text.ends_with("layout=2x1x2"));
    }
}
