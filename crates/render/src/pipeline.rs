//! Per-frame draw sequence over the visible chunks.
//!
//! 1. Solid geometry with back-face culling, then sprites double sided, both
//!    alpha tested and batched by atlas page.
//! 2. Map sides and edges.
//! 3. Translucent geometry: a depth-only pre-pass so overlapping translucent
//!    chunks don't blend into each other, then the colour pass back to front.

use crate::atlas::TerrainAtlas;
use crate::device::{ColorMask, CompareFunc, GraphicsDevice};
use crate::error::DeviceError;
use crate::grid::ChunkGrid;
use crate::mesh::{GeometryKind, MeshBuilder};
use crate::sort::SortEntry;

/// Draws what surrounds the map (the bedrock sides and the water edge).
pub trait EnvironmentRenderer {
    fn render_map_sides(&mut self, device: &mut dyn GraphicsDevice, delta: f64);
    fn render_map_edges(&mut self, device: &mut dyn GraphicsDevice, delta: f64);
}

/// Environment renderer that draws nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEnvironment;

impl EnvironmentRenderer for NoEnvironment {
    fn render_map_sides(&mut self, _device: &mut dyn GraphicsDevice, _delta: f64) {}
    fn render_map_edges(&mut self, _device: &mut dyn GraphicsDevice, _delta: f64) {}
}

/// Everything a frame's draw passes read.
pub struct DrawTargets<'a, B: MeshBuilder + ?Sized> {
    pub grid: &'a ChunkGrid,
    pub order: &'a [SortEntry],
    pub atlas: &'a TerrainAtlas,
    pub builder: &'a mut B,
    pub device: &'a mut dyn GraphicsDevice,
}

impl<B: MeshBuilder + ?Sized> DrawTargets<'_, B> {
    /// Draw one kind of one batch for every visible chunk, in the given chunk
    /// order. Returns the vertices drawn.
    fn draw_batch(
        &mut self,
        kind: GeometryKind,
        batch: usize,
        back_to_front: bool,
    ) -> Result<u64, DeviceError> {
        let mut vertices = 0;
        let mut draw = |entry: &SortEntry| -> Result<(), DeviceError> {
            let Some(chunk) = self.grid.get(entry.index) else {
                return Ok(());
            };
            if !chunk.visible {
                return Ok(());
            }
            let Some(part) = chunk
                .draw_info
                .as_ref()
                .and_then(|info| info.part(kind, batch))
            else {
                return Ok(());
            };
            if part.is_empty() {
                return Ok(());
            }
            self.builder.draw(self.device, part)?;
            vertices += part.vertex_count as u64;
            Ok(())
        };
        if back_to_front {
            self.order.iter().rev().try_for_each(&mut draw)?;
        } else {
            self.order.iter().try_for_each(&mut draw)?;
        }
        Ok(vertices)
    }

    fn bind_page(&mut self, batch: usize) {
        if let Some(&page) = self.atlas.pages().get(batch) {
            self.device.bind_texture(page);
        }
    }
}

/// Run all passes for one frame. Returns the vertices counted towards the
/// frame's total; the depth pre-pass is not counted.
pub fn draw_frame<B: MeshBuilder + ?Sized>(
    targets: &mut DrawTargets<'_, B>,
    env: &mut dyn EnvironmentRenderer,
    delta: f64,
) -> Result<u64, DeviceError> {
    let batches = targets.atlas.page_count();
    let mut vertices = 0;

    targets.builder.begin_render(targets.device);
    targets.device.set_texturing(true);
    targets.device.set_alpha_test(true);
    targets.device.set_face_culling(true);
    for batch in 0..batches {
        targets.bind_page(batch);
        vertices += targets.draw_batch(GeometryKind::Solid, batch, false)?;
    }
    targets.device.set_face_culling(false);
    for batch in 0..batches {
        targets.bind_page(batch);
        vertices += targets.draw_batch(GeometryKind::Sprite, batch, false)?;
    }
    targets.device.set_alpha_test(false);
    targets.device.set_texturing(false);
    targets.builder.end_render(targets.device);

    env.render_map_sides(targets.device, delta);
    env.render_map_edges(targets.device, delta);

    targets.builder.begin_render(targets.device);
    targets.device.set_alpha_test(false);
    targets.device.set_texturing(false);
    targets.device.set_alpha_blending(false);

    targets.device.set_depth_test_func(CompareFunc::LessEqual);
    targets.device.set_color_write(ColorMask::NONE);
    for batch in 0..batches {
        targets.draw_batch(GeometryKind::Translucent, batch, false)?;
    }

    targets.device.set_depth_test_func(CompareFunc::Less);
    targets.device.set_alpha_blending(true);
    targets.device.set_texturing(true);
    targets.device.set_color_write(ColorMask::ALL);
    for batch in 0..batches {
        targets.bind_page(batch);
        vertices += targets.draw_batch(GeometryKind::Translucent, batch, true)?;
    }

    targets.device.set_depth_test_func(CompareFunc::Less);
    targets.device.set_alpha_test(false);
    targets.device.set_alpha_blending(false);
    targets.device.set_texturing(false);
    targets.builder.end_render(targets.device);
    Ok(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCommand, RecordingDevice, TextureId};
    use crate::sort::DistanceSorter;
    use crate::testing::StubBuilder;
    use chunkview_common::ChunkCoord;
    use glam::Vec3;

    struct Scene {
        grid: ChunkGrid,
        sorter: DistanceSorter,
        atlas: TerrainAtlas,
        builder: StubBuilder,
        device: RecordingDevice,
    }

    /// A row of `count` built, visible chunks along x, viewer in the first.
    fn scene(count: u32, pages: u32) -> Scene {
        let mut grid = ChunkGrid::build(count * 16, 16, 16).unwrap();
        let mut builder = StubBuilder::new(pages as usize);
        let mut device = RecordingDevice::new();
        for i in 0..grid.len() {
            let chunk = grid.get_mut(i).unwrap();
            chunk.draw_info = Some(builder.build_for(&mut device, chunk.location));
            chunk.visible = true;
        }
        let mut sorter = DistanceSorter::new(&grid);
        sorter.update(&grid, Vec3::new(8.0, 8.0, 8.0));
        device.clear_commands();
        Scene {
            grid,
            sorter,
            atlas: TerrainAtlas::with_page_count(pages, 16),
            builder,
            device,
        }
    }

    fn draw(s: &mut Scene) -> u64 {
        let mut targets = DrawTargets {
            grid: &s.grid,
            order: s.sorter.order(),
            atlas: &s.atlas,
            builder: &mut s.builder,
            device: &mut s.device,
        };
        draw_frame(&mut targets, &mut NoEnvironment, 0.016).unwrap()
    }

    fn drawn_chunks(s: &Scene, commands: &[DeviceCommand]) -> Vec<ChunkCoord> {
        commands
            .iter()
            .filter_map(|c| match c {
                DeviceCommand::Draw { buffer, .. } => s.builder.owners.get(buffer).copied(),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn counts_every_pass_but_depth_prepass() {
        let mut s = scene(3, 2);
        // 3 chunks × 2 batches × (solid + sprite + translucent colour) × 4.
        assert_eq!(draw(&mut s), 3 * 2 * 3 * 4);
        let draws = s
            .device
            .commands()
            .iter()
            .filter(|c| matches!(c, DeviceCommand::Draw { .. }))
            .count();
        // The depth pre-pass adds one more draw per translucent part.
        assert_eq!(draws, 3 * 2 * 4);
    }

    #[test]
    fn translucent_colour_pass_is_back_to_front() {
        let mut s = scene(3, 1);
        draw(&mut s);
        let commands = s.device.commands().to_vec();
        let colour_on = commands
            .iter()
            .rposition(|c| *c == DeviceCommand::ColorWrite(ColorMask::ALL))
            .unwrap();
        let xs: Vec<i32> = drawn_chunks(&s, &commands[colour_on..])
            .iter()
            .map(|c| c.x)
            .collect();
        assert_eq!(xs, vec![32, 16, 0]);

        // Solid pass runs nearest first.
        let first_three: Vec<i32> = drawn_chunks(&s, &commands).iter().take(3).map(|c| c.x).collect();
        assert_eq!(first_three, vec![0, 16, 32]);
    }

    #[test]
    fn state_sequence() {
        let mut s = scene(1, 1);
        draw(&mut s);
        let toggles: Vec<DeviceCommand> = s
            .device
            .commands()
            .iter()
            .copied()
            .filter(|c| !matches!(c, DeviceCommand::Draw { .. }))
            .collect();
        use DeviceCommand::*;
        assert_eq!(
            toggles,
            vec![
                Texturing(true),
                AlphaTest(true),
                FaceCulling(true),
                BindTexture(TextureId(0)),
                FaceCulling(false),
                BindTexture(TextureId(0)),
                AlphaTest(false),
                Texturing(false),
                AlphaTest(false),
                Texturing(false),
                AlphaBlending(false),
                DepthFunc(CompareFunc::LessEqual),
                ColorWrite(ColorMask::NONE),
                DepthFunc(CompareFunc::Less),
                AlphaBlending(true),
                Texturing(true),
                ColorWrite(ColorMask::ALL),
                BindTexture(TextureId(0)),
                DepthFunc(CompareFunc::Less),
                AlphaTest(false),
                AlphaBlending(false),
                Texturing(false),
            ]
        );
        let state = s.device.state();
        assert_eq!(state.depth_func, CompareFunc::Less);
        assert!(!state.alpha_blending && !state.texturing && !state.alpha_test);
    }

    #[test]
    fn invisible_and_unbuilt_chunks_are_skipped() {
        let mut s = scene(3, 1);
        s.grid.get_mut(1).unwrap().visible = false;
        let info = s.grid.get_mut(2).unwrap().draw_info.take().unwrap();
        s.builder.release(&mut s.device, info);
        s.device.clear_commands();

        assert_eq!(draw(&mut s), 3 * 4);
        let drawn = drawn_chunks(&s, s.device.commands());
        assert!(drawn.iter().all(|c| c.x == 0));
    }

    #[test]
    fn chunks_built_with_fewer_batches_are_skipped_for_new_pages() {
        let mut s = scene(2, 1);
        s.atlas = TerrainAtlas::with_page_count(3, 16);
        // Batch 0 still draws; batches 1 and 2 have no parts.
        assert_eq!(draw(&mut s), 2 * 3 * 4);
    }
}
