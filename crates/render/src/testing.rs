//! Test doubles shared by the unit tests of this crate.

use std::cell::Cell;
use std::collections::HashMap;

use chunkview_common::ChunkCoord;
use glam::Vec3;

use crate::cull::Culling;
use crate::device::{BufferId, GraphicsDevice, Vertex};
use crate::error::DeviceError;
use crate::mesh::{BuildContext, ChunkDrawInfo, ChunkPart, GeometryKind, MeshBuilder};

/// Builder that gives every chunk one 4-vertex part per kind per batch and
/// remembers which chunk owns which buffer.
pub struct StubBuilder {
    batches: usize,
    pub lighting: bool,
    pub owners: HashMap<BufferId, ChunkCoord>,
    pub built: Vec<ChunkCoord>,
    pub new_maps: usize,
    pub maps_loaded: usize,
}

impl StubBuilder {
    pub fn new(batches: usize) -> Self {
        Self {
            batches,
            lighting: false,
            owners: HashMap::new(),
            built: Vec::new(),
            new_maps: 0,
            maps_loaded: 0,
        }
    }

    pub fn with_lighting(batches: usize) -> Self {
        Self {
            lighting: true,
            ..Self::new(batches)
        }
    }

    pub fn build_for(&mut self, device: &mut dyn GraphicsDevice, origin: ChunkCoord) -> ChunkDrawInfo {
        self.try_build(device, origin)
            .expect("stub build should not fail")
    }

    fn try_build(
        &mut self,
        device: &mut dyn GraphicsDevice,
        origin: ChunkCoord,
    ) -> Result<ChunkDrawInfo, DeviceError> {
        let quad = [Vertex {
            position: [0.0; 3],
            uv: [0.0; 2],
            colour: [255; 4],
        }; 4];
        let mut info = ChunkDrawInfo::empty(self.batches);
        for kind in GeometryKind::ALL {
            for batch in 0..self.batches {
                let buffer = match device.create_vertex_buffer(&quad) {
                    Ok(buffer) => buffer,
                    Err(err) => {
                        self.release(device, info);
                        return Err(err);
                    }
                };
                self.owners.insert(buffer, origin);
                info.parts_mut(kind)[batch] = ChunkPart {
                    buffer: Some(buffer),
                    vertex_count: 4,
                };
            }
        }
        self.built.push(origin);
        Ok(info)
    }
}

impl MeshBuilder for StubBuilder {
    fn uses_lighting(&self) -> bool {
        self.lighting
    }

    fn on_new_map(&mut self) {
        self.new_maps += 1;
    }

    fn on_new_map_loaded(&mut self) {
        self.maps_loaded += 1;
    }

    fn build(
        &mut self,
        _ctx: &BuildContext<'_>,
        device: &mut dyn GraphicsDevice,
        origin: ChunkCoord,
    ) -> Result<ChunkDrawInfo, DeviceError> {
        self.try_build(device, origin)
    }
}

/// Frustum stand-in that accepts every sphere and counts how often it was asked.
#[derive(Default)]
pub struct CountingCuller {
    pub tests: Cell<usize>,
}

impl Culling for CountingCuller {
    fn sphere_in_frustum(&self, _center: Vec3, _radius: f32) -> bool {
        self.tests.set(self.tests.get() + 1);
        true
    }
}

/// Accepts only spheres whose centre lies at `x < max_x`.
pub struct HalfSpaceCuller {
    pub max_x: f32,
}

impl Culling for HalfSpaceCuller {
    fn sphere_in_frustum(&self, center: Vec3, _radius: f32) -> bool {
        center.x < self.max_x
    }
}
