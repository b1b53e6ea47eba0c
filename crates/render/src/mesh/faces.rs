use chunkview_common::{BlockId, BlockKind, CHUNK_SIZE, ChunkCoord, block_kind, texture_index};
use chunkview_kernel::{BlockMap, Colour};

use super::{BuildContext, ChunkDrawInfo, ChunkPart, GeometryKind, MeshBuilder};
use crate::device::{GraphicsDevice, Vertex};
use crate::error::DeviceError;

#[derive(Debug, Clone, Copy)]
struct Face {
    normal: [i32; 3],
    corners: [[f32; 3]; 4],
    shade: f32,
}

const FACES: [Face; 6] = [
    Face {
        normal: [-1, 0, 0],
        corners: [[0.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
        shade: 0.6,
    },
    Face {
        normal: [1, 0, 0],
        corners: [[1.0, 0.0, 1.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
        shade: 0.6,
    },
    Face {
        normal: [0, -1, 0],
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
        shade: 0.5,
    },
    Face {
        normal: [0, 1, 0],
        corners: [[0.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        shade: 1.0,
    },
    Face {
        normal: [0, 0, -1],
        corners: [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        shade: 0.8,
    },
    Face {
        normal: [0, 0, 1],
        corners: [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
        shade: 0.8,
    },
];

// Two diagonal quads through the block.
const SPRITE_QUADS: [[[f32; 3]; 4]; 2] = [
    [[0.0, 0.0, 0.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
    [[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
];

const QUAD_U: [f32; 4] = [0.0, 1.0, 1.0, 0.0];
const QUAD_V: [bool; 4] = [true, true, false, false];

/// Reference mesh builder: one quad per exposed cube face, two crossed quads
/// per sprite, coloured by whether the block is in sunlight or shadow.
///
/// No face merging or ambient occlusion; it exists so the renderer can run
/// headless against a real block map.
#[derive(Debug, Default)]
pub struct FaceMeshBuilder {
    chunks_built: u64,
}

impl FaceMeshBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chunks built since the last new map.
    pub fn chunks_built(&self) -> u64 {
        self.chunks_built
    }
}

fn face_visible(kind: BlockKind, block: BlockId, neighbour: BlockId) -> bool {
    match block_kind(neighbour) {
        BlockKind::Air | BlockKind::Sprite => true,
        BlockKind::Solid => false,
        BlockKind::Translucent => kind == BlockKind::Solid || neighbour != block,
    }
}

fn light_colour(map: &BlockMap, x: i32, y: i32, z: i32) -> Colour {
    let env = map.env();
    if map.is_lit(x, y, z) {
        env.sunlight
    } else {
        env.shadowlight
    }
}

fn push_quad(
    out: &mut Vec<Vertex>,
    base: [f32; 3],
    corners: &[[f32; 3]; 4],
    v_range: (f32, f32),
    colour: Colour,
    alpha: u8,
) {
    for (i, corner) in corners.iter().enumerate() {
        let v = if QUAD_V[i] { v_range.1 } else { v_range.0 };
        out.push(Vertex {
            position: [
                base[0] + corner[0],
                base[1] + corner[1],
                base[2] + corner[2],
            ],
            uv: [QUAD_U[i], v],
            colour: [colour.r, colour.g, colour.b, alpha],
        });
    }
}

impl MeshBuilder for FaceMeshBuilder {
    fn uses_lighting(&self) -> bool {
        true
    }

    fn on_new_map(&mut self) {
        self.chunks_built = 0;
    }

    fn build(
        &mut self,
        ctx: &BuildContext<'_>,
        device: &mut dyn GraphicsDevice,
        origin: ChunkCoord,
    ) -> Result<ChunkDrawInfo, DeviceError> {
        let map = ctx.map;
        let atlas = ctx.atlas;
        let batches = atlas.page_count();
        // Indexed by kind, then batch.
        let mut vertices: [Vec<Vec<Vertex>>; 3] = std::array::from_fn(|_| vec![Vec::new(); batches]);

        for y in origin.y..origin.y + CHUNK_SIZE {
            for z in origin.z..origin.z + CHUNK_SIZE {
                for x in origin.x..origin.x + CHUNK_SIZE {
                    if !map.contains(x, y, z) {
                        continue;
                    }
                    let block = map.get_block(x, y, z);
                    let kind = block_kind(block);
                    let slot = match kind {
                        BlockKind::Air => continue,
                        BlockKind::Solid => 0,
                        BlockKind::Sprite => 1,
                        BlockKind::Translucent => 2,
                    };
                    let Some(out) = vertices[slot].get_mut(atlas.batch_of(texture_index(block)))
                    else {
                        continue;
                    };
                    let v_range = atlas.v_range(texture_index(block));
                    let base = [x as f32, y as f32, z as f32];
                    let light = light_colour(map, x, y, z);
                    let alpha = if kind == BlockKind::Translucent { 160 } else { 255 };

                    if kind == BlockKind::Sprite {
                        for quad in &SPRITE_QUADS {
                            push_quad(out, base, quad, v_range, light, alpha);
                        }
                        continue;
                    }
                    for face in &FACES {
                        let [dx, dy, dz] = face.normal;
                        let neighbour = map.get_block(x + dx, y + dy, z + dz);
                        if face_visible(kind, block, neighbour) {
                            push_quad(out, base, &face.corners, v_range, light.scale(face.shade), alpha);
                        }
                    }
                }
            }
        }

        let mut info = ChunkDrawInfo::empty(batches);
        for (slot, kind) in GeometryKind::ALL.into_iter().enumerate() {
            for (batch, data) in vertices[slot].iter().enumerate() {
                if data.is_empty() {
                    continue;
                }
                match device.create_vertex_buffer(data) {
                    Ok(buffer) => {
                        info.parts_mut(kind)[batch] = ChunkPart {
                            buffer: Some(buffer),
                            vertex_count: data.len() as u32,
                        };
                    }
                    Err(err) => {
                        tracing::warn!(%origin, %err, "chunk build failed, releasing partial geometry");
                        self.release(device, info);
                        return Err(err);
                    }
                }
            }
        }
        self.chunks_built += 1;
        Ok(info)
    }
}
