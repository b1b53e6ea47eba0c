use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Edge length of a chunk, in blocks.
pub const CHUNK_SIZE: i32 = 16;
/// `log2(CHUNK_SIZE)`, for converting block coordinates to chunk indices.
pub const CHUNK_SHIFT: u32 = 4;
/// Mask extracting the local block coordinate inside a chunk.
pub const CHUNK_MASK: i32 = CHUNK_SIZE - 1;

const HALF_SQRT_3: f32 = 0.866_025_4;

/// Radius of the sphere enclosing one chunk: half the chunk's space diagonal.
pub const CELL_BOUNDING_RADIUS: f32 = CHUNK_SIZE as f32 * HALF_SQRT_3;

/// Round `value` up to the next multiple of [`CHUNK_SIZE`], or `None` if
/// that does not fit in a `u32`.
pub fn next_multiple_of_chunk(value: u32) -> Option<u32> {
    value.checked_next_multiple_of(CHUNK_SIZE as u32)
}

/// World-space block coordinate of a chunk's minimum corner.
///
/// All components are multiples of [`CHUNK_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl ChunkCoord {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing the given block.
    pub fn containing(block: IVec3) -> Self {
        Self {
            x: block.x & !CHUNK_MASK,
            y: block.y & !CHUNK_MASK,
            z: block.z & !CHUNK_MASK,
        }
    }

    /// Chunk at the given chunk-index position (block coordinate = index * 16).
    pub fn from_index(cx: i32, cy: i32, cz: i32) -> Self {
        Self {
            x: cx << CHUNK_SHIFT,
            y: cy << CHUNK_SHIFT,
            z: cz << CHUNK_SHIFT,
        }
    }

    /// Chunk-index position of this chunk.
    pub fn index(self) -> IVec3 {
        IVec3::new(
            self.x >> CHUNK_SHIFT,
            self.y >> CHUNK_SHIFT,
            self.z >> CHUNK_SHIFT,
        )
    }

    pub fn origin(self) -> IVec3 {
        IVec3::new(self.x, self.y, self.z)
    }

    /// Integer block coordinate of the chunk centre.
    pub fn center(self) -> IVec3 {
        self.origin() + IVec3::splat(CHUNK_SIZE / 2)
    }

    pub fn center_f32(self) -> Vec3 {
        self.center().as_vec3()
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

/// Centre of the chunk containing `position`, the reference point for
/// distance sorting.
pub fn viewer_chunk_center(position: Vec3) -> IVec3 {
    let block = position.floor().as_ivec3();
    (block & IVec3::splat(!CHUNK_MASK)) + IVec3::splat(CHUNK_SIZE / 2)
}

/// Squared Euclidean distance between two block coordinates.
pub fn distance_squared(a: IVec3, b: IVec3) -> i64 {
    let d = a.as_i64vec3() - b.as_i64vec3();
    d.x * d.x + d.y * d.y + d.z * d.z
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_chunk_multiple() {
        assert_eq!(next_multiple_of_chunk(1), Some(16));
        assert_eq!(next_multiple_of_chunk(16), Some(16));
        assert_eq!(next_multiple_of_chunk(17), Some(32));
        assert_eq!(next_multiple_of_chunk(0), Some(0));
        assert_eq!(next_multiple_of_chunk(u32::MAX - 15), Some(u32::MAX - 15));
        assert_eq!(next_multiple_of_chunk(u32::MAX - 14), None);
    }

    #[test]
    fn bounding_radius_matches_half_diagonal() {
        let expected = (3.0_f32 * 8.0 * 8.0).sqrt();
        assert!((CELL_BOUNDING_RADIUS - expected).abs() < 1e-4);
    }

    #[test]
    fn chunk_containing_block() {
        let c = ChunkCoord::containing(IVec3::new(17, 5, 31));
        assert_eq!(c, ChunkCoord::new(16, 0, 16));
        assert_eq!(c.index(), IVec3::new(1, 0, 1));
        assert_eq!(ChunkCoord::from_index(1, 0, 1), c);
    }

    #[test]
    fn viewer_center_is_cell_aligned() {
        assert_eq!(
            viewer_chunk_center(Vec3::new(3.5, 17.2, 31.9)),
            IVec3::new(8, 24, 24)
        );
        // Negative positions floor towards the lower cell.
        assert_eq!(
            viewer_chunk_center(Vec3::new(-0.5, 0.0, 0.0)),
            IVec3::new(-8, 8, 8)
        );
    }

    #[test]
    fn distance_squared_is_symmetric() {
        let a = IVec3::new(8, 8, 8);
        let b = IVec3::new(24, 8, 40);
        assert_eq!(distance_squared(a, b), 16 * 16 + 32 * 32);
        assert_eq!(distance_squared(a, b), distance_squared(b, a));
    }
}
