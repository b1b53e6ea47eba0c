use chunkview_common::CELL_BOUNDING_RADIUS;
use glam::{Mat4, Vec3, Vec4};

use crate::grid::ChunkGrid;
use crate::sort::SortEntry;

/// Sphere-vs-view-volume test supplied by the viewer.
pub trait Culling {
    fn sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool;
}

/// Accepts everything. Distance culling still applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCulling;

impl Culling for NoCulling {
    fn sphere_in_frustum(&self, _center: Vec3, _radius: f32) -> bool {
        true
    }
}

/// The six planes of a view volume, normals pointing inwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the planes of a view-projection matrix with a `[0, 1]` depth
    /// range, as produced by `Mat4::perspective_rh`.
    pub fn from_view_projection(view_projection: Mat4) -> Self {
        let m = view_projection.transpose();
        let (r0, r1, r2, r3) = (m.x_axis, m.y_axis, m.z_axis, m.w_axis);
        let planes = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|plane| {
            let length = plane.truncate().length();
            if length > 0.0 { plane / length } else { plane }
        });
        Self { planes }
    }
}

impl Culling for Frustum {
    fn sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(center) + plane.w >= -radius)
    }
}

/// Squared distance up to which a chunk centre counts as in range: the view
/// distance widened by the chunk's bounding radius.
pub fn range_limit_squared(view_distance: f32) -> i64 {
    let limit = view_distance.max(0.0) + CELL_BOUNDING_RADIUS;
    (limit * limit) as i64
}

/// Outcome of one visibility pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibilityStats {
    pub in_range: usize,
    pub visible: usize,
}

/// Recompute every chunk's `visible` flag.
///
/// Chunks beyond `limit_squared` are rejected without a frustum test; the
/// rest are tested as spheres of [`CELL_BOUNDING_RADIUS`] around their centre.
pub fn update_visibility(
    grid: &mut ChunkGrid,
    order: &[SortEntry],
    limit_squared: i64,
    culling: &dyn Culling,
) -> VisibilityStats {
    let mut stats = VisibilityStats::default();
    for entry in order {
        let Some(chunk) = grid.get_mut(entry.index) else {
            continue;
        };
        if entry.distance > limit_squared {
            chunk.visible = false;
            continue;
        }
        stats.in_range += 1;
        chunk.visible = culling.sphere_in_frustum(chunk.location.center_f32(), CELL_BOUNDING_RADIUS);
        if chunk.visible {
            stats.visible += 1;
        }
    }
    stats
}
