//! Shape composers
//!
//! Pure functions that build flat triangle-list vertex arrays for
//! parametric solids. Every vertex is a full (position, normal, uv)
//! record; feed the result into [`crate::GeometryBuffer`] to weld it
//! into an indexed mesh.
//!
//! Each shape comes in two flavours:
//! - `shape(..)`: UVs are the face-local 0..1 coordinates
//! - `shape_textured(.., projector)`: UVs go through a [`TextureProjector`](crate::TextureProjector),
//!   which is advanced with `next_element` between faces or bands
//!
//! Zero radius or height produces zero-area triangles; that is allowed.
//! Edge counts below 3 and level counts below 1 panic.

mod cuboid;
mod cylinder;
mod pyramid;
mod quad;
mod radial;


pub use cuboid::{
    cube, cube_textured, cuboid, cuboid_from_corners, cuboid_from_corners_textured,
    cuboid_textured,
};
pub use cylinder::{cylinder, cylinder_textured, cylinder_textured_ends};
pub use pyramid::{pyramid, pyramid_levels, pyramid_textured};
pub use quad::{
    quad, quad_textured, rectangle, rectangle_textured, triangle, triangle_textured,
};
pub use radial::{circle, circle_textured, edge_points, tube, tube_textured};

use glam::Vec3;

/// Face normal of the triangle (p1, p2, p3): `normalize(-cross(p2 - p1, p3 - p1))`
///
/// Degenerate triangles get a zero normal.
pub(crate) fn face_normal(p1: Vec3, p2: Vec3, p3: Vec3) -> Vec3 {
    (-(p2 - p1).cross(p3 - p1)).normalize_or_zero()
}

pub(crate) fn assert_edge_count(edges: u32) {
    assert!(edges >= 3, "edge count must be at least 3, got {edges}");
}
