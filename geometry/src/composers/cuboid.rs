//! Cuboids from half-extents or from eight arbitrary corners

use glam::Vec3;

use super::quad_textured;
use crate::texture::{Identity, TextureProjector};
use crate::vertex::Vertex;

/// Cube with edge `length`, centred on the origin
pub fn cube(length: f32) -> Vec<Vertex> {
    cuboid_textured(length, length, length, &mut Identity)
}

pub fn cube_textured(length: f32, projector: &mut dyn TextureProjector) -> Vec<Vertex> {
    cuboid_textured(length, length, length, projector)
}

/// Axis-aligned box centred on the origin
pub fn cuboid(width: f32, height: f32, depth: f32) -> Vec<Vertex> {
    cuboid_textured(width, height, depth, &mut Identity)
}

/// Axis-aligned box centred on the origin
///
/// # Arguments
/// * `width`, `height`, `depth` - full extents along X, Y and Z
/// * `projector` - sees the sides in [`crate::CuboidSide`] order (front,
///   back, left, right, top, bottom) with one `next_element` after each,
///   so a [`crate::CuboidTexture`] cursor ends at 7
///
/// # Returns
/// 36 vertices, emitted front, back, right, left, top, bottom. Every
/// face normal points away from the centre. Front is the -Z side.
pub fn cuboid_textured(
    width: f32,
    height: f32,
    depth: f32,
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    let hw = width / 2.0;
    let hh = height / 2.0;
    let hd = depth / 2.0;

    let mut face = |corners: [Vec3; 4]| {
        let vertices = quad_textured(corners, &mut *projector);
        projector.next_element();
        vertices
    };

    let front = face([
        Vec3::new(hw, hh, -hd),
        Vec3::new(-hw, hh, -hd),
        Vec3::new(hw, -hh, -hd),
        Vec3::new(-hw, -hh, -hd),
    ]);
    let back = face([
        Vec3::new(-hw, hh, hd),
        Vec3::new(hw, hh, hd),
        Vec3::new(-hw, -hh, hd),
        Vec3::new(hw, -hh, hd),
    ]);
    let left = face([
        Vec3::new(-hw, hh, -hd),
        Vec3::new(-hw, hh, hd),
        Vec3::new(-hw, -hh, -hd),
        Vec3::new(-hw, -hh, hd),
    ]);
    let right = face([
        Vec3::new(hw, hh, hd),
        Vec3::new(hw, hh, -hd),
        Vec3::new(hw, -hh, hd),
        Vec3::new(hw, -hh, -hd),
    ]);
    let top = face([
        Vec3::new(-hw, hh, -hd),
        Vec3::new(hw, hh, -hd),
        Vec3::new(-hw, hh, hd),
        Vec3::new(hw, hh, hd),
    ]);
    let bottom = face([
        Vec3::new(-hw, -hh, hd),
        Vec3::new(hw, -hh, hd),
        Vec3::new(-hw, -hh, -hd),
        Vec3::new(hw, -hh, -hd),
    ]);

    [front, back, right, left, top, bottom].concat()
}

/// Hexahedron from eight corners with face-local UVs
pub fn cuboid_from_corners(corners: [Vec3; 8]) -> Vec<Vertex> {
    cuboid_from_corners_textured(corners, &mut Identity)
}

/// Hexahedron from eight corners
///
/// Corners are `[tlb, tlf, trf, trb, blb, blf, brf, brb]`: top/bottom,
/// left/right, back/front. For a box with top at +Y, right at +X and
/// front at +Z, every face normal points outward.
///
/// Sides are created (and the projector advanced) in [`crate::CuboidSide`]
/// order; the 36 vertices are emitted top, bottom, left, right, front, back.
pub fn cuboid_from_corners_textured(
    corners: [Vec3; 8],
    projector: &mut dyn TextureProjector,
) -> Vec<Vertex> {
    let [tlb, tlf, trf, trb, blb, blf, brf, brb] = corners;

    let mut face = |corners: [Vec3; 4]| {
        let vertices = quad_textured(corners, &mut *projector);
        projector.next_element();
        vertices
    };

    let front = face([tlf, trf, blf, brf]);
    let back = face([trb, tlb, brb, blb]);
    let left = face([tlb, tlf, blb, blf]);
    let right = face([trf, trb, brf, brb]);
    let top = face([tlb, trb, tlf, trf]);
    let bottom = face([blf, brf, blb, brb]);

    [top, bottom, left, right, front, back].concat()
}
